//! Purge configuration parsing.

use crate::{ConfigError, ConfigResult};
use async_trait::async_trait;
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use teardown_core::provider::ParamGetter;

pub use teardown_core::provider::SUPPRESS_CONFIRMATION;

/// Configuration for a purge run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Namespace used to build stack names and scope role sweeps.
    pub namespace: String,
    /// Named parameters.
    pub params: HashMap<String, String>,
}

impl PurgeConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn confirmation_suppressed(&self) -> bool {
        self.param(SUPPRESS_CONFIRMATION) == Some("yes")
    }
}

#[async_trait]
impl ParamGetter for PurgeConfig {
    async fn get_param(&self, name: &str) -> teardown_core::Result<String> {
        self.param(name)
            .map(str::to_string)
            .ok_or_else(|| teardown_core::Error::NotFound(format!("parameter {name}")))
    }
}

/// Parse a purge configuration from KDL text.
pub fn parse_config(kdl: &str) -> ConfigResult<PurgeConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut namespace: Option<String> = None;
    let mut params = HashMap::new();

    for node in doc.nodes() {
        match node.name().value() {
            "namespace" => {
                if namespace.is_some() {
                    return Err(ConfigError::Duplicate("namespace".to_string()));
                }
                namespace = Some(
                    get_first_string_arg(node)
                        .ok_or_else(|| ConfigError::MissingField("namespace".to_string()))?,
                );
            }
            "params" => parse_params(node, &mut params)?,
            _ => {} // Ignore unknown nodes
        }
    }

    let namespace = namespace
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ConfigError::MissingField("namespace".to_string()))?;

    Ok(PurgeConfig { namespace, params })
}

/// Read and parse a purge configuration file.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<PurgeConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

fn parse_params(node: &KdlNode, params: &mut HashMap<String, String>) -> ConfigResult<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for child in children.nodes() {
        let key = child.name().value().to_string();
        let value = get_first_string_arg(child).ok_or_else(|| ConfigError::InvalidValue {
            field: format!("params.{key}"),
            message: "expected a string value".to_string(),
        })?;
        if params.insert(key.clone(), value).is_some() {
            return Err(ConfigError::Duplicate(format!("params.{key}")));
        }
    }

    Ok(())
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
