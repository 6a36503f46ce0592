//! Stack types and inventory filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Error;

/// Tag key holding the stack's category.
pub const TAG_TYPE: &str = "type";
/// Tag key holding the service a stack belongs to.
pub const TAG_SERVICE: &str = "service";
/// Tag key holding the environment a stack belongs to.
pub const TAG_ENVIRONMENT: &str = "environment";
/// Tag key holding the namespace that scopes a stack and its roles.
pub const TAG_NAMESPACE: &str = "namespace";

/// Status reported once a stack has been fully deleted.
pub const STATUS_DELETE_COMPLETE: &str = "DELETE_COMPLETE";
/// Status of a stack whose creation failed and was rolled back.
pub const STATUS_ROLLBACK_COMPLETE: &str = "ROLLBACK_COMPLETE";

const COMPLETE_SUFFIX: &str = "_COMPLETE";

/// Stack category, taken from the `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackType {
    /// Wildcard matching every stack.
    All,
    Schedule,
    Service,
    Environment,
    Pipeline,
    Bucket,
    Repo,
    Vpc,
    Iam,
}

impl StackType {
    /// Tag value carried by stacks of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            StackType::All => "*",
            StackType::Schedule => "schedule",
            StackType::Service => "service",
            StackType::Environment => "environment",
            StackType::Pipeline => "pipeline",
            StackType::Bucket => "bucket",
            StackType::Repo => "repo",
            StackType::Vpc => "vpc",
            StackType::Iam => "iam",
        }
    }

    /// Whether the given stack belongs to this category.
    pub fn matches(&self, stack: &Stack) -> bool {
        match self {
            StackType::All => true,
            _ => stack.tag(TAG_TYPE) == Some(self.as_str()),
        }
    }
}

impl std::fmt::Display for StackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StackType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" | "all" => Ok(StackType::All),
            "schedule" => Ok(StackType::Schedule),
            "service" => Ok(StackType::Service),
            "environment" => Ok(StackType::Environment),
            "pipeline" => Ok(StackType::Pipeline),
            "bucket" => Ok(StackType::Bucket),
            "repo" => Ok(StackType::Repo),
            "vpc" => Ok(StackType::Vpc),
            "iam" => Ok(StackType::Iam),
            other => Err(Error::InvalidInput(format!("unknown stack type: {other}"))),
        }
    }
}

/// A provider-tracked group of provisioned resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub status_reason: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub last_update_time: DateTime<Utc>,
}

impl Stack {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            status_reason: String::new(),
            tags: HashMap::new(),
            last_update_time: Utc::now(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = reason.into();
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Tag value, or empty string when the tag is absent.
    pub fn tag_or_empty(&self, key: &str) -> &str {
        self.tag(key).unwrap_or_default()
    }

    /// The non-empty `type` tag, if any.
    pub fn type_tag(&self) -> Option<&str> {
        self.tag(TAG_TYPE).filter(|t| !t.is_empty())
    }

    /// Whether the status ends in `_COMPLETE`.
    pub fn is_complete(&self) -> bool {
        self.status.ends_with(COMPLETE_SUFFIX)
    }
}

/// Stacks whose status is not one of `excluded`, in input order.
pub fn filter_by_status(stacks: &[Stack], excluded: &[&str]) -> Vec<Stack> {
    stacks
        .iter()
        .filter(|s| !excluded.contains(&s.status.as_str()))
        .cloned()
        .collect()
}

/// Stacks belonging to `stack_type`, in input order.
pub fn filter_by_type(stacks: &[Stack], stack_type: StackType) -> Vec<Stack> {
    stacks
        .iter()
        .filter(|s| stack_type.matches(s))
        .cloned()
        .collect()
}

/// Stacks carrying `key = value`, in input order.
pub fn filter_by_tag(stacks: &[Stack], key: &str, value: &str) -> Vec<Stack> {
    stacks
        .iter()
        .filter(|s| s.tag(key) == Some(value))
        .cloned()
        .collect()
}

/// Provider stack name: `<namespace>-<type>-<part>-<part>...`.
pub fn stack_name(namespace: &str, stack_type: &str, parts: &[&str]) -> String {
    let mut name = format!("{namespace}-{stack_type}");
    for part in parts {
        name.push('-');
        name.push_str(part);
    }
    name
}
