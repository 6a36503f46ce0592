//! Stack provider backed by a JSON inventory snapshot.
//!
//! Deletes are simulated in memory: a deleted stack drops out of listings
//! and awaits as `DELETE_COMPLETE`. Nothing outside the process is touched.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use teardown_core::provider::{
    BucketCleaner, ImageRepoCleaner, RoleDeleter, RolesetDeleter, StackDeleter, StackLister,
    StackWaiter,
};
use teardown_core::stack::{STATUS_DELETE_COMPLETE, filter_by_type};
use teardown_core::{Error, Resource, Stack, StackType};
use tracing::info;

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub stacks: Vec<SnapshotStack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStack {
    #[serde(flatten)]
    pub stack: Stack,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

pub struct SnapshotProvider {
    stacks: Vec<SnapshotStack>,
    deleted: Mutex<HashSet<String>>,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            stacks: snapshot.stacks,
            deleted: Mutex::new(HashSet::new()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Ok(Self::new(snapshot))
    }

    /// Names of the stacks deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        let mut names: Vec<_> = self.deleted_set().iter().cloned().collect();
        names.sort();
        names
    }

    fn deleted_set(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // a poisoned set is still a valid set of names
        self.deleted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn find(&self, name: &str) -> Option<&SnapshotStack> {
        self.stacks.iter().find(|s| s.stack.name == name)
    }
}

#[async_trait]
impl StackLister for SnapshotProvider {
    async fn list_stacks(&self, stack_type: StackType) -> teardown_core::Result<Vec<Stack>> {
        let deleted = self.deleted_set();
        let live: Vec<Stack> = self
            .stacks
            .iter()
            .filter(|s| !deleted.contains(&s.stack.name))
            .map(|s| s.stack.clone())
            .collect();
        Ok(filter_by_type(&live, stack_type))
    }

    async fn get_resources_for_stack(&self, stack: &Stack) -> teardown_core::Result<Vec<Resource>> {
        self.find(&stack.name)
            .map(|s| s.resources.clone())
            .ok_or_else(|| Error::NotFound(format!("stack {}", stack.name)))
    }
}

#[async_trait]
impl StackDeleter for SnapshotProvider {
    async fn delete_stack(&self, name: &str) -> teardown_core::Result<()> {
        if self.find(name).is_none() {
            return Err(Error::provider(
                "ValidationError",
                format!("Stack with id {name} does not exist"),
            ));
        }
        info!(stack = %name, "Deleting stack");
        self.deleted_set().insert(name.to_string());
        Ok(())
    }
}

#[async_trait]
impl StackWaiter for SnapshotProvider {
    async fn await_final_status(&self, name: &str) -> Option<Stack> {
        let entry = self.find(name)?;
        if self.deleted_set().contains(name) {
            let mut stack = entry.stack.clone();
            stack.status = STATUS_DELETE_COMPLETE.to_string();
            stack.status_reason = String::new();
            stack.last_update_time = Utc::now();
            return Some(stack);
        }
        Some(entry.stack.clone())
    }
}

#[async_trait]
impl BucketCleaner for SnapshotProvider {
    async fn delete_bucket_objects(&self, bucket: &str) -> teardown_core::Result<()> {
        info!(bucket = %bucket, "Emptying bucket");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> teardown_core::Result<()> {
        info!(bucket = %bucket, "Deleting bucket");
        Ok(())
    }
}

#[async_trait]
impl ImageRepoCleaner for SnapshotProvider {
    async fn delete_images_from_repo(&self, repo: &str) -> teardown_core::Result<()> {
        info!(repo = %repo, "Deleting images");
        Ok(())
    }
}

#[async_trait]
impl RoleDeleter for SnapshotProvider {
    async fn delete_roles_for_namespace(&self, namespace: &str) -> teardown_core::Result<()> {
        info!(namespace = %namespace, "Deleting roles");
        Ok(())
    }
}

#[async_trait]
impl RolesetDeleter for SnapshotProvider {
    async fn delete_environment_roleset(&self, environment: &str) -> teardown_core::Result<()> {
        info!(environment = %environment, "Deleting environment roleset");
        Ok(())
    }

    async fn delete_service_roleset(
        &self,
        environment: &str,
        service: &str,
    ) -> teardown_core::Result<()> {
        info!(environment = %environment, service = %service, "Deleting service roleset");
        Ok(())
    }

    async fn delete_pipeline_roleset(&self, service: &str) -> teardown_core::Result<()> {
        info!(service = %service, "Deleting pipeline roleset");
        Ok(())
    }
}
