//! Termination of a single stack and its side resources.
//!
//! The terminator runs strictly in order: discover resources, empty
//! buckets and image repositories, issue the delete, wait for a terminal
//! status, then remove what the delete leaves behind. Only discovery
//! failures fail the step; everything after it is logged and tolerated.

use async_trait::async_trait;
use std::sync::Arc;
use teardown_core::provider::StackManager;
use teardown_core::stack::TAG_NAMESPACE;
use teardown_core::{Executor, Resource, ResourceKind, Result, Stack};
use tracing::{debug, error, info, warn};

/// Tears down one stack.
pub struct StackTerminator {
    name: String,
    stack: Stack,
    manager: Arc<dyn StackManager>,
}

impl StackTerminator {
    pub fn new(stack: Stack, manager: Arc<dyn StackManager>) -> Self {
        Self {
            name: format!("terminate:{}", stack.name),
            stack,
            manager,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Empty buckets and image repositories so the stack delete can remove them.
    async fn pre_delete(&self, resources: &[Resource]) {
        for resource in resources {
            let Some(id) = self.physical_id(resource) else {
                continue;
            };
            match resource.kind() {
                ResourceKind::StorageBucket => {
                    debug!(stack = %self.stack.name, bucket = %id, "Emptying bucket");
                    if let Err(e) = self.manager.delete_bucket_objects(id).await {
                        warn!(bucket = %id, error = %e, "Couldn't empty bucket");
                    }
                }
                ResourceKind::ImageRepository => {
                    debug!(stack = %self.stack.name, repo = %id, "Deleting repository images");
                    if let Err(e) = self.manager.delete_images_from_repo(id).await {
                        warn!(repo = %id, error = %e, "Couldn't delete repository images");
                    }
                }
                ResourceKind::AccessRole | ResourceKind::Other => {}
            }
        }
    }

    async fn delete(&self) {
        if let Err(e) = self.manager.delete_stack(&self.stack.name).await {
            error!(stack = %self.stack.name, error = %e, "DeleteStack failed");
        }
    }

    async fn await_terminal_status(&self) {
        let Some(final_stack) = self.manager.await_final_status(&self.stack.name).await else {
            return;
        };
        if !final_stack.is_complete() {
            error!(
                stack = %self.stack.name,
                status = %final_stack.status,
                reason = %final_stack.status_reason,
                "Ended in failed status"
            );
        }
    }

    /// Remove leftovers from the discovery snapshot.
    async fn post_delete(&self, resources: &[Resource]) {
        let mut roles_swept = false;

        for resource in resources {
            let Some(id) = self.physical_id(resource) else {
                continue;
            };
            match resource.kind() {
                ResourceKind::StorageBucket => {
                    if let Err(e) = self.manager.delete_bucket(id).await {
                        warn!(bucket = %id, error = %e, "Couldn't delete bucket");
                    }
                }
                ResourceKind::AccessRole if !roles_swept => {
                    roles_swept = true;
                    self.sweep_roles().await;
                }
                ResourceKind::AccessRole | ResourceKind::ImageRepository | ResourceKind::Other => {}
            }
        }
    }

    async fn sweep_roles(&self) {
        let namespace = self.stack.tag_or_empty(TAG_NAMESPACE);
        if namespace.is_empty() {
            warn!(stack = %self.stack.name, "No namespace tag, skipping role cleanup");
            return;
        }
        if let Err(e) = self.manager.delete_roles_for_namespace(namespace).await {
            warn!(namespace = %namespace, error = %e, "Couldn't delete roles");
        }
    }

    fn physical_id<'a>(&self, resource: &'a Resource) -> Option<&'a str> {
        let id = resource.physical_resource_id.as_deref().filter(|id| !id.is_empty());
        if id.is_none() && resource.kind() != ResourceKind::Other {
            warn!(
                stack = %self.stack.name,
                resource_type = %resource.resource_type,
                "Resource has no physical id, skipping cleanup"
            );
        }
        id
    }
}

#[async_trait]
impl Executor for StackTerminator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        info!(stack = %self.stack.name, "Terminating stack");

        let resources = self.manager.get_resources_for_stack(&self.stack).await?;

        self.pre_delete(&resources).await;
        self.delete().await;
        self.await_terminal_status().await;
        self.post_delete(&resources).await;

        Ok(())
    }
}
