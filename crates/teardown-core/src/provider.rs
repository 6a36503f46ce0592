//! Provider capability traits.
//!
//! Providers bind the teardown workflows to a concrete cloud API. Each
//! capability is a separate trait so callers depend only on what they use.

use async_trait::async_trait;

use crate::{Resource, Result, Stack, StackType};

/// Parameter that skips the interactive purge confirmation when set to `"yes"`.
pub const SUPPRESS_CONFIRMATION: &str = "suppressConfirmation";

/// Lists stacks and their resources.
#[async_trait]
pub trait StackLister: Send + Sync {
    /// All stacks matching the type filter; [`StackType::All`] lists everything.
    async fn list_stacks(&self, stack_type: StackType) -> Result<Vec<Stack>>;

    /// The resources belonging to a stack.
    async fn get_resources_for_stack(&self, stack: &Stack) -> Result<Vec<Resource>>;
}

/// Issues generic stack delete requests.
#[async_trait]
pub trait StackDeleter: Send + Sync {
    async fn delete_stack(&self, name: &str) -> Result<()>;
}

/// Waits for a stack to settle.
#[async_trait]
pub trait StackWaiter: Send + Sync {
    /// Block until the stack reaches a terminal status.
    ///
    /// Returns `None` when the stack no longer exists.
    async fn await_final_status(&self, name: &str) -> Option<Stack>;
}

/// Storage bucket cleanup.
#[async_trait]
pub trait BucketCleaner: Send + Sync {
    async fn delete_bucket_objects(&self, bucket: &str) -> Result<()>;

    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

/// Image repository cleanup.
#[async_trait]
pub trait ImageRepoCleaner: Send + Sync {
    async fn delete_images_from_repo(&self, repo: &str) -> Result<()>;
}

/// Access role cleanup.
#[async_trait]
pub trait RoleDeleter: Send + Sync {
    /// Delete every access role provisioned under a namespace.
    async fn delete_roles_for_namespace(&self, namespace: &str) -> Result<()>;
}

/// Role-set stacks provisioned alongside environments, services and pipelines.
#[async_trait]
pub trait RolesetDeleter: Send + Sync {
    async fn delete_environment_roleset(&self, environment: &str) -> Result<()>;

    async fn delete_service_roleset(&self, environment: &str, service: &str) -> Result<()>;

    async fn delete_pipeline_roleset(&self, service: &str) -> Result<()>;
}

/// Named configuration parameters.
#[async_trait]
pub trait ParamGetter: Send + Sync {
    async fn get_param(&self, name: &str) -> Result<String>;
}

/// Every stack-level capability a termination workflow needs.
pub trait StackManager:
    StackLister + StackDeleter + StackWaiter + BucketCleaner + ImageRepoCleaner + RoleDeleter
{
}

impl<T> StackManager for T where
    T: StackLister + StackDeleter + StackWaiter + BucketCleaner + ImageRepoCleaner + RoleDeleter
{
}
