//! Shared collaborators for teardown workflows.

use std::sync::Arc;
use teardown_core::provider::{ParamGetter, RolesetDeleter, StackManager};

/// Providers and settings captured by every executor of a purge plan.
#[derive(Clone)]
pub struct PurgeContext {
    /// Namespace used to build stack names.
    pub namespace: String,
    pub stacks: Arc<dyn StackManager>,
    pub rolesets: Arc<dyn RolesetDeleter>,
    pub params: Arc<dyn ParamGetter>,
}

impl PurgeContext {
    pub fn new(
        namespace: impl Into<String>,
        stacks: Arc<dyn StackManager>,
        rolesets: Arc<dyn RolesetDeleter>,
        params: Arc<dyn ParamGetter>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            stacks,
            rolesets,
            params,
        }
    }
}
