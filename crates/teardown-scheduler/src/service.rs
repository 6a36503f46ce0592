//! Service lookup and undeploy steps.

use async_trait::async_trait;
use std::sync::Arc;
use teardown_core::provider::StackManager;
use teardown_core::stack::{TAG_ENVIRONMENT, TAG_SERVICE, stack_name};
use teardown_core::{Error, Executor, Result, Stack, StackType};
use tracing::info;

use crate::named::teardown_named_stack;

/// Resolves the service a stack belongs to before its teardown steps run.
pub struct ServiceLookup {
    name: String,
    stack: String,
    service: String,
}

impl ServiceLookup {
    pub fn new(stack: &Stack) -> Self {
        Self::with_label("service-lookup", stack)
    }

    /// Lookup step named after the workflow it precedes.
    pub fn with_label(label: &str, stack: &Stack) -> Self {
        Self {
            name: format!("{label}:{}", stack.name),
            stack: stack.name.clone(),
            service: stack.tag_or_empty(TAG_SERVICE).to_string(),
        }
    }
}

#[async_trait]
impl Executor for ServiceLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(Error::InvalidInput(format!(
                "stack {} has no service tag",
                self.stack
            )));
        }
        info!(service = %self.service, stack = %self.stack, "Found service");
        Ok(())
    }
}

/// Removes a service's stack from one environment.
pub struct ServiceUndeployer {
    name: String,
    namespace: String,
    service: String,
    environment: String,
    manager: Arc<dyn StackManager>,
}

impl ServiceUndeployer {
    pub fn new(namespace: &str, stack: &Stack, manager: Arc<dyn StackManager>) -> Self {
        Self {
            name: format!("service-undeploy:{}", stack.name),
            namespace: namespace.to_string(),
            service: stack.tag_or_empty(TAG_SERVICE).to_string(),
            environment: stack.tag_or_empty(TAG_ENVIRONMENT).to_string(),
            manager,
        }
    }

    /// Provider name of the service stack in its environment.
    pub fn stack_name(&self) -> String {
        stack_name(
            &self.namespace,
            StackType::Service.as_str(),
            &[self.service.as_str(), self.environment.as_str()],
        )
    }
}

#[async_trait]
impl Executor for ServiceUndeployer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        if self.service.is_empty() || self.environment.is_empty() {
            return Err(Error::InvalidInput(format!(
                "cannot undeploy service '{}' from environment '{}'",
                self.service, self.environment
            )));
        }
        info!(service = %self.service, environment = %self.environment, "Undeploying service");
        teardown_named_stack(self.manager.as_ref(), &self.stack_name()).await
    }
}
