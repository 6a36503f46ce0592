//! Delivery pipeline teardown steps.

use async_trait::async_trait;
use std::sync::Arc;
use teardown_core::provider::{RolesetDeleter, StackManager};
use teardown_core::stack::{TAG_SERVICE, stack_name};
use teardown_core::{Error, Executor, Result, Stack, StackType};
use tracing::info;

use crate::context::PurgeContext;
use crate::named::teardown_named_stack;
use crate::service::ServiceLookup;

/// Removes the pipeline stack of a service.
pub struct PipelineTerminator {
    name: String,
    namespace: String,
    service: String,
    manager: Arc<dyn StackManager>,
}

impl PipelineTerminator {
    pub fn new(namespace: &str, stack: &Stack, manager: Arc<dyn StackManager>) -> Self {
        Self {
            name: format!("pipeline-terminate:{}", stack.name),
            namespace: namespace.to_string(),
            service: stack.tag_or_empty(TAG_SERVICE).to_string(),
            manager,
        }
    }

    pub fn stack_name(&self) -> String {
        stack_name(
            &self.namespace,
            StackType::Pipeline.as_str(),
            &[self.service.as_str()],
        )
    }
}

#[async_trait]
impl Executor for PipelineTerminator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        require_service(&self.service, &self.name)?;
        info!(service = %self.service, "Terminating pipeline");
        teardown_named_stack(self.manager.as_ref(), &self.stack_name()).await
    }
}

/// Removes the role-set provisioned for a service's pipeline.
pub struct PipelineRolesetTerminator {
    name: String,
    service: String,
    rolesets: Arc<dyn RolesetDeleter>,
}

impl PipelineRolesetTerminator {
    pub fn new(stack: &Stack, rolesets: Arc<dyn RolesetDeleter>) -> Self {
        Self {
            name: format!("pipeline-roleset:{}", stack.name),
            service: stack.tag_or_empty(TAG_SERVICE).to_string(),
            rolesets,
        }
    }
}

#[async_trait]
impl Executor for PipelineRolesetTerminator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        require_service(&self.service, &self.name)?;
        self.rolesets.delete_pipeline_roleset(&self.service).await
    }
}

/// Lookup, stack teardown and role-set teardown for one pipeline stack.
pub fn pipeline_terminators(ctx: &PurgeContext, stack: &Stack) -> Vec<Box<dyn Executor>> {
    vec![
        Box::new(ServiceLookup::with_label("pipeline-lookup", stack)),
        Box::new(PipelineTerminator::new(
            &ctx.namespace,
            stack,
            ctx.stacks.clone(),
        )),
        Box::new(PipelineRolesetTerminator::new(stack, ctx.rolesets.clone())),
    ]
}

fn require_service(service: &str, step: &str) -> Result<()> {
    if service.is_empty() {
        return Err(Error::InvalidInput(format!("{step}: no service tag")));
    }
    Ok(())
}
