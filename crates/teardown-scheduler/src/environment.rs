//! Environment teardown.
//!
//! An environment is removed tier by tier, from the services running in it
//! down to its network, so that nothing is deleted while something above
//! it still depends on it.

use async_trait::async_trait;
use teardown_core::stack::{TAG_ENVIRONMENT, TAG_SERVICE, TAG_TYPE, filter_by_tag, stack_name};
use teardown_core::{Error, Executor, Result, Stack, StackType};
use tracing::{error, info};

use crate::context::PurgeContext;
use crate::named::{into_result, teardown_named_stack, teardown_stacks};

const DATABASE_TYPE: &str = "database";
const CONSUL_TYPE: &str = "consul";
const LOAD_BALANCER_TYPE: &str = "loadbalancer";
const TARGET_TYPE: &str = "target";

/// One layer of an environment, in teardown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentTier {
    Services,
    Databases,
    Cluster,
    ServiceDiscovery,
    Roleset,
    LoadBalancer,
    Network,
}

impl EnvironmentTier {
    /// Every tier, in the order it must be torn down.
    pub const ORDER: [EnvironmentTier; 7] = [
        EnvironmentTier::Services,
        EnvironmentTier::Databases,
        EnvironmentTier::Cluster,
        EnvironmentTier::ServiceDiscovery,
        EnvironmentTier::Roleset,
        EnvironmentTier::LoadBalancer,
        EnvironmentTier::Network,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentTier::Services => "services",
            EnvironmentTier::Databases => "databases",
            EnvironmentTier::Cluster => "cluster",
            EnvironmentTier::ServiceDiscovery => "service-discovery",
            EnvironmentTier::Roleset => "roleset",
            EnvironmentTier::LoadBalancer => "load-balancer",
            EnvironmentTier::Network => "network",
        }
    }
}

impl std::fmt::Display for EnvironmentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tears down one tier of one environment.
pub struct EnvironmentTerminator {
    name: String,
    tier: EnvironmentTier,
    environment: String,
    ctx: PurgeContext,
}

impl EnvironmentTerminator {
    pub fn new(ctx: PurgeContext, tier: EnvironmentTier, stack: &Stack) -> Self {
        Self {
            name: format!("environment-{tier}:{}", stack.name),
            tier,
            environment: stack.tag_or_empty(TAG_ENVIRONMENT).to_string(),
            ctx,
        }
    }

    pub fn tier(&self) -> EnvironmentTier {
        self.tier
    }

    fn named(&self, stack_type: &str) -> String {
        stack_name(&self.ctx.namespace, stack_type, &[self.environment.as_str()])
    }

    async fn terminate_services(&self) -> Result<()> {
        info!(environment = %self.environment, "Terminating services");
        let stacks = self.ctx.stacks.list_stacks(StackType::Service).await?;
        let services = filter_by_tag(&stacks, TAG_ENVIRONMENT, &self.environment);

        let mut failures = teardown_stacks(self.ctx.stacks.as_ref(), &services).await;
        for stack in &services {
            let service = stack.tag_or_empty(TAG_SERVICE);
            if let Err(e) = self
                .ctx
                .rolesets
                .delete_service_roleset(&self.environment, service)
                .await
            {
                error!(service = %service, error = %e, "Couldn't delete service roleset");
                failures.push(format!("{service} roleset: {e}"));
            }
        }

        into_result("service teardown", failures)
    }

    async fn terminate_databases(&self) -> Result<()> {
        info!(environment = %self.environment, "Terminating databases");
        let stacks = self.ctx.stacks.list_stacks(StackType::All).await?;
        let databases = filter_by_tag(&stacks, TAG_TYPE, DATABASE_TYPE);
        let databases = filter_by_tag(&databases, TAG_ENVIRONMENT, &self.environment);

        let failures = teardown_stacks(self.ctx.stacks.as_ref(), &databases).await;
        into_result("database teardown", failures)
    }

    async fn terminate_named(&self, stack_type: &str) -> Result<()> {
        let name = self.named(stack_type);
        info!(environment = %self.environment, stack = %name, "Terminating {}", self.tier);
        teardown_named_stack(self.ctx.stacks.as_ref(), &name).await
    }

    async fn terminate_network(&self) -> Result<()> {
        let vpc = self.terminate_named(StackType::Vpc.as_str()).await;
        let target = self.terminate_named(TARGET_TYPE).await;
        vpc.and(target)
    }
}

#[async_trait]
impl Executor for EnvironmentTerminator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        if self.environment.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{}: no environment tag",
                self.name
            )));
        }
        match self.tier {
            EnvironmentTier::Services => self.terminate_services().await,
            EnvironmentTier::Databases => self.terminate_databases().await,
            EnvironmentTier::Cluster => self.terminate_named(StackType::Environment.as_str()).await,
            EnvironmentTier::ServiceDiscovery => self.terminate_named(CONSUL_TYPE).await,
            EnvironmentTier::Roleset => {
                info!(environment = %self.environment, "Terminating roleset");
                self.ctx
                    .rolesets
                    .delete_environment_roleset(&self.environment)
                    .await
            }
            EnvironmentTier::LoadBalancer => self.terminate_named(LOAD_BALANCER_TYPE).await,
            EnvironmentTier::Network => self.terminate_network().await,
        }
    }
}

/// The ordered teardown steps for one environment stack.
pub fn environment_terminators(ctx: &PurgeContext, stack: &Stack) -> Vec<Box<dyn Executor>> {
    EnvironmentTier::ORDER
        .iter()
        .map(|tier| {
            Box::new(EnvironmentTerminator::new(ctx.clone(), *tier, stack)) as Box<dyn Executor>
        })
        .collect()
}
