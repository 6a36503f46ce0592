//! Purge orchestrator - tears down every tagged stack in dependency order.
//!
//! Categories are removed in a fixed order that mirrors how the platform
//! provisions them:
//!
//! 1. schedules (attached to services)
//! 2. services
//! 3. environments, tier by tier
//! 4. pipelines
//! 5. buckets
//! 6. image repositories
//! 7. networks
//! 8. access roles
//!
//! Within a category the steps are independent of each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use teardown_core::provider::SUPPRESS_CONFIRMATION;
use teardown_core::stack::filter_by_type;
use teardown_core::{Error, Executor, PipelineExecutor, PipelineReport, Result, Stack, StackType};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::confirm::Operator;
use crate::context::PurgeContext;
use crate::environment::environment_terminators;
use crate::pipeline::pipeline_terminators;
use crate::service::{ServiceLookup, ServiceUndeployer};
use crate::terminator::StackTerminator;

/// Categories removed by a plain stack terminator after pipelines, in order.
const TRAILING_CATEGORIES: [StackType; 4] = [
    StackType::Bucket,
    StackType::Repo,
    StackType::Vpc,
    StackType::Iam,
];

/// One purge candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow {
    pub stack_type: String,
    pub name: String,
    pub status: String,
    pub status_reason: String,
    pub last_update_time: DateTime<Utc>,
}

/// Every stack a purge run will try to remove.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeSummary {
    pub rows: Vec<CandidateRow>,
}

impl PurgeSummary {
    /// Candidates are the stacks carrying a non-empty `type` tag.
    pub fn from_stacks(stacks: &[Stack]) -> Self {
        let rows = stacks
            .iter()
            .filter_map(|stack| {
                stack.type_tag().map(|stack_type| CandidateRow {
                    stack_type: stack_type.to_string(),
                    name: stack.name.clone(),
                    status: stack.status.clone(),
                    status_reason: stack.status_reason.clone(),
                    last_update_time: stack.last_update_time,
                })
            })
            .collect();
        Self { rows }
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Orchestrates a purge of every tagged stack.
pub struct PurgeOrchestrator {
    ctx: PurgeContext,
    operator: Arc<dyn Operator>,
}

impl PurgeOrchestrator {
    pub fn new(ctx: PurgeContext, operator: Arc<dyn Operator>) -> Self {
        Self { ctx, operator }
    }

    /// Build the ordered plan for a stack inventory.
    pub fn build_plan(&self, stacks: &[Stack]) -> PipelineExecutor {
        let ctx = &self.ctx;
        let mut steps: Vec<Box<dyn Executor>> = Vec::new();

        // scheduled tasks are attached to services, so they must be deleted first
        for stack in filter_by_type(stacks, StackType::Schedule) {
            steps.push(Box::new(StackTerminator::new(stack, ctx.stacks.clone())));
        }

        for stack in filter_by_type(stacks, StackType::Service) {
            steps.push(Box::new(ServiceLookup::new(&stack)));
            steps.push(Box::new(ServiceUndeployer::new(
                &ctx.namespace,
                &stack,
                ctx.stacks.clone(),
            )));
        }

        for stack in filter_by_type(stacks, StackType::Environment) {
            steps.extend(environment_terminators(ctx, &stack));
        }

        for stack in filter_by_type(stacks, StackType::Pipeline) {
            steps.extend(pipeline_terminators(ctx, &stack));
        }

        for category in TRAILING_CATEGORIES {
            for stack in filter_by_type(stacks, category) {
                debug!(stack = %stack.name, tags = ?stack.tags, "Adding {category} stack");
                steps.push(Box::new(StackTerminator::new(stack, ctx.stacks.clone())));
            }
        }

        PipelineExecutor::no_stop(steps).with_name("purge")
    }

    /// Run a purge: list, summarize, confirm, then execute the plan.
    ///
    /// Returns [`Error::Cancelled`] when the operator declines; nothing has
    /// been deleted at that point. Failures of individual steps are logged
    /// and collected in the report, never returned.
    pub async fn purge(&self) -> Result<PipelineReport> {
        let run_id = Uuid::now_v7();
        let span = info_span!("purge", %run_id, namespace = %self.ctx.namespace);
        self.purge_inner().instrument(span).await
    }

    async fn purge_inner(&self) -> Result<PipelineReport> {
        let stacks = match self.ctx.stacks.list_stacks(StackType::All).await {
            Ok(stacks) => stacks,
            Err(e) => {
                warn!(error = %e, "Couldn't list stacks (all)");
                Vec::new()
            }
        };

        let summary = PurgeSummary::from_stacks(&stacks);
        self.operator.present(&summary);

        let plan = self.build_plan(&stacks);
        info!(steps = plan.len(), "Total of {} stacks to purge", summary.count());

        if !self.confirmation_granted(&summary).await {
            error!("Aborting at user request");
            return Err(Error::Cancelled);
        }

        let report = plan.run().await?;
        info!(
            attempted = report.attempted(),
            failed = report.failures.len(),
            "Purge finished"
        );
        Ok(report)
    }

    async fn confirmation_granted(&self, summary: &PurgeSummary) -> bool {
        let suppress = self
            .ctx
            .params
            .get_param(SUPPRESS_CONFIRMATION)
            .await
            .unwrap_or_default();
        if suppress == "yes" {
            return true;
        }
        self.operator.confirm(summary)
    }
}

#[async_trait]
impl Executor for PurgeOrchestrator {
    fn name(&self) -> &str {
        "purge"
    }

    async fn execute(&self) -> Result<()> {
        self.purge().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingProvider, capture_logs};
    use std::sync::Mutex;
    use teardown_core::Resource;
    use teardown_core::resource::{ACCESS_ROLE_TYPE, STORAGE_BUCKET_TYPE};

    /// Operator that answers with a fixed reply and remembers what it saw.
    struct ScriptedOperator {
        answer: bool,
        presented: Mutex<Vec<usize>>,
        asked: Mutex<usize>,
    }

    impl ScriptedOperator {
        fn answering(answer: bool) -> Arc<Self> {
            Arc::new(Self {
                answer,
                presented: Mutex::new(Vec::new()),
                asked: Mutex::new(0),
            })
        }

        fn times_asked(&self) -> usize {
            *self.asked.lock().unwrap()
        }
    }

    impl Operator for ScriptedOperator {
        fn present(&self, summary: &PurgeSummary) {
            self.presented.lock().unwrap().push(summary.count());
        }

        fn confirm(&self, _summary: &PurgeSummary) -> bool {
            *self.asked.lock().unwrap() += 1;
            self.answer
        }
    }

    fn typed(name: &str, stack_type: &str) -> Stack {
        Stack::new(name, "CREATE_COMPLETE").with_tag("type", stack_type)
    }

    fn orchestrator(
        provider: &Arc<RecordingProvider>,
        operator: &Arc<ScriptedOperator>,
    ) -> PurgeOrchestrator {
        let ctx = PurgeContext::new("mu", provider.clone(), provider.clone(), provider.clone());
        PurgeOrchestrator::new(ctx, operator.clone())
    }

    fn one_of_each() -> Vec<Stack> {
        vec![
            typed("iam-1", "iam"),
            typed("vpc-1", "vpc"),
            typed("repo-1", "repo"),
            typed("bucket-1", "bucket"),
            typed("pipe-1", "pipeline").with_tag("service", "api"),
            typed("env-1", "environment").with_tag("environment", "dev"),
            typed("svc-1", "service")
                .with_tag("service", "api")
                .with_tag("environment", "dev"),
            typed("sched-1", "schedule"),
        ]
    }

    #[test]
    fn test_plan_orders_categories() {
        let provider = Arc::new(RecordingProvider::new());
        let operator = ScriptedOperator::answering(true);

        let plan = orchestrator(&provider, &operator).build_plan(&one_of_each());

        assert_eq!(
            plan.step_names(),
            vec![
                "terminate:sched-1",
                "service-lookup:svc-1",
                "service-undeploy:svc-1",
                "environment-services:env-1",
                "environment-databases:env-1",
                "environment-cluster:env-1",
                "environment-service-discovery:env-1",
                "environment-roleset:env-1",
                "environment-load-balancer:env-1",
                "environment-network:env-1",
                "pipeline-lookup:pipe-1",
                "pipeline-terminate:pipe-1",
                "pipeline-roleset:pipe-1",
                "terminate:bucket-1",
                "terminate:repo-1",
                "terminate:vpc-1",
                "terminate:iam-1",
            ]
        );
    }

    #[test]
    fn test_plan_keeps_inventory_order_within_category() {
        let provider = Arc::new(RecordingProvider::new());
        let operator = ScriptedOperator::answering(true);
        let stacks = vec![
            typed("b-2", "bucket"),
            typed("vpc-1", "vpc"),
            typed("b-1", "bucket"),
        ];

        let plan = orchestrator(&provider, &operator).build_plan(&stacks);

        assert_eq!(
            plan.step_names(),
            vec!["terminate:b-2", "terminate:b-1", "terminate:vpc-1"]
        );
    }

    #[test]
    fn test_untyped_stacks_are_excluded() {
        let provider = Arc::new(RecordingProvider::new());
        let operator = ScriptedOperator::answering(true);
        let stacks = vec![
            Stack::new("no-tags", "CREATE_COMPLETE"),
            typed("empty-type", ""),
            Stack::new("other-tags", "CREATE_COMPLETE").with_tag("service", "api"),
        ];

        assert_eq!(PurgeSummary::from_stacks(&stacks).count(), 0);
        assert!(orchestrator(&provider, &operator).build_plan(&stacks).is_empty());
    }

    #[test]
    fn test_summary_rows() {
        let stacks = vec![
            typed("bucket-1", "bucket").with_reason("User Initiated"),
            Stack::new("plain", "CREATE_COMPLETE"),
        ];

        let summary = PurgeSummary::from_stacks(&stacks);

        assert_eq!(summary.count(), 1);
        let row = &summary.rows[0];
        assert_eq!(row.stack_type, "bucket");
        assert_eq!(row.name, "bucket-1");
        assert_eq!(row.status, "CREATE_COMPLETE");
        assert_eq!(row.status_reason, "User Initiated");
    }

    #[tokio::test]
    async fn test_declined_confirmation_runs_nothing() {
        let mut provider = RecordingProvider::new();
        for stack in one_of_each() {
            provider = provider.with_stack(stack);
        }
        let provider = Arc::new(provider.with_param(SUPPRESS_CONFIRMATION, "no"));
        let operator = ScriptedOperator::answering(false);

        let err = orchestrator(&provider, &operator).purge().await.unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(operator.times_asked(), 1);
        assert_eq!(
            provider.calls(),
            vec!["list_stacks:*", "get_param:suppressConfirmation"]
        );
    }

    #[tokio::test]
    async fn test_suppressed_confirmation_skips_prompt() {
        let provider = Arc::new(
            RecordingProvider::new()
                .with_stack(typed("bucket-1", "bucket"))
                .with_param(SUPPRESS_CONFIRMATION, "yes"),
        );
        let operator = ScriptedOperator::answering(false);

        let report = orchestrator(&provider, &operator).purge().await.unwrap();

        assert_eq!(operator.times_asked(), 0);
        assert_eq!(report.succeeded, 1);
        assert_eq!(provider.calls_to("delete_stack"), vec!["delete_stack:bucket-1"]);
    }

    #[tokio::test]
    async fn test_missing_param_still_asks() {
        let provider = Arc::new(RecordingProvider::new());
        let operator = ScriptedOperator::answering(true);

        orchestrator(&provider, &operator).purge().await.unwrap();

        assert_eq!(operator.times_asked(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_purges_nothing_but_succeeds() {
        let (logs, _guard) = capture_logs();
        let provider = Arc::new(RecordingProvider::new().failing("list_stacks:*"));
        let operator = ScriptedOperator::answering(true);

        let report = orchestrator(&provider, &operator).purge().await.unwrap();

        assert_eq!(report.total, 0);
        assert_eq!(*operator.presented.lock().unwrap(), vec![0]);
        assert!(logs.contents().contains("Couldn't list stacks"));
    }

    #[tokio::test]
    async fn test_service_then_environment_example() {
        let stacks = vec![
            typed("svc-a", "service")
                .with_tag("service", "a")
                .with_tag("environment", "prod"),
            typed("env-prod", "environment").with_tag("environment", "prod"),
        ];
        let mut provider = RecordingProvider::new();
        for stack in stacks.clone() {
            provider = provider.with_stack(stack);
        }
        let provider = Arc::new(provider);
        let operator = ScriptedOperator::answering(true);
        let purge = orchestrator(&provider, &operator);

        let plan = purge.build_plan(&stacks);
        let names = plan.step_names();
        assert_eq!(names.len(), 9);
        assert_eq!(names[1], "service-undeploy:svc-a");
        assert!(
            names[2..]
                .iter()
                .all(|n| n.starts_with("environment-") && n.ends_with(":env-prod"))
        );

        let report = purge.purge().await.unwrap();
        assert_eq!(report.attempted(), 9);
        assert!(report.is_clean());
        assert_eq!(operator.times_asked(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_purge() {
        let provider = Arc::new(
            RecordingProvider::new()
                .with_stack(typed("bucket-1", "bucket").with_tag("namespace", "mu"))
                .with_stack(typed("bucket-2", "bucket"))
                .with_stack(typed("vpc-1", "vpc"))
                .with_resources(
                    "bucket-1",
                    vec![
                        Resource::new(STORAGE_BUCKET_TYPE, Some("data".into())),
                        Resource::new(ACCESS_ROLE_TYPE, Some("role".into())),
                    ],
                )
                .failing("get_resources:bucket-2")
                .failing("delete_bucket_objects:data")
                .with_param(SUPPRESS_CONFIRMATION, "yes"),
        );
        let operator = ScriptedOperator::answering(false);

        let report = orchestrator(&provider, &operator).purge().await.unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, "terminate:bucket-2");
        assert_eq!(
            provider.calls_to("delete_stack"),
            vec!["delete_stack:bucket-1", "delete_stack:vpc-1"]
        );
        assert_eq!(provider.calls_to("delete_roles"), vec!["delete_roles:mu"]);
    }
}
