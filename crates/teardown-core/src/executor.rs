//! Executor trait and pipeline executors.
//!
//! An executor is a deferred, argument-less unit of work. Pipelines compose
//! executors into an ordered sequence and run them one at a time.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::Result;

/// Trait for deferred units of work.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Human-readable name of this step, used in logs and reports.
    fn name(&self) -> &str;

    /// Perform the work.
    async fn execute(&self) -> Result<()>;
}

/// What a pipeline does when one of its steps fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Halt at the first failure and propagate it.
    StopOnFailure,
    /// Log the failure and run the remaining steps.
    ContinueOnFailure,
}

/// A step that failed under [`FailurePolicy::ContinueOnFailure`].
#[derive(Debug, Clone)]
pub struct StepFailure {
    pub step: String,
    pub error: String,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<StepFailure>,
}

impl PipelineReport {
    /// Number of steps that were invoked.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs an ordered sequence of executors, strictly one after another.
pub struct PipelineExecutor {
    name: String,
    steps: Vec<Box<dyn Executor>>,
    policy: FailurePolicy,
}

impl PipelineExecutor {
    /// Pipeline that stops at the first failing step.
    pub fn new(steps: Vec<Box<dyn Executor>>) -> Self {
        Self {
            name: "pipeline".to_string(),
            steps,
            policy: FailurePolicy::StopOnFailure,
        }
    }

    /// Pipeline that runs every step regardless of failures.
    pub fn no_stop(steps: Vec<Box<dyn Executor>>) -> Self {
        Self {
            name: "pipeline".to_string(),
            steps,
            policy: FailurePolicy::ContinueOnFailure,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the steps, in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order.
    ///
    /// With [`FailurePolicy::StopOnFailure`] the first error is returned and
    /// the remaining steps are skipped. With
    /// [`FailurePolicy::ContinueOnFailure`] errors are logged and collected,
    /// and the run always succeeds.
    pub async fn run(&self) -> Result<PipelineReport> {
        let mut report = PipelineReport {
            total: self.steps.len(),
            ..Default::default()
        };

        for (index, step) in self.steps.iter().enumerate() {
            debug!(pipeline = %self.name, step = %step.name(), index, "Running step");

            match step.execute().await {
                Ok(()) => report.succeeded += 1,
                Err(e) => match self.policy {
                    FailurePolicy::StopOnFailure => {
                        error!(
                            pipeline = %self.name,
                            step = %step.name(),
                            error = %e,
                            "Step failed, stopping pipeline"
                        );
                        return Err(e);
                    }
                    FailurePolicy::ContinueOnFailure => {
                        error!(
                            pipeline = %self.name,
                            step = %step.name(),
                            error = %e,
                            "Step failed, continuing"
                        );
                        report.failures.push(StepFailure {
                            step: step.name().to_string(),
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl Executor for PipelineExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }
}
