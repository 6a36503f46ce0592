//! Purge planning and stack termination for provisioned stacks.
//!
//! Classifies the stack inventory, orders teardown across stack categories
//! and runs the resulting plan through a continue-on-failure pipeline.

pub mod confirm;
pub mod context;
pub mod environment;
mod named;
pub mod orchestrator;
pub mod pipeline;
pub mod service;
pub mod terminator;

#[cfg(test)]
pub(crate) mod testing;

pub use confirm::{CONFIRMATION_PHRASE, Operator, prompt_for_confirmation};
pub use context::PurgeContext;
pub use environment::{EnvironmentTier, environment_terminators};
pub use orchestrator::{CandidateRow, PurgeOrchestrator, PurgeSummary};
pub use terminator::StackTerminator;
