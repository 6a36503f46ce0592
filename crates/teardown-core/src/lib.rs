//! Core domain types and traits for stack teardown.
//!
//! This crate contains:
//! - Stack and resource types, with classification and filtering helpers
//! - Executor trait and pipeline executors
//! - Provider capability traits (listing, deleting, waiting, cleanup)

pub mod error;
pub mod executor;
pub mod provider;
pub mod resource;
pub mod stack;

pub use error::{Error, Result};
pub use executor::{Executor, FailurePolicy, PipelineExecutor, PipelineReport};
pub use resource::{Resource, ResourceKind};
pub use stack::{Stack, StackType};
