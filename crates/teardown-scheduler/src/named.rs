//! Teardown of stacks addressed by name rather than by inventory entry.

use teardown_core::provider::StackManager;
use teardown_core::stack::STATUS_DELETE_COMPLETE;
use teardown_core::{Error, Result, Stack};
use tracing::{error, info};

/// Delete a stack by name and wait until it is gone.
///
/// A stack that no longer exists counts as deleted.
pub(crate) async fn teardown_named_stack(manager: &dyn StackManager, name: &str) -> Result<()> {
    if manager.await_final_status(name).await.is_none() {
        info!(stack = %name, "Stack is already deleted");
        return Ok(());
    }

    manager.delete_stack(name).await?;

    match manager.await_final_status(name).await {
        Some(stack) if stack.status != STATUS_DELETE_COMPLETE => Err(failed_status(&stack)),
        _ => {
            info!(stack = %name, "Stack deleted");
            Ok(())
        }
    }
}

/// Delete every stack, then wait for each in turn.
///
/// Returns a description of each stack that could not be deleted.
pub(crate) async fn teardown_stacks(manager: &dyn StackManager, stacks: &[Stack]) -> Vec<String> {
    let mut failures = Vec::new();

    for stack in stacks {
        if let Err(e) = manager.delete_stack(&stack.name).await {
            error!(stack = %stack.name, error = %e, "DeleteStack failed");
            failures.push(format!("{}: {e}", stack.name));
        }
    }

    for stack in stacks {
        let Some(final_stack) = manager.await_final_status(&stack.name).await else {
            continue;
        };
        if final_stack.status != STATUS_DELETE_COMPLETE {
            let e = failed_status(&final_stack);
            error!(stack = %stack.name, error = %e, "Stack was not deleted");
            failures.push(format!("{}: {e}", stack.name));
        }
    }

    failures
}

/// Turn collected failures into a step result.
pub(crate) fn into_result(what: &str, failures: Vec<String>) -> Result<()> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::ExecutionFailed(format!(
            "{what}: {}",
            failures.join("; ")
        )))
    }
}

fn failed_status(stack: &Stack) -> Error {
    Error::ExecutionFailed(format!(
        "stack {} ended in failed status {} {}",
        stack.name, stack.status, stack.status_reason
    ))
}
