//! Stack inventory listing.

use anyhow::Result;
use teardown_core::provider::StackLister;
use teardown_core::{Stack, StackType};
use teardown_scheduler::CandidateRow;

use super::stack_table;

/// Print the stacks of a type.
pub async fn list(provider: &dyn StackLister, stack_type: StackType) -> Result<Vec<Stack>> {
    let stacks = provider.list_stacks(stack_type).await?;
    let rows: Vec<CandidateRow> = stacks.iter().map(row).collect();

    println!("{}", stack_table(&rows));
    println!("{} stacks", rows.len());

    Ok(stacks)
}

fn row(stack: &Stack) -> CandidateRow {
    CandidateRow {
        stack_type: stack.type_tag().unwrap_or("-").to_string(),
        name: stack.name.clone(),
        status: stack.status.clone(),
        status_reason: stack.status_reason.clone(),
        last_update_time: stack.last_update_time,
    }
}
