//! Operator confirmation before a purge runs.

use std::io::{self, BufRead, Write};

use crate::orchestrator::PurgeSummary;

/// The exact phrase an operator must type to allow a purge.
pub const CONFIRMATION_PHRASE: &str = "Yes, I want to purge everything.";

/// The human in front of a purge run.
pub trait Operator: Send + Sync {
    /// Show the stacks about to be purged.
    fn present(&self, summary: &PurgeSummary);

    /// Ask for permission to proceed. Any answer but `true` aborts the purge.
    fn confirm(&self, summary: &PurgeSummary) -> bool;
}

/// Whether a line of operator input is the confirmation phrase.
///
/// Only the line terminator is stripped; the phrase must otherwise match
/// exactly.
pub fn is_confirmation(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == CONFIRMATION_PHRASE
}

/// Print the confirmation prompt and read one line of answer.
pub fn prompt_for_confirmation<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    candidates: usize,
) -> io::Result<bool> {
    write!(
        output,
        "Are you sure you want to purge the above {candidates} stacks? (use '{CONFIRMATION_PHRASE}' to confirm): "
    )?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(is_confirmation(&line))
}
