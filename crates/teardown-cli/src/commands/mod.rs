//! CLI command implementations.

pub mod purge;
pub mod stacks;

use anyhow::{Result, bail};
use chrono::{DateTime, Local, Utc};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::Path;
use teardown_config::{PurgeConfig, SUPPRESS_CONFIRMATION, load_config};
use teardown_scheduler::CandidateRow;

/// Build the purge configuration from the config file and CLI overrides.
///
/// A missing config file is fine as long as a namespace is given on the
/// command line.
pub fn load_settings(
    path: &Path,
    namespace: Option<String>,
    assume_yes: bool,
) -> Result<PurgeConfig> {
    let mut config = if path.exists() {
        load_config(path)?
    } else if let Some(namespace) = &namespace {
        PurgeConfig::new(namespace.clone())
    } else {
        bail!(
            "config file {} not found and no --namespace given",
            path.display()
        );
    };

    if let Some(namespace) = namespace {
        config.namespace = namespace;
    }
    if assume_yes {
        config.set_param(SUPPRESS_CONFIRMATION, "yes");
    }
    Ok(config)
}

/// Colour for a provider status, by its suffix.
pub fn status_color(status: &str) -> Option<Color> {
    if status.ends_with("_COMPLETE") {
        Some(Color::Green)
    } else if status.ends_with("_FAILED") {
        Some(Color::Red)
    } else if status.ends_with("_IN_PROGRESS") {
        Some(Color::Yellow)
    } else {
        None
    }
}

/// Status followed by its reason, when there is one.
pub fn status_text(status: &str, reason: &str) -> String {
    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{status} {reason}")
    }
}

fn status_cell(status: &str, reason: &str) -> Cell {
    let cell = Cell::new(status_text(status, reason));
    match status_color(status) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Render stack rows as a table.
pub fn stack_table<'a>(rows: impl IntoIterator<Item = &'a CandidateRow>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Type"),
            Cell::new("Name"),
            Cell::new("Status"),
            Cell::new("Reason"),
            Cell::new("Last Update"),
        ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.stack_type).add_attribute(Attribute::Bold),
            Cell::new(&row.name),
            status_cell(&row.status, &row.status_reason),
            Cell::new(&row.status_reason),
            Cell::new(format_time(row.last_update_time)),
        ]);
    }

    table
}
