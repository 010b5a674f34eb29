//! Formatted output helpers for CLI commands.
//!
//! Successes always go to stdout first; failures go to stderr afterwards,
//! so partial results stay visible when a bulk command fails.

use podwire_common::report::{AggregatedError, BulkReport};
use podwire_common::types::Event;

use crate::commands::Format;

/// Binary units above plain bytes, smallest first.
const BYTE_UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Renders a reclaimed-space figure with one decimal in the largest binary
/// unit that keeps the value at or above 1, e.g. `1.5 KiB`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = BYTE_UNITS[0];
    for next in &BYTE_UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// One-line text rendering of an event.
#[must_use]
pub fn event_line(event: &Event) -> String {
    let time = event
        .time()
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S%.f %z").to_string());
    let mut line = format!(
        "{time} {} {} {}",
        event.kind().unwrap_or("unknown"),
        event.action().unwrap_or("unknown"),
        event.actor_id().unwrap_or("-"),
    );
    let attrs: Vec<String> = ["name", "image"]
        .iter()
        .filter_map(|key| event.attribute(key).map(|v| format!("{key}={v}")))
        .collect();
    if !attrs.is_empty() {
        line.push_str(&format!(" ({})", attrs.join(", ")));
    }
    line
}

/// Prints one event in the requested format.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn print_event(event: &Event, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(event)?),
        Format::Text => println!("{}", event_line(event)),
    }
    Ok(())
}

/// Prints every succeeded identifier, one per line.
pub fn print_ids<C>(report: &BulkReport<C>) {
    for id in report.succeeded() {
        println!("{id}");
    }
}

/// Prints a titled block of succeeded identifiers, skipped when empty.
pub fn print_section<C>(title: &str, report: &BulkReport<C>) {
    if report.succeeded().is_empty() {
        return;
    }
    println!("{title}");
    print_ids(report);
}

/// Prints the space reclaimed by a prune.
pub fn print_reclaimed(bytes: u64) {
    println!("Total reclaimed space: {}", format_bytes(bytes));
}

/// Turns a summarized report into the command's outcome.
///
/// Each failure is written to stderr; the returned error only carries the count.
///
/// # Errors
///
/// Returns an error if at least one item failed.
pub fn finish(total: usize, summary: Result<(), AggregatedError>) -> anyhow::Result<()> {
    let Err(failures) = summary else {
        return Ok(());
    };
    for failure in failures.causes() {
        eprintln!("Error: {}: {}", failure.id, failure.cause);
    }
    Err(anyhow::anyhow!("{} of {total} items failed", failures.len()))
}
