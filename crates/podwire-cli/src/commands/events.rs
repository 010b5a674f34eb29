//! `podwire events`: Follow engine lifecycle events.

use clap::Args;
use podwire_client::{CancellationSignal, Connection, EventOptions, events};
use podwire_common::filters::FilterSet;
use tokio::sync::mpsc;

use super::Format;
use crate::output;

/// Arguments for the `events` command.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Show events created since this timestamp or duration.
    #[arg(long)]
    pub since: Option<String>,

    /// Show events created until this timestamp or duration.
    #[arg(long)]
    pub until: Option<String>,

    /// Filter output, as `name=value`. May be repeated.
    #[arg(short, long = "filter", value_name = "NAME=VALUE")]
    pub filters: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// Executes the `events` command.
///
/// Streams events until the server ends the feed or Ctrl+C is pressed.
///
/// # Errors
///
/// Returns an error if the filters are invalid, the stream cannot be opened,
/// or it breaks mid-record.
pub async fn execute(conn: Connection, args: EventsArgs) -> anyhow::Result<()> {
    let mut filters = FilterSet::new();
    for pair in &args.filters {
        filters.insert_pair(pair)?;
    }
    let options = EventOptions {
        since: args.since,
        until: args.until,
        filters,
        deadline: None,
    };

    let cancel = CancellationSignal::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || {
        let _ = on_interrupt.fire();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    let (tx, mut rx) = mpsc::channel(64);
    let feed =
        tokio::spawn(async move { events::subscribe(&conn, tx, Some(cancel), options).await });

    while let Some(event) = rx.recv().await {
        output::print_event(&event, args.format)?;
    }

    feed.await??;
    tracing::debug!("event stream closed");
    Ok(())
}
