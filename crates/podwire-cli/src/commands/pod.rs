//! `podwire pod`: Pod management.

use clap::{Args, Subcommand};
use podwire_client::{Connection, pods};
use podwire_common::report::summarize;

use crate::output;

/// Arguments for the `pod` command.
#[derive(Args, Debug)]
pub struct PodArgs {
    /// Pod subcommand.
    #[command(subcommand)]
    pub command: PodCommand,
}

/// `pod` subcommands.
#[derive(Subcommand, Debug)]
pub enum PodCommand {
    /// Remove all stopped pods and their containers.
    Prune(PruneArgs),
}

/// Arguments for `pod prune`.
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Also remove running pods.
    #[arg(short, long)]
    pub force: bool,
}

/// Executes a `pod` subcommand.
///
/// Every removed pod id is printed before any failure is reported.
///
/// # Errors
///
/// Returns an error if the request fails or any pod could not be removed.
pub async fn execute(conn: &Connection, args: PodArgs) -> anyhow::Result<()> {
    match args.command {
        PodCommand::Prune(prune) => {
            let report = pods::prune(conn, prune.force.then_some(true)).await?;
            output::print_ids(&report);
            output::finish(report.len(), summarize(&report))
        }
    }
}
