//! `podwire system`: Whole-engine maintenance.

use clap::{Args, Subcommand};
use podwire_client::{Connection, system};
use podwire_common::report::summarize;

use crate::output;

/// Arguments for the `system` command.
#[derive(Args, Debug)]
pub struct SystemArgs {
    /// System subcommand.
    #[command(subcommand)]
    pub command: SystemCommand,
}

/// `system` subcommands.
#[derive(Subcommand, Debug)]
pub enum SystemCommand {
    /// Remove unused pods, containers, images and, optionally, volumes.
    Prune(PruneArgs),
}

/// Arguments for `system prune`.
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Remove all unused images, not just dangling ones.
    #[arg(short, long)]
    pub all: bool,

    /// Prune volumes too.
    #[arg(long)]
    pub volumes: bool,
}

/// Executes a `system` subcommand.
///
/// # Errors
///
/// Returns an error if the request fails or any item could not be removed.
pub async fn execute(conn: &Connection, args: SystemArgs) -> anyhow::Result<()> {
    match args.command {
        SystemCommand::Prune(prune) => execute_prune(conn, prune).await,
    }
}

async fn execute_prune(conn: &Connection, args: PruneArgs) -> anyhow::Result<()> {
    let report = system::prune(
        conn,
        args.all.then_some(true),
        args.volumes.then_some(true),
    )
    .await?;

    output::print_section("Deleted Pods", &report.pod_report());
    output::print_section("Deleted Containers", &report.container_report());
    output::print_section("Deleted Images", &report.image_report());
    if args.volumes {
        output::print_section("Deleted Volumes", &report.volume_report());
    }
    output::print_reclaimed(report.reclaimed_bytes());

    let combined = report.combined();
    output::finish(combined.len(), summarize(&combined))
}
