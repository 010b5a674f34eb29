//! CLI command definitions and dispatch.

pub mod events;
pub mod pod;
pub mod system;
pub mod version;

use clap::{Parser, Subcommand};
use podwire_client::Connection;
use podwire_common::config::ClientConfig;

/// Podwire, a client for a remote container engine.
#[derive(Parser, Debug)]
#[command(name = "podwire", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Engine service address.
    #[arg(long, global = true, env = podwire_common::constants::ENV_URL)]
    pub url: Option<String>,

    /// API version segment.
    #[arg(long, global = true, env = podwire_common::constants::ENV_API_VERSION)]
    pub api_version: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow engine lifecycle events.
    Events(events::EventsArgs),
    /// Manage the engine as a whole.
    System(system::SystemArgs),
    /// Manage pods.
    Pod(pod::PodArgs),
    /// Show client and engine versions.
    Version(version::VersionArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the connection cannot be configured or the command fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let conn = connect(cli.url, cli.api_version)?;
    match cli.command {
        Command::Events(args) => events::execute(conn, args).await,
        Command::System(args) => system::execute(&conn, args).await,
        Command::Pod(args) => pod::execute(&conn, args).await,
        Command::Version(args) => version::execute(&conn, args).await,
    }
}

fn connect(url: Option<String>, api_version: Option<String>) -> anyhow::Result<Connection> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = url {
        config.base_url = url;
    }
    if let Some(api_version) = api_version {
        config.api_version = api_version;
    }
    Ok(Connection::new(config)?)
}

/// Output format shared by commands that can emit JSON.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON document per record.
    Json,
}
