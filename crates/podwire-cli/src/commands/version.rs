//! `podwire version`: Show client and engine versions.

use clap::Args;
use podwire_client::{Connection, system};

use super::Format;

/// Arguments for the `version` command.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// Executes the `version` command.
///
/// # Errors
///
/// Returns an error if the engine cannot be reached or its reply is invalid.
pub async fn execute(conn: &Connection, args: VersionArgs) -> anyhow::Result<()> {
    let server = system::version(conn).await?;

    if args.format == Format::Json {
        let doc = serde_json::json!({
            "Client": { "Version": env!("CARGO_PKG_VERSION") },
            "Server": server,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Client:");
    println!("  {:<18} {}", "Version:", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Server:");
    println!("  {:<18} {}", "Version:", server.version);
    println!("  {:<18} {}", "RemoteAPI Version:", server.remote_api_version);
    println!("  {:<18} {}", "Go Version:", server.go_version);
    if !server.git_commit.is_empty() {
        println!("  {:<18} {}", "Git Commit:", server.git_commit);
    }
    if let Some(built) = server.built_at() {
        println!("  {:<18} {}", "Built:", built.format("%a %b %e %H:%M:%S %Y"));
    }
    println!("  {:<18} {}", "OS/Arch:", server.os_arch);
    Ok(())
}
