//! # podwire-client
//!
//! Async bindings for the engine's HTTP API.
//!
//! - [`events::subscribe`]: streams lifecycle events into a channel until
//!   the server closes the feed, a [`CancellationSignal`] fires, or a
//!   deadline passes.
//! - [`system::prune`] and [`pods::prune`]: bulk removals whose replies
//!   keep every per-item outcome.
//! - [`system::version`]: engine build information.
//!
//! # Example
//!
//! ```rust,no_run
//! use podwire_client::{events, CancellationSignal, Connection, EventOptions};
//! use podwire_common::config::ClientConfig;
//!
//! # async fn run() -> podwire_client::Result<()> {
//! let conn = Connection::new(ClientConfig::default())?;
//! let (tx, mut rx) = tokio::sync::mpsc::channel(32);
//! let cancel = CancellationSignal::new();
//!
//! let feed = tokio::spawn({
//!     let cancel = cancel.clone();
//!     async move { events::subscribe(&conn, tx, Some(cancel), EventOptions::default()).await }
//! });
//! if let Some(first) = rx.recv().await {
//!     println!("{:?}", first.action());
//! }
//! let _ = cancel.fire();
//! # let _ = feed.await;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod cancel;
pub mod connection;
mod decoder;
pub mod error;
pub mod events;
pub mod pods;
pub mod system;

pub use cancel::CancellationSignal;
pub use connection::Connection;
pub use error::{ClientError, Result, StreamFault};
pub use events::EventOptions;
