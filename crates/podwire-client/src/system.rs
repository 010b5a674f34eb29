//! System-wide operations: prune and version.

use podwire_common::constants::{SYSTEM_PRUNE_PATH, VERSION_PATH};
use podwire_common::types::{SystemPruneReport, Version};
use reqwest::Method;

use crate::connection::{Connection, QueryParams, push_flag};
use crate::error::Result;

/// Query parameters for `POST /system/prune`. Unset options are omitted so
/// the server applies its own defaults.
#[must_use]
pub fn prune_params(all: Option<bool>, volumes: Option<bool>) -> QueryParams {
    let mut params = QueryParams::new();
    push_flag(&mut params, "All", all);
    push_flag(&mut params, "Volumes", volumes);
    params
}

/// Removes all unused pods, containers, images and, optionally, volumes.
///
/// One call is exactly one request. Items the server failed to remove are
/// part of the returned report, not an error: run the report through
/// [`podwire_common::report::summarize`] to turn them into one.
///
/// # Errors
///
/// Returns [`crate::ClientError::Connection`] on transport failure,
/// [`crate::ClientError::Status`] if the server rejects the request and
/// [`crate::ClientError::ResponseDecode`] if the reply is malformed.
pub async fn prune(
    conn: &Connection,
    all: Option<bool>,
    volumes: Option<bool>,
) -> Result<SystemPruneReport> {
    let report: SystemPruneReport = conn
        .send_json(Method::POST, SYSTEM_PRUNE_PATH, &prune_params(all, volumes))
        .await?;
    tracing::info!(
        pods = report.pods.len(),
        volumes = report.volumes.len(),
        reclaimed = report.reclaimed_bytes(),
        "system prune finished"
    );
    Ok(report)
}

/// Engine build information.
///
/// # Errors
///
/// Same as [`prune`].
pub async fn version(conn: &Connection) -> Result<Version> {
    conn.send_json(Method::GET, VERSION_PATH, &QueryParams::new())
        .await
}
