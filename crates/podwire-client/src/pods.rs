//! Pod operations.

use podwire_common::constants::POD_PRUNE_PATH;
use podwire_common::report::BulkReport;
use podwire_common::types::{ItemResult, report_from_items};
use reqwest::Method;

use crate::connection::{Connection, QueryParams, push_flag};
use crate::error::Result;

/// Removes every stopped pod and its containers.
///
/// `force` also removes running pods; `None` leaves the choice to the server.
///
/// # Errors
///
/// Returns a transport, status or decode error for the request itself.
/// Pods that could not be removed are reported in the returned value, and
/// a pod the server lists twice never hides the others.
pub async fn prune(conn: &Connection, force: Option<bool>) -> Result<BulkReport> {
    let mut params = QueryParams::new();
    push_flag(&mut params, "force", force);

    let items: Option<Vec<ItemResult>> = conn
        .send_json(Method::POST, POD_PRUNE_PATH, &params)
        .await?;
    let report = report_from_items(items.as_deref().unwrap_or_default());
    tracing::info!(
        removed = report.succeeded().len(),
        failed = report.failed().len(),
        "pod prune finished"
    );
    Ok(report)
}
