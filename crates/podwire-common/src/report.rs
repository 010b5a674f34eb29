//! Partial-success reporting for bulk operations.
//!
//! A bulk operation (prune, remove-many, ...) acts on several items in one
//! request and yields an outcome per item. [`BulkReport`] keeps every
//! outcome: successes in the order the server reported them, failures as
//! ordered `(id, cause)` pairs. An identifier lives in at most one of the
//! two collections. Replies from the server go through
//! [`BulkReport::reconcile`], which never rejects a reply for repeating an
//! identifier. [`summarize`] turns the failures into a single
//! [`AggregatedError`] without touching the report, so a caller can print
//! the successes and still fail the command afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{PodwireError, Result};

/// One failed item and the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure<C> {
    /// Identifier of the item that failed.
    pub id: String,
    /// Cause reported for this item.
    pub cause: C,
}

/// Outcome of a bulk operation: succeeded identifiers plus per-item failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkReport<C = String> {
    succeeded: Vec<String>,
    failed: Vec<ItemFailure<C>>,
}

impl<C> Default for BulkReport<C> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<C> BulkReport<C> {
    /// Starts building a report.
    #[must_use]
    pub fn builder() -> BulkReportBuilder<C> {
        BulkReportBuilder::default()
    }

    /// Builds a report from per-item outcomes, in encounter order.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::DuplicateItem`] if an identifier occurs twice.
    pub fn from_outcomes<I>(outcomes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, std::result::Result<(), C>)>,
    {
        let mut builder = Self::builder();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => builder.succeeded(id)?,
                Err(cause) => builder.failed(id, cause)?,
            }
        }
        Ok(builder.build())
    }

    /// Builds a report from outcomes as a server reported them.
    ///
    /// A repeated identifier never discards the other outcomes: the first
    /// outcome is kept, except that a later failure replaces an earlier
    /// success. Every repeat is logged.
    #[must_use]
    pub fn reconcile<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (String, std::result::Result<(), C>)>,
    {
        let mut report = Self::default();
        let mut failed_by_id: HashMap<String, bool> = HashMap::new();
        for (id, outcome) in outcomes {
            match (failed_by_id.get(&id).copied(), outcome) {
                (None, Ok(())) => {
                    let _ = failed_by_id.insert(id.clone(), false);
                    report.succeeded.push(id);
                }
                (None, Err(cause)) => {
                    let _ = failed_by_id.insert(id.clone(), true);
                    report.failed.push(ItemFailure { id, cause });
                }
                (Some(false), Err(cause)) => {
                    tracing::warn!(id = %id, "item reported as both removed and failed, keeping the failure");
                    report.succeeded.retain(|s| *s != id);
                    let _ = failed_by_id.insert(id.clone(), true);
                    report.failed.push(ItemFailure { id, cause });
                }
                (Some(_), _) => {
                    tracing::warn!(id = %id, "item reported more than once, keeping the first outcome");
                }
            }
        }
        report
    }

    /// Consumes the report, yielding successes then failures as outcomes.
    #[must_use]
    pub fn into_outcomes(self) -> impl Iterator<Item = (String, std::result::Result<(), C>)> {
        self.succeeded
            .into_iter()
            .map(|id| (id, Ok(())))
            .chain(self.failed.into_iter().map(|f| (f.id, Err(f.cause))))
    }

    /// Identifiers that were processed successfully, in server order.
    #[must_use]
    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    /// Items that failed, in encounter order.
    #[must_use]
    pub fn failed(&self) -> &[ItemFailure<C>] {
        &self.failed
    }

    /// Cause recorded for `id`, if that item failed.
    #[must_use]
    pub fn failure(&self, id: &str) -> Option<&C> {
        self.failed.iter().find(|f| f.id == id).map(|f| &f.cause)
    }

    /// Total number of items accounted for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Returns `true` if the operation touched no item at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if no item failed.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Concatenates several reports, keeping their relative order.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::DuplicateItem`] if two reports mention the
    /// same identifier.
    pub fn merge<I>(reports: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut builder = Self::builder();
        for report in reports {
            for id in report.succeeded {
                builder.succeeded(id)?;
            }
            for failure in report.failed {
                builder.failed(failure.id, failure.cause)?;
            }
        }
        Ok(builder.build())
    }
}

/// Incremental constructor for [`BulkReport`] that enforces identifier
/// uniqueness across both collections.
#[derive(Debug)]
pub struct BulkReportBuilder<C> {
    report: BulkReport<C>,
    seen: std::collections::HashSet<String>,
}

impl<C> Default for BulkReportBuilder<C> {
    fn default() -> Self {
        Self {
            report: BulkReport::default(),
            seen: std::collections::HashSet::new(),
        }
    }
}

impl<C> BulkReportBuilder<C> {
    /// Records a successful item.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::DuplicateItem`] if `id` was already recorded.
    pub fn succeeded(&mut self, id: impl Into<String>) -> Result<()> {
        let id = self.claim(id.into())?;
        self.report.succeeded.push(id);
        Ok(())
    }

    /// Records a failed item with its cause.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::DuplicateItem`] if `id` was already recorded.
    pub fn failed(&mut self, id: impl Into<String>, cause: C) -> Result<()> {
        let id = self.claim(id.into())?;
        self.report.failed.push(ItemFailure { id, cause });
        Ok(())
    }

    /// Finishes the report. It cannot be changed afterwards.
    #[must_use]
    pub fn build(self) -> BulkReport<C> {
        self.report
    }

    fn claim(&mut self, id: String) -> Result<String> {
        if self.seen.insert(id.clone()) {
            Ok(id)
        } else {
            Err(PodwireError::DuplicateItem { id })
        }
    }
}

/// One error value standing for every failed item of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedError<C = String> {
    causes: Vec<ItemFailure<C>>,
}

impl<C> AggregatedError<C> {
    /// Per-item failures, in encounter order. Never empty.
    #[must_use]
    pub fn causes(&self) -> &[ItemFailure<C>] {
        &self.causes
    }

    /// Number of failed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.causes.len()
    }

    /// Always `false`; an aggregated error holds at least one cause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// Consumes the error, yielding its causes.
    #[must_use]
    pub fn into_causes(self) -> Vec<ItemFailure<C>> {
        self.causes
    }
}

impl<C: fmt::Display> fmt::Display for AggregatedError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.causes.len() == 1 { "item" } else { "items" };
        write!(f, "{} {noun} failed", self.causes.len())?;
        for (i, failure) in self.causes.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", failure.id, failure.cause)?;
        }
        Ok(())
    }
}

impl<C: fmt::Debug + fmt::Display> std::error::Error for AggregatedError<C> {}

/// Collapses a report's failures into one error.
///
/// Returns `Ok(())` when nothing failed, otherwise an [`AggregatedError`]
/// with exactly one cause per failed item, in encounter order. The report
/// is left untouched.
///
/// # Errors
///
/// Returns the aggregated failure when at least one item failed.
pub fn summarize<C: Clone>(report: &BulkReport<C>) -> std::result::Result<(), AggregatedError<C>> {
    if report.failed.is_empty() {
        return Ok(());
    }
    Err(AggregatedError {
        causes: report.failed.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_report() -> BulkReport {
        BulkReport::from_outcomes([
            ("pod-a".to_string(), Ok(())),
            ("pod-b".to_string(), Err("pod is running".to_string())),
            ("pod-c".to_string(), Ok(())),
            ("pod-d".to_string(), Err("device busy".to_string())),
        ])
        .expect("unique ids")
    }

    #[test]
    fn summarize_is_ok_when_nothing_failed() {
        let report: BulkReport =
            BulkReport::from_outcomes([("a".to_string(), Ok(()))]).expect("unique");
        assert!(summarize(&report).is_ok());
    }

    #[test]
    fn summarize_is_ok_for_empty_report() {
        let report: BulkReport = BulkReport::default();
        assert!(report.is_empty());
        assert!(summarize(&report).is_ok());
    }

    #[test]
    fn summarize_keeps_one_cause_per_failure_in_order() {
        let report = mixed_report();
        let err = summarize(&report).expect_err("two failures");
        let ids: Vec<_> = err.causes().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["pod-b", "pod-d"]);
        assert_eq!(err.len(), report.failed().len());
    }

    #[test]
    fn successes_remain_visible_alongside_error() {
        let report = mixed_report();
        assert!(summarize(&report).is_err());
        assert_eq!(report.succeeded(), ["pod-a", "pod-c"]);
    }

    #[test]
    fn summarize_is_repeatable() {
        let report = mixed_report();
        assert_eq!(summarize(&report), summarize(&report));
        assert_eq!(report, mixed_report());
    }

    #[test]
    fn failed_ids_never_appear_in_succeeded() {
        let report = mixed_report();
        for failure in report.failed() {
            assert!(!report.succeeded().contains(&failure.id));
        }
    }

    #[test]
    fn duplicate_id_is_rejected_across_collections() {
        let mut builder = BulkReport::<String>::builder();
        builder.succeeded("ctr-1").expect("first");
        let err = builder
            .failed("ctr-1", "in use".to_string())
            .expect_err("duplicate");
        assert!(matches!(err, PodwireError::DuplicateItem { id } if id == "ctr-1"));
    }

    #[test]
    fn reconcile_keeps_every_item_when_an_id_repeats() {
        let report: BulkReport = BulkReport::reconcile([
            ("a".to_string(), Ok(())),
            ("b".to_string(), Ok(())),
            ("a".to_string(), Err("x".to_string())),
            ("c".to_string(), Err("busy".to_string())),
            ("c".to_string(), Ok(())),
        ]);
        assert_eq!(report.succeeded(), ["b"]);
        assert_eq!(report.failure("a").map(String::as_str), Some("x"));
        assert_eq!(report.failure("c").map(String::as_str), Some("busy"));
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn reconcile_keeps_first_failure_cause() {
        let report: BulkReport = BulkReport::reconcile([
            ("a".to_string(), Err("first".to_string())),
            ("a".to_string(), Err("second".to_string())),
        ]);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failure("a").map(String::as_str), Some("first"));
    }

    #[test]
    fn failure_lookup_by_id() {
        let report = mixed_report();
        assert_eq!(report.failure("pod-d").map(String::as_str), Some("device busy"));
        assert_eq!(report.failure("pod-a"), None);
    }

    #[test]
    fn merge_preserves_report_order() {
        let pods: BulkReport =
            BulkReport::from_outcomes([("p1".to_string(), Ok(()))]).expect("unique");
        let volumes: BulkReport = BulkReport::from_outcomes([
            ("v1".to_string(), Err("in use".to_string())),
            ("v2".to_string(), Ok(())),
        ])
        .expect("unique");

        let merged = BulkReport::merge([pods, volumes]).expect("disjoint");
        assert_eq!(merged.succeeded(), ["p1", "v2"]);
        assert_eq!(merged.failed().len(), 1);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn aggregated_error_display_lists_every_item() {
        let err = summarize(&mixed_report()).expect_err("failures");
        assert_eq!(
            err.to_string(),
            "2 items failed: pod-b: pod is running; pod-d: device busy"
        );
    }
}
