//! Batch reconciliation: fetched records → ledger mutations.

use std::fmt;

use tracing::{info, warn};

use order_ingestor::models::order::RemoteOrderRecord;

use crate::ledger::{LedgerStore, UpsertOutcome};
use crate::project::{ProjectionContext, project_order};

/// End-of-run visibility: how many records were processed vs. skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Distinct records considered after sort + dedup.
    pub fetched: usize,
    /// Newly appended orders.
    pub new_orders: usize,
    /// Existing orders with at least one tracked field rewritten.
    pub updated_orders: usize,
    /// Records dropped because projection failed.
    pub skipped: usize,
    /// New records dropped for lacking a paid date.
    pub dateless: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fetched, {} new, {} updated, {} skipped, {} dateless",
            self.fetched, self.new_orders, self.updated_orders, self.skipped, self.dateless
        )
    }
}

/// Reconciles one fetched batch into the store.
///
/// The merged fetch result is unordered and may repeat identifiers
/// across pages; reconciliation sorts ascending by identifier and keeps
/// the first occurrence, so bucketing sees a stable, deterministic
/// sequence. One bad record never aborts the batch: it is logged,
/// counted and skipped.
pub fn reconcile_orders(
    store: &mut LedgerStore,
    orders: &[RemoteOrderRecord],
    ctx: &ProjectionContext<'_>,
) -> SyncReport {
    let mut sorted: Vec<&RemoteOrderRecord> = orders.iter().collect();
    sorted.sort_by_key(|order| order.id);
    sorted.dedup_by_key(|order| order.id);

    let mut report = SyncReport {
        fetched: sorted.len(),
        ..SyncReport::default()
    };
    info!(
        fetched = sorted.len(),
        existing = store.data_rows().count(),
        "reconciling batch"
    );

    let mut aggregator = store.month_aggregator();
    for order in sorted {
        let projected = match project_order(order, ctx) {
            Ok(projected) => projected,
            Err(err) => {
                warn!(order = order.id, %err, "skipping unprojectable record");
                report.skipped += 1;
                continue;
            }
        };
        match store.upsert(&projected, &mut aggregator) {
            UpsertOutcome::Inserted => report.new_orders += 1,
            UpsertOutcome::Updated { fields_changed } if fields_changed > 0 => {
                report.updated_orders += 1;
            }
            UpsertOutcome::Updated { .. } => {}
            UpsertOutcome::SkippedDateless => report.dateless += 1,
        }
    }
    store.finish_batch(&mut aggregator);

    info!(%report, "batch reconciled");
    report
}
