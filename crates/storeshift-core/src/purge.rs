//! Purge engine: count-verified removal of stale source descriptors.
//!
//! The three-way gate below is the safety barrier between a finished copy
//! and irreversible deletion of source references: nothing is mutated
//! unless every record with a source copy also has a target copy.

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{MigrateError, Result};

/// Outcome of one purge invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// No record carries a source descriptor; nothing to do.
    NothingToPurge,
    /// The bulk-unset ran; `records` descriptors were removed.
    Purged { records: u64 },
}

/// Remove the source-backend descriptor from every record, if and only if
/// the target-backend record count has caught up with the source count.
///
/// Counts test descriptor existence, not content size. A count mismatch is
/// a fatal consistency error and performs no mutation; a failure of the
/// bulk update itself is surfaced as-is (no retry, no partial recovery).
pub async fn purge(
    catalog: &dyn Catalog,
    source_name: &str,
    target_name: &str,
) -> Result<PurgeOutcome> {
    let source_count = catalog.count_with_copy(source_name).await?;
    let target_count = catalog.count_with_copy(target_name).await?;

    debug!(
        collection = catalog.name(),
        source_count, target_count, "purge counts"
    );

    if source_count == 0 {
        debug!(collection = catalog.name(), "nothing to purge");
        return Ok(PurgeOutcome::NothingToPurge);
    }

    if target_count < source_count {
        return Err(MigrateError::InconsistentCounts {
            source_count,
            target_count,
        });
    }

    let records = catalog.unset_copy(source_name).await?;
    info!(
        collection = catalog.name(),
        records, "purge completed: source descriptors removed"
    );
    Ok(PurgeOutcome::Purged { records })
}
