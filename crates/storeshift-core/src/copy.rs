//! Copy engine: stream pending records from the source backend to the
//! target backend.
//!
//! Candidate selection is a per-record predicate over an unfiltered scan:
//! a record is pending when its target descriptor exists with zero size.
//! Transfers run concurrently, optionally capped by a bounded task pool
//! and an aggregate rate limiter shared across the whole invocation.
//! Per-transfer stream failures are collected into the report; they never
//! abort sibling transfers.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::catalog::{Catalog, FileId, FileRecord};
use crate::error::Result;
use crate::pool::TaskPool;
use crate::throttle::RateLimiter;

/// Read/write chunk size for a single transfer step.
const COPY_CHUNK: usize = 64 * 1024;

/// Outcome of one copy invocation.
#[derive(Debug, Clone)]
pub struct CopyReport {
    /// Records scanned (the whole collection).
    pub scanned: usize,
    /// Records selected for transfer.
    pub pending: usize,
    /// Transfers that completed.
    pub transferred: usize,
    /// Records skipped as not candidates.
    pub skipped: usize,
    /// Total bytes moved by completed transfers.
    pub bytes_copied: u64,
    /// Per-record transfer failures, in completion order.
    pub failed: Vec<TransferFailure>,
}

impl CopyReport {
    /// Every pending candidate was either transferred or reported failed.
    pub fn is_complete(&self) -> bool {
        self.transferred + self.failed.len() == self.pending
    }
}

/// A single transfer that did not complete.
#[derive(Debug, Clone)]
pub struct TransferFailure {
    pub id: FileId,
    pub key: String,
    pub error: String,
}

struct Transferred {
    bytes: u64,
}

/// Copy every pending record from `source` to `target`.
///
/// `rate_limit_bytes_per_sec == 0` disables throttling;
/// `max_concurrent_transfers == 0` runs without a concurrency ceiling.
/// The returned future resolves once every issued transfer has finished
/// or failed; in-flight transfers cannot be cancelled.
pub async fn copy_all(
    catalog: &dyn Catalog,
    source: Arc<dyn StorageBackend>,
    target: Arc<dyn StorageBackend>,
    rate_limit_bytes_per_sec: u64,
    max_concurrent_transfers: usize,
    debug_logging: bool,
) -> Result<CopyReport> {
    let records = catalog.find_all().await?;
    let scanned = records.len();

    // One limiter instance for the whole invocation: the rate is an
    // aggregate cap across transfers, not per file.
    let limiter = (rate_limit_bytes_per_sec > 0)
        .then(|| Arc::new(RateLimiter::new(rate_limit_bytes_per_sec)));

    let mut pool = TaskPool::new(max_concurrent_transfers);
    let mut pending = 0usize;
    let mut skipped = 0usize;

    for record in records {
        if !record.is_pending(target.name()) {
            skipped += 1;
            if debug_logging {
                debug!(id = %record.id, name = %record.name, "skipping: not pending on target");
            }
            continue;
        }

        pending += 1;
        if debug_logging {
            debug!(id = %record.id, name = %record.name, "transfer queued");
        }
        let source = Arc::clone(&source);
        let target = Arc::clone(&target);
        let limiter = limiter.clone();
        pool.submit(transfer(record, source, target, limiter, debug_logging));
    }

    info!(
        collection = catalog.name(),
        scanned, pending, skipped, "copy started"
    );

    let mut transferred = 0usize;
    let mut bytes_copied = 0u64;
    let mut failed = Vec::new();
    for result in pool.join_all().await {
        match result {
            Ok(done) => {
                transferred += 1;
                bytes_copied += done.bytes;
            }
            Err(failure) => {
                warn!(
                    id = %failure.id,
                    key = %failure.key,
                    error = %failure.error,
                    "transfer failed"
                );
                failed.push(failure);
            }
        }
    }

    let report = CopyReport {
        scanned,
        pending,
        transferred,
        skipped,
        bytes_copied,
        failed,
    };

    if report.failed.is_empty() {
        info!(
            collection = catalog.name(),
            transferred = report.transferred,
            bytes = report.bytes_copied,
            "copy completed: all pending records copied"
        );
    } else {
        warn!(
            collection = catalog.name(),
            transferred = report.transferred,
            failed = report.failed.len(),
            "copy completed with failures"
        );
    }

    Ok(report)
}

/// One unit of work: move a single record's bytes and classify the result.
async fn transfer(
    record: FileRecord,
    source: Arc<dyn StorageBackend>,
    target: Arc<dyn StorageBackend>,
    limiter: Option<Arc<RateLimiter>>,
    debug_logging: bool,
) -> std::result::Result<Transferred, TransferFailure> {
    let key = record
        .copies
        .get(target.name())
        .map(|copy| copy.key.clone())
        .unwrap_or_else(|| record.name.clone());

    match stream_copy(&record, &*source, &*target, limiter.as_deref()).await {
        Ok(bytes) => {
            if debug_logging {
                debug!(id = %record.id, key = %key, bytes, "transfer finished");
            }
            Ok(Transferred { bytes })
        }
        Err(e) => Err(TransferFailure {
            id: record.id,
            key,
            error: e.to_string(),
        }),
    }
}

/// Chunked read → throttle → write loop over the backend streams.
async fn stream_copy(
    record: &FileRecord,
    source: &dyn StorageBackend,
    target: &dyn StorageBackend,
    limiter: Option<&RateLimiter>,
) -> Result<u64> {
    let mut reader = source.open_read(record).await?;
    let mut writer = target.open_write(record).await?;

    let mut buf = vec![0u8; COPY_CHUNK];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if let Some(limiter) = limiter {
            limiter.throttle(n as u64).await;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    writer.shutdown().await?;
    Ok(total)
}
