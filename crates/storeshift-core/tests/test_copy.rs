//! Copy engine tests: candidate selection, concurrency ceiling, aggregate
//! rate limiting and failure collection.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Instant;

use storeshift_core::{
    copy_all, ByteReader, ByteWriter, CopyInfo, FileRecord, MemoryBackend, MemoryCatalog,
    Result, StorageBackend,
};

/// Seed one record: content on `source`, descriptors per the given target
/// size (`None` = no target descriptor at all).
fn seed_record(
    catalog: &MemoryCatalog,
    source: &MemoryBackend,
    name: &str,
    content: &[u8],
    target_size: Option<u64>,
) {
    let key = format!("k/{name}");
    source.put(key.clone(), content.to_vec());
    let mut record = FileRecord::new(name)
        .with_copy(source.name(), CopyInfo::stored(key.clone(), content.len() as u64));
    if let Some(size) = target_size {
        let copy = if size == 0 {
            CopyInfo::placeholder(key)
        } else {
            CopyInfo::stored(key, size)
        };
        record = record.with_copy("new", copy);
    }
    catalog.insert(record);
}

#[tokio::test]
async fn test_candidate_selection_for_all_descriptor_states() {
    let catalog = MemoryCatalog::new("files");
    let source = Arc::new(MemoryBackend::new("old"));
    let target = Arc::new(MemoryBackend::new("new"));

    // Pending: placeholder with zero size.
    seed_record(&catalog, &source, "pending.bin", b"move me", Some(0));
    // Not a candidate: no target descriptor.
    seed_record(&catalog, &source, "untouched.bin", b"leave me", None);
    // Not a candidate: target copy already has content.
    seed_record(&catalog, &source, "done.bin", b"already there", Some(13));

    let report = copy_all(
        &catalog,
        source.clone() as Arc<dyn StorageBackend>,
        target.clone() as Arc<dyn StorageBackend>,
        0,
        0,
        false,
    )
    .await
    .unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.pending, 1);
    assert_eq!(report.transferred, 1);
    assert_eq!(report.skipped, 2);
    assert!(report.failed.is_empty());
    assert!(report.is_complete());

    assert_eq!(target.contents("k/pending.bin").unwrap(), b"move me");
    assert!(target.contents("k/untouched.bin").is_none());
    assert!(target.contents("k/done.bin").is_none());
}

#[tokio::test]
async fn test_scenario_two_pending_one_migrated() {
    let catalog = MemoryCatalog::new("files");
    let source = Arc::new(MemoryBackend::new("old"));
    let target = Arc::new(MemoryBackend::new("new"));

    seed_record(&catalog, &source, "a.bin", b"aaaa", Some(0));
    seed_record(&catalog, &source, "b.bin", b"bbbbbbbb", Some(0));
    seed_record(&catalog, &source, "c.bin", b"cccc", Some(4));

    let report = copy_all(
        &catalog,
        source.clone() as Arc<dyn StorageBackend>,
        target.clone() as Arc<dyn StorageBackend>,
        0,
        0,
        false,
    )
    .await
    .unwrap();

    assert_eq!(report.transferred, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.bytes_copied, 12);
    assert_eq!(target.len(), 2);
}

#[tokio::test]
async fn test_failed_transfer_is_collected_without_aborting_siblings() {
    let catalog = MemoryCatalog::new("files");
    let source = Arc::new(MemoryBackend::new("old"));
    let target = Arc::new(MemoryBackend::new("new"));

    seed_record(&catalog, &source, "good1.bin", b"one", Some(0));
    seed_record(&catalog, &source, "good2.bin", b"two", Some(0));
    // Pending record whose source content is missing: the read stream fails.
    catalog.insert(
        FileRecord::new("broken.bin")
            .with_copy("old", CopyInfo::stored("k/broken.bin", 3))
            .with_copy("new", CopyInfo::placeholder("k/broken.bin")),
    );

    let report = copy_all(
        &catalog,
        source.clone() as Arc<dyn StorageBackend>,
        target.clone() as Arc<dyn StorageBackend>,
        0,
        1,
        false,
    )
    .await
    .unwrap();

    assert_eq!(report.pending, 3);
    assert_eq!(report.transferred, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, "k/broken.bin");
    assert!(report.is_complete());
}

/// Wraps a backend and gauges how many transfers are active at once.
/// A transfer is counted from `open_read` until its reader hits EOF.
struct TrackingBackend {
    inner: MemoryBackend,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    hold: Duration,
}

impl TrackingBackend {
    fn new(inner: MemoryBackend, hold: Duration) -> Self {
        TrackingBackend {
            inner,
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            hold,
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for TrackingBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn open_read(&self, record: &FileRecord) -> Result<ByteReader> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        // Stretch the transfer so overlap is observable.
        tokio::time::sleep(self.hold).await;
        let inner = self.inner.open_read(record).await?;
        Ok(Box::new(TrackingReader {
            inner,
            active: Arc::clone(&self.active),
            finished: false,
        }))
    }

    async fn open_write(&self, record: &FileRecord) -> Result<ByteWriter> {
        self.inner.open_write(record).await
    }
}

struct TrackingReader {
    inner: ByteReader,
    active: Arc<AtomicUsize>,
    finished: bool,
}

impl AsyncRead for TrackingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        match Pin::new(&mut self.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                if buf.filled().len() == before && !self.finished {
                    self.finished = true;
                    self.active.fetch_sub(1, Ordering::SeqCst);
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_never_exceeds_ceiling() {
    let catalog = MemoryCatalog::new("files");
    let inner = MemoryBackend::new("old");
    let target = Arc::new(MemoryBackend::new("new"));

    for i in 0..8 {
        seed_record(&catalog, &inner, &format!("f{i}.bin"), b"payload", Some(0));
    }
    let source = Arc::new(TrackingBackend::new(inner, Duration::from_millis(50)));

    let report = copy_all(
        &catalog,
        source.clone() as Arc<dyn StorageBackend>,
        target.clone() as Arc<dyn StorageBackend>,
        0,
        2,
        false,
    )
    .await
    .unwrap();

    assert_eq!(report.transferred, 8);
    assert!(source.peak() <= 2, "peak active was {}", source.peak());
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_transfers_do_overlap() {
    let catalog = MemoryCatalog::new("files");
    let inner = MemoryBackend::new("old");
    let target = Arc::new(MemoryBackend::new("new"));

    for i in 0..8 {
        seed_record(&catalog, &inner, &format!("f{i}.bin"), b"payload", Some(0));
    }
    let source = Arc::new(TrackingBackend::new(inner, Duration::from_millis(50)));

    copy_all(
        &catalog,
        source.clone() as Arc<dyn StorageBackend>,
        target.clone() as Arc<dyn StorageBackend>,
        0,
        0,
        false,
    )
    .await
    .unwrap();

    assert!(source.peak() > 2, "peak active was {}", source.peak());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_caps_aggregate_throughput() {
    let catalog = MemoryCatalog::new("files");
    let source = Arc::new(MemoryBackend::new("old"));
    let target = Arc::new(MemoryBackend::new("new"));

    let payload = vec![7u8; 1000];
    for i in 0..4 {
        seed_record(&catalog, &source, &format!("f{i}.bin"), &payload, Some(0));
    }

    let start = Instant::now();
    let report = copy_all(
        &catalog,
        source.clone() as Arc<dyn StorageBackend>,
        target.clone() as Arc<dyn StorageBackend>,
        1000,
        0,
        false,
    )
    .await
    .unwrap();

    assert_eq!(report.transferred, 4);
    assert_eq!(report.bytes_copied, 4000);
    // 4000 bytes at 1000 B/s with a one-second burst: at least 3 seconds,
    // regardless of how many transfers ran concurrently.
    assert!(
        start.elapsed() >= Duration::from_secs(3),
        "elapsed {:?}",
        start.elapsed()
    );
}
