//! Storage backend collaborator: named byte stores.

pub mod local;
pub mod memory;

pub use local::LocalBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::catalog::FileRecord;
use crate::error::Result;

/// A boxed byte source, as handed out by [`StorageBackend::open_read`].
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// A boxed byte sink, as handed out by [`StorageBackend::open_write`].
/// Content is considered persisted once `shutdown` resolves.
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Trait for a named storage backend.
///
/// Streams are keyed by the record's copy descriptor for this backend's
/// name; opening a stream for a record with no such descriptor fails with
/// [`MigrateError::MissingCopy`](crate::MigrateError::MissingCopy).
///
/// Reflecting a completed write back into the record's descriptor (size
/// becoming nonzero) is the catalog's responsibility, not the backend's
/// or the engine's.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// The backend's name, unique within a catalog.
    fn name(&self) -> &str;

    /// Open a read stream over this record's existing copy.
    async fn open_read(&self, record: &FileRecord) -> Result<ByteReader>;

    /// Open a write stream that will create this record's copy.
    async fn open_write(&self, record: &FileRecord) -> Result<ByteWriter>;
}
