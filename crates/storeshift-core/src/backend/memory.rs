//! In-memory storage backend (for tests and demos).

use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::{ByteReader, ByteWriter, StorageBackend};
use crate::catalog::FileRecord;
use crate::error::{MigrateError, Result};

/// In-memory byte store keyed by storage key.
///
/// Thread-safe via `RwLock`. Writes become visible atomically when the
/// write stream is shut down, mirroring backends that persist on close.
pub struct MemoryBackend {
    name: String,
    store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryBackend {
            name: name.into(),
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed content under a key directly, bypassing the stream interface.
    pub fn put(&self, key: impl Into<String>, data: Vec<u8>) {
        self.store
            .write()
            .expect("store lock poisoned")
            .insert(key.into(), data);
    }

    /// Stored bytes for a key, if any.
    pub fn contents(&self, key: &str) -> Option<Vec<u8>> {
        self.store
            .read()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.store.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_for(&self, record: &FileRecord) -> Result<String> {
        record
            .copies
            .get(&self.name)
            .map(|copy| copy.key.clone())
            .ok_or_else(|| MigrateError::MissingCopy {
                id: record.id,
                backend: self.name.clone(),
            })
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_read(&self, record: &FileRecord) -> Result<ByteReader> {
        let key = self.key_for(record)?;
        let data = self.contents(&key).ok_or_else(|| {
            MigrateError::Storage(format!("no content under key '{key}' on '{}'", self.name))
        })?;
        Ok(Box::new(io::Cursor::new(data)))
    }

    async fn open_write(&self, record: &FileRecord) -> Result<ByteWriter> {
        let key = self.key_for(record)?;
        Ok(Box::new(MemoryWriter {
            key,
            buf: Vec::new(),
            store: Arc::clone(&self.store),
        }))
    }
}

/// Buffering sink that publishes into the shared map on shutdown.
struct MemoryWriter {
    key: String,
    buf: Vec<u8>,
    store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buf.extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let data = std::mem::take(&mut self.buf);
        let key = self.key.clone();
        self.store
            .write()
            .expect("store lock poisoned")
            .insert(key, data);
        Poll::Ready(Ok(()))
    }
}
