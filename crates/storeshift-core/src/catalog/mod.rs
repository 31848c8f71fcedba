//! The file catalog collaborator: record model and access trait.
//!
//! The catalog owns file records and their per-backend copy descriptors.
//! The migration engine only reads records and, during purge, issues one
//! bulk field removal; everything else (record creation, reflecting a
//! finished write back into a descriptor's size) is the catalog's job.

pub mod memory;

pub use memory::MemoryCatalog;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Catalog-assigned identifier for a file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Uuid);

impl FileId {
    pub fn new() -> Self {
        FileId(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-backend copy descriptor: where a record's bytes live on one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyInfo {
    /// Storage key within the backend.
    pub key: String,
    /// Recorded content size. Zero means the placeholder exists but the
    /// bytes have not landed yet.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl CopyInfo {
    /// A zero-size placeholder descriptor: the record is due for transfer.
    pub fn placeholder(key: impl Into<String>) -> Self {
        CopyInfo {
            key: key.into(),
            size: 0,
            created_at: Utc::now(),
            content_type: None,
        }
    }

    /// A descriptor for content already persisted with the given size.
    pub fn stored(key: impl Into<String>, size: u64) -> Self {
        CopyInfo {
            key: key.into(),
            size,
            created_at: Utc::now(),
            content_type: None,
        }
    }
}

/// A file record: identity plus a map from backend name to copy descriptor.
///
/// A record may carry zero, one or more backend entries at once; during a
/// migration it typically carries two (source copy plus target placeholder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    /// Original file name, kept for logging and key derivation.
    pub name: String,
    pub copies: HashMap<String, CopyInfo>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>) -> Self {
        FileRecord {
            id: FileId::new(),
            name: name.into(),
            copies: HashMap::new(),
        }
    }

    /// Add or replace the copy descriptor for `backend`.
    pub fn with_copy(mut self, backend: impl Into<String>, copy: CopyInfo) -> Self {
        self.copies.insert(backend.into(), copy);
        self
    }

    /// Whether this record has any descriptor for `backend` (existence,
    /// not size, is what purge counting tests).
    pub fn has_copy(&self, backend: &str) -> bool {
        self.copies.contains_key(backend)
    }

    /// Whether this record is due for transfer onto `backend`: the
    /// descriptor exists but no content has landed (`size == 0`). A missing
    /// descriptor or a nonzero size both mean "not a candidate".
    pub fn is_pending(&self, backend: &str) -> bool {
        matches!(self.copies.get(backend), Some(copy) if copy.size == 0)
    }
}

/// Trait for the catalog collaborator bound to a migrator.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// The collection name this catalog serves.
    fn name(&self) -> &str;

    /// Names of the backends currently configured on the collection.
    async fn configured_backends(&self) -> Result<Vec<String>>;

    /// Unfiltered scan of every file record.
    async fn find_all(&self) -> Result<Vec<FileRecord>>;

    /// Count records holding a copy descriptor for `backend`.
    async fn count_with_copy(&self, backend: &str) -> Result<u64>;

    /// Bulk-unset: remove the `backend` descriptor from every record that
    /// has one, in a single multi-record update. Returns the number of
    /// records affected. All-or-nothing at this call's level.
    async fn unset_copy(&self, backend: &str) -> Result<u64>;
}
