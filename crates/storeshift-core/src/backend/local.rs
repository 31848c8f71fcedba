//! Filesystem storage backend rooted at a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ByteReader, ByteWriter, StorageBackend};
use crate::catalog::FileRecord;
use crate::error::{MigrateError, Result};

/// Directory-rooted storage backend.
///
/// Layout: one file per object at `<root>/<storage key>`. Keys may contain
/// `/` separators; parent directories are created on write.
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        LocalBackend {
            name: name.into(),
            root: root.into(),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
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

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_read(&self, record: &FileRecord) -> Result<ByteReader> {
        let key = self.key_for(record)?;
        let file = fs::File::open(self.object_path(&key)).await.map_err(|e| {
            MigrateError::Storage(format!("open '{key}' on '{}': {e}", self.name))
        })?;
        Ok(Box::new(file))
    }

    async fn open_write(&self, record: &FileRecord) -> Result<ByteWriter> {
        let key = self.key_for(record)?;
        let path = self.object_path(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                MigrateError::Storage(format!("mkdir for '{key}' on '{}': {e}", self.name))
            })?;
        }
        let file = fs::File::create(&path).await.map_err(|e| {
            MigrateError::Storage(format!("create '{key}' on '{}': {e}", self.name))
        })?;
        Ok(Box::new(file))
    }
}
