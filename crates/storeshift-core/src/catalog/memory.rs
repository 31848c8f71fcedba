//! In-memory catalog implementation (for tests and embedding).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Catalog, FileId, FileRecord};
use crate::error::{MigrateError, Result};

/// In-memory catalog.
///
/// Thread-safe via `RwLock`. Not persistent — records are lost on drop.
/// The mutators model what the real catalog does on its own (record
/// creation, backend reconfiguration, reflecting finished writes).
pub struct MemoryCatalog {
    name: String,
    backends: RwLock<Vec<String>>,
    records: RwLock<HashMap<FileId, FileRecord>>,
}

impl MemoryCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryCatalog {
            name: name.into(),
            backends: RwLock::new(Vec::new()),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the set of configured backend names.
    pub fn set_configured_backends<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.backends.write().expect("backends lock poisoned") =
            names.into_iter().map(Into::into).collect();
    }

    /// Insert a record, replacing any record with the same id.
    pub fn insert(&self, record: FileRecord) -> FileId {
        let id = record.id;
        self.records
            .write()
            .expect("records lock poisoned")
            .insert(id, record);
        id
    }

    pub fn get(&self, id: FileId) -> Option<FileRecord> {
        self.records
            .read()
            .expect("records lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("records lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the recorded size of a record's copy on `backend`, as the real
    /// catalog would after a write stream completes.
    pub fn set_copy_size(&self, id: FileId, backend: &str, size: u64) -> Result<()> {
        let mut records = self.records.write().expect("records lock poisoned");
        let record = records
            .get_mut(&id)
            .ok_or_else(|| MigrateError::Catalog(format!("no record {id}")))?;
        let copy = record
            .copies
            .get_mut(backend)
            .ok_or_else(|| MigrateError::MissingCopy {
                id,
                backend: backend.to_string(),
            })?;
        copy.size = size;
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn configured_backends(&self) -> Result<Vec<String>> {
        Ok(self.backends.read().expect("backends lock poisoned").clone())
    }

    async fn find_all(&self) -> Result<Vec<FileRecord>> {
        Ok(self
            .records
            .read()
            .expect("records lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn count_with_copy(&self, backend: &str) -> Result<u64> {
        Ok(self
            .records
            .read()
            .expect("records lock poisoned")
            .values()
            .filter(|r| r.has_copy(backend))
            .count() as u64)
    }

    async fn unset_copy(&self, backend: &str) -> Result<u64> {
        let mut records = self.records.write().expect("records lock poisoned");
        let mut affected = 0;
        for record in records.values_mut() {
            if record.copies.remove(backend).is_some() {
                affected += 1;
            }
        }
        Ok(affected)
    }
}
