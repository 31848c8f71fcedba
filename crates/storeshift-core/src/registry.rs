//! Lookup from collection name to migrator.
//!
//! Replaces a mutual catalog↔migrator reference: the migrator holds its
//! catalog, and anything that needs to go the other way (UI adapters
//! querying phase predicates, operator tooling) resolves the migrator
//! through a registry instead.

use std::collections::HashMap;

use crate::migrator::StoreMigrator;

/// Plain map of collection name → migrator. Callers that share a registry
/// across threads wrap it in their own lock.
#[derive(Default)]
pub struct MigratorRegistry {
    migrators: HashMap<String, StoreMigrator>,
}

impl MigratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migrator under its collection name, returning any
    /// previously registered migrator for that collection.
    pub fn register(&mut self, migrator: StoreMigrator) -> Option<StoreMigrator> {
        self.migrators
            .insert(migrator.collection_name().to_string(), migrator)
    }

    pub fn get(&self, collection: &str) -> Option<&StoreMigrator> {
        self.migrators.get(collection)
    }

    /// Mutable access, e.g. for the operator advancing a phase.
    pub fn get_mut(&mut self, collection: &str) -> Option<&mut StoreMigrator> {
        self.migrators.get_mut(collection)
    }

    pub fn remove(&mut self, collection: &str) -> Option<StoreMigrator> {
        self.migrators.remove(collection)
    }

    pub fn len(&self) -> usize {
        self.migrators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrators.is_empty()
    }
}
