use thiserror::Error;

use crate::catalog::FileId;
use crate::phase::Phase;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("no catalog bound to migrator for collection '{collection}'")]
    CatalogUnbound { collection: String },

    #[error("catalog name mismatch: migrator is for '{expected}', catalog is '{actual}'")]
    CollectionMismatch { expected: String, actual: String },

    #[error("phase {phase}: catalog has {actual} configured backend(s), expected {expected}")]
    BackendCount {
        phase: Phase,
        expected: usize,
        actual: usize,
    },

    #[error("phase {phase}: configured backends do not include '{expected}'")]
    BackendName { phase: Phase, expected: String },

    #[error("backend handle '{actual}' does not match configured {role} backend '{expected}'")]
    BackendArgMismatch {
        role: &'static str,
        expected: String,
        actual: String,
    },

    #[error("phase copy requires both source and target backend handles")]
    MissingBackendArgs,

    #[error("phase {phase} does not accept a source backend handle")]
    UnexpectedSourceArg { phase: Phase },

    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    #[error("purge inconsistency: {source_count} record(s) on source, only {target_count} on target")]
    InconsistentCounts {
        source_count: u64,
        target_count: u64,
    },

    #[error("record {id} has no copy on backend '{backend}'")]
    MissingCopy { id: FileId, backend: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("catalog error: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, MigrateError>;

impl From<std::io::Error> for MigrateError {
    fn from(e: std::io::Error) -> Self {
        MigrateError::Storage(e.to_string())
    }
}
