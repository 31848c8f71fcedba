pub mod backend;
pub mod catalog;
pub mod config;
pub mod copy;
pub mod error;
pub mod migrator;
pub mod phase;
pub mod pool;
pub mod purge;
pub mod registry;
pub mod throttle;
pub mod validate;

// Re-export primary types for convenience
pub use backend::{ByteReader, ByteWriter, LocalBackend, MemoryBackend, StorageBackend};
pub use catalog::{Catalog, CopyInfo, FileId, FileRecord, MemoryCatalog};
pub use config::MigratorConfig;
pub use copy::{copy_all, CopyReport, TransferFailure};
pub use error::{MigrateError, Result};
pub use migrator::{PerformOutcome, StoreMigrator};
pub use phase::Phase;
pub use pool::TaskPool;
pub use purge::{purge, PurgeOutcome};
pub use registry::MigratorRegistry;
pub use throttle::RateLimiter;
pub use validate::validate_phase;
