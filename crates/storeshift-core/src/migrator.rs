//! Migrator façade: configuration, catalog binding and phase dispatch.

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::StorageBackend;
use crate::catalog::Catalog;
use crate::config::MigratorConfig;
use crate::copy::{copy_all, CopyReport};
use crate::error::{MigrateError, Result};
use crate::phase::Phase;
use crate::purge::{purge, PurgeOutcome};
use crate::validate::validate_phase;

/// What one `perform` invocation did.
#[derive(Debug)]
pub enum PerformOutcome {
    /// The phase required only validation (`none` and `done`).
    Idle,
    /// The copy engine ran.
    Copied(CopyReport),
    /// The purge engine ran.
    Purged(PurgeOutcome),
}

/// Drives a live store-to-store migration for one catalog collection.
///
/// The migrator binds to exactly one catalog and holds the operator's
/// declared configuration. Advancing the migration is always explicit:
/// the operator moves [`Phase`] forward via [`set_phase`](Self::set_phase)
/// and re-invokes [`perform`](Self::perform), which validates the catalog's
/// backend shape for the declared phase before any side effect.
///
/// The binding is one-directional; catalogs never reference their migrator.
/// Use [`MigratorRegistry`](crate::MigratorRegistry) when a reverse lookup
/// is needed.
pub struct StoreMigrator {
    config: MigratorConfig,
    catalog: Option<Arc<dyn Catalog>>,
}

impl StoreMigrator {
    /// Create an unbound migrator. [`perform`](Self::perform) fails until a
    /// catalog is bound.
    pub fn new(config: MigratorConfig) -> Self {
        StoreMigrator {
            config,
            catalog: None,
        }
    }

    /// Create a migrator already bound to `catalog`.
    pub fn bound(config: MigratorConfig, catalog: Arc<dyn Catalog>) -> Result<Self> {
        let mut migrator = StoreMigrator::new(config);
        migrator.bind(catalog)?;
        Ok(migrator)
    }

    /// Bind the catalog this migrator operates on. The catalog's collection
    /// name must match the configured one.
    pub fn bind(&mut self, catalog: Arc<dyn Catalog>) -> Result<()> {
        if catalog.name() != self.config.collection_name {
            return Err(MigrateError::CollectionMismatch {
                expected: self.config.collection_name.clone(),
                actual: catalog.name().to_string(),
            });
        }
        self.catalog = Some(catalog);
        Ok(())
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    pub fn collection_name(&self) -> &str {
        &self.config.collection_name
    }

    pub fn phase(&self) -> Phase {
        self.config.phase
    }

    /// Advance (or rewind) the declared phase. Takes effect on the next
    /// `perform` invocation.
    pub fn set_phase(&mut self, phase: Phase) {
        info!(
            collection = %self.config.collection_name,
            from = %self.config.phase,
            to = %phase,
            "phase changed"
        );
        self.config.phase = phase;
    }

    /// True before the migration starts (`phase == none`).
    pub fn is_pre_migration(&self) -> bool {
        self.config.phase == Phase::None
    }

    /// True while content is being copied (`phase == copy`).
    pub fn is_copying(&self) -> bool {
        self.config.phase == Phase::Copy
    }

    /// True once copying is over (`phase ∈ {purge, done}`).
    pub fn is_post_migration(&self) -> bool {
        matches!(self.config.phase, Phase::Purge | Phase::Done)
    }

    /// Perform the step the declared phase calls for.
    ///
    /// Backend handles are required for `copy` and optional-to-forbidden
    /// elsewhere (see [`validate_phase`]). Structural and consistency
    /// errors abort before anything is mutated; per-transfer failures
    /// during copy are collected into the returned report instead.
    pub async fn perform(
        &self,
        source: Option<Arc<dyn StorageBackend>>,
        target: Option<Arc<dyn StorageBackend>>,
    ) -> Result<PerformOutcome> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| MigrateError::CatalogUnbound {
                collection: self.config.collection_name.clone(),
            })?;

        if catalog.name() != self.config.collection_name {
            return Err(MigrateError::CollectionMismatch {
                expected: self.config.collection_name.clone(),
                actual: catalog.name().to_string(),
            });
        }

        let configured = catalog.configured_backends().await?;
        if self.config.debug_logging {
            debug!(
                collection = %self.config.collection_name,
                phase = %self.config.phase,
                configured = ?configured,
                source = source.as_deref().map(|b| b.name()),
                target = target.as_deref().map(|b| b.name()),
                "perform"
            );
        }

        validate_phase(
            &self.config,
            &configured,
            source.as_deref().map(|b| b.name()),
            target.as_deref().map(|b| b.name()),
        )?;

        match self.config.phase {
            Phase::None => {
                info!(
                    collection = %self.config.collection_name,
                    "pre-migration: source backend only, nothing to perform"
                );
                Ok(PerformOutcome::Idle)
            }
            Phase::Copy => {
                // The validator guarantees both handles are present.
                let (Some(source), Some(target)) = (source, target) else {
                    return Err(MigrateError::MissingBackendArgs);
                };
                let report = copy_all(
                    catalog.as_ref(),
                    source,
                    target,
                    self.config.rate_limit_bytes_per_sec,
                    self.config.max_concurrent_transfers,
                    self.config.debug_logging,
                )
                .await?;
                Ok(PerformOutcome::Copied(report))
            }
            Phase::Purge => {
                let outcome = purge(
                    catalog.as_ref(),
                    &self.config.source_backend_name,
                    &self.config.target_backend_name,
                )
                .await?;
                Ok(PerformOutcome::Purged(outcome))
            }
            Phase::Done => {
                info!(
                    collection = %self.config.collection_name,
                    "migration done: target backend only"
                );
                Ok(PerformOutcome::Idle)
            }
        }
    }
}
