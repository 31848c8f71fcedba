use serde::Deserialize;

use crate::phase::Phase;

/// Configuration for a [`StoreMigrator`](crate::StoreMigrator).
///
/// Everything except `phase` is fixed for the lifetime of a migration;
/// `phase` is advanced by the operator between `perform` invocations.
///
/// Deserializes from the camelCase option surface, e.g.:
/// ```json
/// {
///   "collectionName": "attachments",
///   "sourceBackendName": "gridfs",
///   "targetBackendName": "s3",
///   "rateLimitBytesPerSec": 1048576,
///   "maxConcurrentTransfers": 4,
///   "phase": "copy"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MigratorConfig {
    /// Name of the catalog collection being migrated.
    pub collection_name: String,
    /// Name of the backend records are moving off of.
    pub source_backend_name: String,
    /// Name of the backend records are moving onto.
    pub target_backend_name: String,
    /// Aggregate byte throughput cap across all transfers. Zero is unlimited.
    #[serde(default)]
    pub rate_limit_bytes_per_sec: u64,
    /// Maximum transfers in flight at once. Zero is unbounded.
    #[serde(default)]
    pub max_concurrent_transfers: usize,
    /// Declared migration stage; see [`Phase`].
    #[serde(default = "default_phase")]
    pub phase: Phase,
    /// Emit per-record skip/finish events at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_phase() -> Phase {
    Phase::None
}

impl MigratorConfig {
    /// Create a config with default rate (unlimited), concurrency (unbounded)
    /// and phase (`none`).
    pub fn new(
        collection_name: impl Into<String>,
        source_backend_name: impl Into<String>,
        target_backend_name: impl Into<String>,
    ) -> Self {
        MigratorConfig {
            collection_name: collection_name.into(),
            source_backend_name: source_backend_name.into(),
            target_backend_name: target_backend_name.into(),
            rate_limit_bytes_per_sec: 0,
            max_concurrent_transfers: 0,
            phase: Phase::None,
            debug_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_surface() {
        let config: MigratorConfig = serde_json::from_str(
            r#"{
                "collectionName": "attachments",
                "sourceBackendName": "gridfs",
                "targetBackendName": "s3",
                "rateLimitBytesPerSec": 1048576,
                "maxConcurrentTransfers": 4,
                "phase": "copy",
                "debugLogging": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.collection_name, "attachments");
        assert_eq!(config.rate_limit_bytes_per_sec, 1_048_576);
        assert_eq!(config.max_concurrent_transfers, 4);
        assert_eq!(config.phase, Phase::Copy);
        assert!(config.debug_logging);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: MigratorConfig = serde_json::from_str(
            r#"{
                "collectionName": "attachments",
                "sourceBackendName": "gridfs",
                "targetBackendName": "s3"
            }"#,
        )
        .unwrap();

        assert_eq!(config.rate_limit_bytes_per_sec, 0);
        assert_eq!(config.max_concurrent_transfers, 0);
        assert_eq!(config.phase, Phase::None);
        assert!(!config.debug_logging);
    }

    #[test]
    fn test_deserialize_bad_phase() {
        let result = serde_json::from_str::<MigratorConfig>(
            r#"{
                "collectionName": "a",
                "sourceBackendName": "b",
                "targetBackendName": "c",
                "phase": "rewind"
            }"#,
        );
        assert!(result.is_err());
    }
}
