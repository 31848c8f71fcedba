//! Phase validator: structural preconditions for each migration stage.
//!
//! Validation is pure and runs to completion before any side effect. The
//! rules per phase:
//!
//! | phase | configured backends      | handle arguments              |
//! |-------|--------------------------|-------------------------------|
//! | none  | exactly the source       | —                             |
//! | copy  | exactly source + target  | both required                 |
//! | purge | exactly the target       | source must be absent         |
//! | done  | exactly the target       | —                             |
//!
//! Any supplied handle must additionally carry the configured name for its
//! role. Any mismatch is a fatal configuration error.

use crate::config::MigratorConfig;
use crate::error::{MigrateError, Result};
use crate::phase::Phase;

/// Check the declared phase against the catalog's configured backend names
/// and the presence/identity of the supplied backend handles.
///
/// `source` and `target` are the names of the handles passed to `perform`,
/// if any.
pub fn validate_phase(
    config: &MigratorConfig,
    configured: &[String],
    source: Option<&str>,
    target: Option<&str>,
) -> Result<()> {
    // A supplied handle must be the backend it claims to be, whatever the
    // phase.
    if let Some(name) = source {
        if name != config.source_backend_name {
            return Err(MigrateError::BackendArgMismatch {
                role: "source",
                expected: config.source_backend_name.clone(),
                actual: name.to_string(),
            });
        }
    }
    if let Some(name) = target {
        if name != config.target_backend_name {
            return Err(MigrateError::BackendArgMismatch {
                role: "target",
                expected: config.target_backend_name.clone(),
                actual: name.to_string(),
            });
        }
    }

    match config.phase {
        Phase::None => {
            require_single(config, configured, &config.source_backend_name)?;
        }
        Phase::Copy => {
            if configured.len() != 2 {
                return Err(MigrateError::BackendCount {
                    phase: config.phase,
                    expected: 2,
                    actual: configured.len(),
                });
            }
            for required in [&config.source_backend_name, &config.target_backend_name] {
                if !configured.contains(required) {
                    return Err(MigrateError::BackendName {
                        phase: config.phase,
                        expected: required.clone(),
                    });
                }
            }
            if source.is_none() || target.is_none() {
                return Err(MigrateError::MissingBackendArgs);
            }
        }
        Phase::Purge => {
            require_single(config, configured, &config.target_backend_name)?;
            if source.is_some() {
                return Err(MigrateError::UnexpectedSourceArg {
                    phase: config.phase,
                });
            }
        }
        Phase::Done => {
            require_single(config, configured, &config.target_backend_name)?;
        }
    }

    Ok(())
}

/// Require exactly one configured backend, named `expected`.
fn require_single(config: &MigratorConfig, configured: &[String], expected: &str) -> Result<()> {
    if configured.len() != 1 {
        return Err(MigrateError::BackendCount {
            phase: config.phase,
            expected: 1,
            actual: configured.len(),
        });
    }
    if configured[0] != expected {
        return Err(MigrateError::BackendName {
            phase: config.phase,
            expected: expected.to_string(),
        });
    }
    Ok(())
}
