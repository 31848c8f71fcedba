use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MigrateError;

/// The migration stage an operator has declared for a collection.
///
/// The lifecycle is operator-sequenced: `None` → `Copy` → `Purge` → `Done`.
/// Each stage gates which catalog shapes and operations are valid; advancing
/// is always an explicit configuration change, never a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Pre-migration: only the source backend is configured.
    None,
    /// Both backends configured; pending records are being transferred.
    Copy,
    /// Source backend unconfigured; stale descriptors may be removed.
    Purge,
    /// Migration finished; only the target backend remains.
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::None => "none",
            Phase::Copy => "copy",
            Phase::Purge => "purge",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Phase::None),
            "copy" => Ok(Phase::Copy),
            "purge" => Ok(Phase::Purge),
            "done" => Ok(Phase::Done),
            other => Err(MigrateError::UnknownPhase(other.to_string())),
        }
    }
}
