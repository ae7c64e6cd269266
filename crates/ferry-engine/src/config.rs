//! Run configuration
//!
//! Every knob of a migration run lives here; base locations are explicit
//! constructor inputs rather than process-wide constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Attempts granted to each endpoint operation before it is declared
/// exhausted.
pub const DEFAULT_RETRY_BUDGET: u32 = 100;

/// Parallel record pipelines per `load`/`delete` call.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Advisory ceiling on concurrently staged records.
pub const DEFAULT_STAGING_CEILING: usize = 100;

/// Configuration of one migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Base URL of the source record collection
    pub source_base: String,
    /// Base URL of the destination record collection
    pub dest_base: String,
    /// Directory the staging directory is created under
    pub staging_base: PathBuf,
    /// Worker concurrency of the engine
    pub concurrency: usize,
    /// Advisory staged-record ceiling
    pub staging_ceiling: usize,
    /// Attempt budget per endpoint operation
    pub retry_budget: u32,
}

impl MigrationConfig {
    /// Configuration with default knobs for the given endpoint pair.
    #[must_use]
    pub fn new(source_base: impl Into<String>, dest_base: impl Into<String>) -> Self {
        Self {
            source_base: source_base.into(),
            dest_base: dest_base.into(),
            staging_base: PathBuf::from("."),
            concurrency: DEFAULT_CONCURRENCY,
            staging_ceiling: DEFAULT_STAGING_CEILING,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    /// With staging base directory
    #[inline]
    #[must_use]
    pub fn with_staging_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.staging_base = base.into();
        self
    }

    /// With worker concurrency
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// With staged-record ceiling
    #[inline]
    #[must_use]
    pub fn with_staging_ceiling(mut self, ceiling: usize) -> Self {
        self.staging_ceiling = ceiling;
        self
    }

    /// With per-operation attempt budget
    #[inline]
    #[must_use]
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }
}
