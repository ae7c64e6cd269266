//! ferry migration engine
//!
//! The core of the migration pipeline:
//! - [`ResilientEndpoint`]: budgeted retries around every endpoint call,
//!   with conflict reconciliation on upload and idempotent delete
//! - [`MigrationEngine`]: bounded-concurrency record pipelines
//!   (download, upload, source cleanup) with aggregated failure reporting
//! - [`StagingDir`]: name-partitioned local scratch space with
//!   teardown on every exit path
//!
//! A record counts as migrated only once its upload to the destination
//! has been acknowledged and it has been deleted from the source; the
//! driver sequences `load` before `delete` to keep that ordering.

pub mod config;
pub mod engine;
pub mod error;
pub mod retry;
pub mod staging;

pub use config::{
    MigrationConfig, DEFAULT_CONCURRENCY, DEFAULT_RETRY_BUDGET, DEFAULT_STAGING_CEILING,
};
pub use engine::MigrationEngine;
pub use error::{AggregateError, MigrationError, Operation, RecordFailure};
pub use retry::ResilientEndpoint;
pub use staging::StagingDir;
