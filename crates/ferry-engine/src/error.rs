//! Error taxonomy of the migration engine
//!
//! Endpoint status handling is fully resolved in the retry layer; the
//! engine only ever sees a task-level [`MigrationError`], and callers of
//! `load`/`delete` see at most one [`AggregateError`] summarizing every
//! failed record task.

use ferry_endpoint::EndpointError;
use std::fmt;

/// Logical endpoint operation, named for retry-exhaustion messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Enumerating record names
    List,
    /// Downloading one record into staging
    Download(String),
    /// Uploading one staged record
    Upload(String),
    /// Deleting one record
    Delete(String),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "record listing"),
            Self::Download(name) => write!(f, "download of \"{name}\""),
            Self::Upload(name) => write!(f, "upload of \"{name}\""),
            Self::Delete(name) => write!(f, "delete of \"{name}\""),
        }
    }
}

/// Failure of one migration operation or of a whole `load`/`delete` call.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The attempt budget was spent without a successful response.
    #[error("retry budget exhausted after {attempts} attempt(s) for {op}")]
    RetryExhausted {
        /// Operation that kept failing
        op: Operation,
        /// Attempts consumed before giving up
        attempts: u32,
        /// Failure of the final attempt
        #[source]
        last: EndpointError,
    },

    /// An upload conflicted and the reconciling delete itself failed.
    ///
    /// Surfaced without consuming further upload budget; a stuck
    /// reconciliation is not a transient fault.
    #[error("upload conflict on \"{name}\" could not be reconciled: {reconcile}")]
    UploadConflictUnresolved {
        /// Record whose upload conflicted
        name: String,
        /// The conflict response from the destination
        #[source]
        conflict: EndpointError,
        /// Failure of the reconciling delete
        reconcile: Box<MigrationError>,
    },

    /// Local admission refusal; the remote endpoint was never consulted.
    #[error("staging over capacity ({staged} staged > ceiling {ceiling}), refusing record \"{name}\"")]
    StagingOverCapacity {
        /// Record that was refused
        name: String,
        /// Observed staged-entry count
        staged: usize,
        /// Configured ceiling
        ceiling: usize,
    },

    /// Staging directory creation, inspection, or teardown failed.
    #[error("staging directory error: {0}")]
    Staging(#[from] std::io::Error),

    /// One or more record tasks of a `load`/`delete` call failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Failure of a single record's pipeline task.
#[derive(Debug, thiserror::Error)]
#[error("record \"{name}\": {cause}")]
pub struct RecordFailure {
    /// Record the task was migrating
    pub name: String,
    /// What went wrong
    #[source]
    pub cause: MigrationError,
}

/// Composite failure of a `load`/`delete` call.
///
/// The primary cause is the first failure in submission order; every
/// other failed task is carried as a suppressed cause.
#[derive(Debug, thiserror::Error)]
#[error("{} record task(s) failed; first: {}", .suppressed.len() + 1, .primary)]
pub struct AggregateError {
    primary: Box<RecordFailure>,
    suppressed: Vec<RecordFailure>,
}

impl AggregateError {
    pub(crate) fn new(primary: RecordFailure, suppressed: Vec<RecordFailure>) -> Self {
        Self {
            primary: Box::new(primary),
            suppressed,
        }
    }

    /// First failure in submission order.
    #[inline]
    #[must_use]
    pub fn primary(&self) -> &RecordFailure {
        &self.primary
    }

    /// Every failure other than the primary, in submission order.
    #[inline]
    #[must_use]
    pub fn suppressed(&self) -> &[RecordFailure] {
        &self.suppressed
    }

    /// Total number of failed record tasks.
    #[inline]
    #[must_use]
    pub fn failure_count(&self) -> usize {
        1 + self.suppressed.len()
    }

    /// Every failure, primary first.
    pub fn iter(&self) -> impl Iterator<Item = &RecordFailure> {
        std::iter::once(&*self.primary).chain(self.suppressed.iter())
    }
}
