//! Concurrent migration engine
//!
//! One pipeline task per record (download into staging, upload, local
//! cleanup), at most `concurrency` of them in flight, and a join barrier
//! before anything is reported. Task failures never abort the batch;
//! they are collected and reported as one aggregate outcome.

use crate::error::{AggregateError, MigrationError, RecordFailure};
use crate::retry::ResilientEndpoint;
use crate::staging::StagingDir;
use futures::stream::{self, StreamExt};
use std::path::Path;

/// Drives record-at-a-time pipelines with bounded parallelism.
///
/// Owns the staging directory for the lifetime of one migration run;
/// [`MigrationEngine::shutdown`] (or drop, as backstop) tears it down on
/// every exit path.
#[derive(Debug)]
pub struct MigrationEngine {
    concurrency: usize,
    staging: StagingDir,
    source: ResilientEndpoint,
    destination: ResilientEndpoint,
}

impl MigrationEngine {
    /// Create an engine over an already-wrapped endpoint pair.
    #[must_use]
    pub fn new(
        concurrency: usize,
        staging: StagingDir,
        source: ResilientEndpoint,
        destination: ResilientEndpoint,
    ) -> Self {
        Self {
            concurrency: concurrency.max(1),
            staging,
            source,
            destination,
        }
    }

    /// Wrapped source endpoint.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &ResilientEndpoint {
        &self.source
    }

    /// Wrapped destination endpoint.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &ResilientEndpoint {
        &self.destination
    }

    /// Path of the staging directory.
    #[inline]
    #[must_use]
    pub fn staging_path(&self) -> &Path {
        self.staging.path()
    }

    /// Transfer every named record from source to destination.
    ///
    /// Each record runs its own pipeline: an advisory staging admission
    /// check, download into the record's staged path, upload, then
    /// best-effort cleanup of the staged file once the upload attempt
    /// concludes, whatever its outcome. All tasks are awaited; if any
    /// failed, the call reports one [`AggregateError`] whose primary
    /// cause is the first failure in submission order.
    pub async fn load(
        &self,
        names: &[String],
        staging_ceiling: usize,
    ) -> Result<(), MigrationError> {
        tracing::info!(
            records = names.len(),
            concurrency = self.concurrency,
            staging_ceiling,
            "starting load"
        );
        let results = stream::iter(names.iter().cloned().enumerate())
            .map(|(idx, name)| async move {
                let outcome = self.transfer(&name, staging_ceiling).await;
                (idx, name, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        Self::aggregate(results)
    }

    /// Delete every named record from `endpoint`.
    ///
    /// Same submit-all, await-all, aggregate-failures pattern as
    /// [`MigrationEngine::load`].
    pub async fn delete(
        &self,
        endpoint: &ResilientEndpoint,
        names: &[String],
    ) -> Result<(), MigrationError> {
        tracing::info!(records = names.len(), "starting delete");
        let results = stream::iter(names.iter().cloned().enumerate())
            .map(|(idx, name)| async move {
                let outcome = endpoint.remove(&name).await;
                (idx, name, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        Self::aggregate(results)
    }

    /// Tear down the staging directory, reporting teardown failure.
    pub fn shutdown(self) -> Result<(), MigrationError> {
        self.staging.close().map_err(MigrationError::from)
    }

    /// One record's pipeline: admit, download, upload, clean up.
    async fn transfer(&self, name: &str, ceiling: usize) -> Result<(), MigrationError> {
        // advisory admission check; the count is read unsynchronized and
        // concurrent tasks may overshoot the ceiling by up to C-1
        let staged = self.staging.entry_count()?;
        if staged > ceiling {
            tracing::warn!(name, staged, ceiling, "staging over capacity, abandoning record");
            return Err(MigrationError::StagingOverCapacity {
                name: name.to_owned(),
                staged,
                ceiling,
            });
        }

        let path = self.staging.record_path(name);
        self.source.fetch(name, &path).await?;
        tracing::debug!(name, "record staged");

        let pushed = self.destination.push(name, &path).await;
        StagingDir::remove_if_present(&path);
        if pushed.is_ok() {
            tracing::debug!(name, "record uploaded");
        }
        pushed
    }

    /// Collapse per-task outcomes into one result, failures ordered by
    /// submission index.
    fn aggregate(
        mut results: Vec<(usize, String, Result<(), MigrationError>)>,
    ) -> Result<(), MigrationError> {
        results.sort_by_key(|(idx, _, _)| *idx);
        let mut failures = results
            .into_iter()
            .filter_map(|(_, name, outcome)| outcome.err().map(|cause| RecordFailure { name, cause }));
        match failures.next() {
            None => Ok(()),
            Some(primary) => {
                let suppressed: Vec<_> = failures.collect();
                tracing::error!(
                    failed = suppressed.len() + 1,
                    primary = %primary,
                    "record tasks failed"
                );
                Err(AggregateError::new(primary, suppressed).into())
            }
        }
    }
}
