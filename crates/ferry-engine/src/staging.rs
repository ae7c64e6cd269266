//! Staging directory lifecycle
//!
//! A process-local scratch directory, partitioned by record name: no two
//! in-flight tasks of one run ever share a local file, so staged files
//! need no locking. Only the entry count is read, deliberately without
//! synchronization — the admission ceiling bounds typical growth, not an
//! exact limit.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding at most one file per in-flight record.
///
/// Dropping the value removes the directory and everything in it; call
/// [`StagingDir::close`] instead when teardown failures must be
/// reported.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create a fresh staging directory under `base`, creating `base`
    /// itself if needed.
    pub fn create(base: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(base)?;
        let dir = tempfile::Builder::new().prefix("staging").tempdir_in(base)?;
        tracing::debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    /// Path of the staging directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Local path a record stages under; its own name, nothing shared.
    ///
    /// The name is joined as-is. Record names come from the stores'
    /// flat namespaces and are trusted not to carry path separators; a
    /// name like `../x` would resolve outside the staging directory.
    #[must_use]
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Current number of staged entries.
    ///
    /// A plain snapshot read; concurrent tasks may observe stale counts
    /// around the admission ceiling.
    pub fn entry_count(&self) -> io::Result<usize> {
        Ok(std::fs::read_dir(self.dir.path())?.count())
    }

    /// Best-effort removal of one staged file; never errors.
    pub fn remove_if_present(path: &Path) {
        let _ = std::fs::remove_file(path);
    }

    /// Remove every staged file and the directory itself.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_close() {
        let base = tempfile::tempdir().unwrap();
        let staging = StagingDir::create(base.path()).unwrap();
        let path = staging.path().to_owned();
        assert!(path.is_dir());
        staging.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn record_path_is_name_partitioned() {
        let base = tempfile::tempdir().unwrap();
        let staging = StagingDir::create(base.path()).unwrap();
        assert_eq!(
            staging.record_path("a.txt"),
            staging.path().join("a.txt")
        );
        assert_ne!(staging.record_path("a.txt"), staging.record_path("b.txt"));
    }

    #[test]
    fn entry_count_tracks_files() {
        let base = tempfile::tempdir().unwrap();
        let staging = StagingDir::create(base.path()).unwrap();
        assert_eq!(staging.entry_count().unwrap(), 0);

        std::fs::write(staging.record_path("a.txt"), b"a").unwrap();
        std::fs::write(staging.record_path("b.txt"), b"b").unwrap();
        assert_eq!(staging.entry_count().unwrap(), 2);

        StagingDir::remove_if_present(&staging.record_path("a.txt"));
        assert_eq!(staging.entry_count().unwrap(), 1);
    }

    #[test]
    fn remove_if_present_swallows_missing_files() {
        let base = tempfile::tempdir().unwrap();
        let staging = StagingDir::create(base.path()).unwrap();
        // absent file: nothing to remove, nothing raised
        StagingDir::remove_if_present(&staging.record_path("ghost.txt"));
    }

    #[test]
    fn drop_removes_directory() {
        let base = tempfile::tempdir().unwrap();
        let path = {
            let staging = StagingDir::create(base.path()).unwrap();
            std::fs::write(staging.record_path("a.txt"), b"a").unwrap();
            staging.path().to_owned()
        };
        assert!(!path.exists());
    }
}
