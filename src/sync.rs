//! Push the working tree to a remote with rsync.
//!
//! The file list comes from a [`FileLister`] and is handed to rsync through a
//! temporary manifest (`--files-from`). The manifest is a
//! [`tempfile::NamedTempFile`], so it is removed when the sync returns on any
//! path: success, write error, missing rsync, or a failed transfer.
//!
//! # Safety
//!
//! rsync runs WITHOUT `--delete`. Files removed locally stay on the remote.
//!
//! # Example
//!
//! ```rust,ignore
//! use buildon::files::GitFileLister;
//! use buildon::process::SystemRunner;
//! use buildon::sync::SyncEngine;
//!
//! let engine = SyncEngine::new(&SystemRunner);
//! let report = engine.sync(&profile, &GitFileLister::new("."))?;
//! println!("synced {} files", report.files);
//! ```

use std::borrow::Cow;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::Colorize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::RemoteProfile;
use crate::files::{FileListError, FileLister, FileSet};
use crate::process::{ProcessExit, ProcessRunner, display_command};

/// rsync client binary.
pub const RSYNC_PROGRAM: &str = "rsync";

/// File name prefix of the transfer manifest.
pub const MANIFEST_PREFIX: &str = "buildon-files-";

/// Errors that can occur during a sync.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    FileList(#[from] FileListError),

    #[error("Failed to write transfer manifest: {0}")]
    ManifestWriteFailed(#[source] std::io::Error),

    #[error("rsync not found on PATH (install rsync or run via WSL/Git Bash/MSYS2)")]
    SyncToolMissing,

    #[error("Failed to execute rsync: {0}")]
    SyncToolSpawn(#[source] std::io::Error),

    #[error("rsync to {destination} failed ({exit})")]
    SyncToolFailed {
        destination: String,
        exit: ProcessExit,
    },
}

/// How a sync finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// rsync ran and exited successfully.
    Synced,
    /// The file set was empty; rsync was not run.
    NothingToSync,
    /// The invocation was printed instead of run.
    DryRun,
}

/// Summary of one sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// `user@host:path` the files were sent to.
    pub destination: String,
    pub outcome: SyncOutcome,
    /// Number of paths in the manifest.
    pub files: usize,
    pub duration_ms: u64,
}

impl SyncReport {
    fn new(destination: String, outcome: SyncOutcome, files: usize, start: Instant) -> Self {
        Self {
            destination,
            outcome,
            files,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Drives the list → manifest → rsync pipeline.
pub struct SyncEngine<'a> {
    runner: &'a dyn ProcessRunner,
    dry_run: bool,
    /// Where the manifest is created; the system temp dir when `None`.
    manifest_dir: Option<PathBuf>,
}

impl<'a> SyncEngine<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self {
            runner,
            dry_run: false,
            manifest_dir: None,
        }
    }

    /// Print the rsync invocation instead of running it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Create the manifest in `dir` instead of the system temp dir.
    pub fn with_manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifest_dir = Some(dir.into());
        self
    }

    /// Sync the files reported by `lister` to `profile`.
    pub fn sync(
        &self,
        profile: &RemoteProfile,
        lister: &dyn FileLister,
    ) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let destination = profile.destination();

        let files = lister.list_files()?;
        if files.is_empty() {
            println!("{} Nothing to sync (file list is empty).", "==>".blue().bold());
            return Ok(SyncReport::new(
                destination,
                SyncOutcome::NothingToSync,
                0,
                start,
            ));
        }

        println!("{} Files to sync:", "==>".blue().bold());
        for f in files.iter() {
            println!("{}", f.display());
        }

        // Dropped on every return below, which deletes the file.
        let manifest = write_manifest(&files, self.manifest_dir.as_deref())?;

        let args = rsync_args(manifest.path(), &destination);

        if self.dry_run {
            println!(
                "{} Would run: {}",
                "==>".blue().bold(),
                display_command(RSYNC_PROGRAM, &args)
            );
            return Ok(SyncReport::new(
                destination,
                SyncOutcome::DryRun,
                files.len(),
                start,
            ));
        }

        if self.runner.locate(RSYNC_PROGRAM).is_none() {
            return Err(SyncError::SyncToolMissing);
        }

        println!("{} Syncing via rsync...", "==>".blue().bold());
        tracing::debug!(
            destination = %destination,
            manifest = %manifest.path().display(),
            files = files.len(),
            "starting rsync"
        );

        let exit = self
            .runner
            .run(RSYNC_PROGRAM, &args)
            .map_err(SyncError::SyncToolSpawn)?;

        if !exit.success {
            tracing::warn!(destination = %destination, %exit, "rsync failed");
            return Err(SyncError::SyncToolFailed { destination, exit });
        }

        let report = SyncReport::new(destination, SyncOutcome::Synced, files.len(), start);
        tracing::info!(
            destination = %report.destination,
            files = report.files,
            duration_ms = report.duration_ms,
            "rsync completed"
        );
        Ok(report)
    }
}

/// Write one path per line to a fresh `buildon-files-*.txt` in `dir` or the temp dir.
fn write_manifest(files: &FileSet, dir: Option<&Path>) -> Result<NamedTempFile, SyncError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(MANIFEST_PREFIX).suffix(".txt");
    let mut manifest = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(SyncError::ManifestWriteFailed)?;

    write_entries(&mut manifest, files).map_err(SyncError::ManifestWriteFailed)?;
    Ok(manifest)
}

fn write_entries(out: &mut impl Write, files: &FileSet) -> std::io::Result<()> {
    for f in files.iter() {
        out.write_all(&path_bytes(f))?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// The bytes rsync should read back for `path`.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

/// Archive, verbose, compress; relative paths from the manifest, rooted at `./`.
/// NOTE: NO --delete flag. Additive sync only.
fn rsync_args(manifest: &Path, destination: &str) -> Vec<OsString> {
    let mut files_from = OsString::from("--files-from=");
    files_from.push(manifest.as_os_str());
    vec![
        "-avz".into(),
        files_from,
        "./".into(),
        destination.into(),
    ]
}
