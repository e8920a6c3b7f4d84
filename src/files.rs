//! Resolve the set of files to transfer from git state.
//!
//! The file set is every tracked file plus every untracked file not excluded
//! by ignore rules, deduplicated in first-seen order (tracked first) and
//! filtered to paths that still exist on disk. Both listings are requested in
//! NUL-separated form so names with spaces or newlines survive intact.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Errors that can occur while listing files.
#[derive(Error, Debug)]
pub enum FileListError {
    #[error("not a git repository (run inside your repo): {}", .0.display())]
    NotARepository(PathBuf),

    #[error("git {query} failed: {message}")]
    QueryFailed { query: String, message: String },
}

/// Repository-relative paths to sync, unique and in first-seen order.
///
/// Paths keep the exact bytes git reported, so names that are not valid
/// UTF-8 still resolve on disk and reach the manifest unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for FileSet {
    /// Keeps the first occurrence of each path.
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let paths = iter
            .into_iter()
            .map(Into::into)
            .filter(|p: &PathBuf| seen.insert(p.clone()))
            .collect();
        Self { paths }
    }
}

/// Source of the file set for a sync.
pub trait FileLister {
    fn list_files(&self) -> Result<FileSet, FileListError>;
}

/// Lists files by shelling out to the `git` CLI inside a working tree.
#[derive(Debug, Clone)]
pub struct GitFileLister {
    root: PathBuf,
}

impl GitFileLister {
    /// `root` is the directory git runs in and existence checks resolve against.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self, args: &[&str]) -> Result<Output, FileListError> {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FileListError::QueryFailed {
                query: args.join(" "),
                message: format!("failed to execute git: {e}"),
            })
    }

    fn git_output(&self, args: &[&str]) -> Result<Vec<u8>, FileListError> {
        let output = self.git(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FileListError::QueryFailed {
                query: args.join(" "),
                message: stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// A failing `rev-parse` means "not a work tree"; a missing git binary is an error.
    fn is_inside_work_tree(&self) -> Result<bool, FileListError> {
        let output = self.git(&["rev-parse", "--is-inside-work-tree"])?;
        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }
}

impl FileLister for GitFileLister {
    fn list_files(&self) -> Result<FileSet, FileListError> {
        if !self.is_inside_work_tree()? {
            return Err(FileListError::NotARepository(self.root.clone()));
        }

        let tracked = self.git_output(&["ls-files", "-z"])?;
        let untracked = self.git_output(&["ls-files", "-z", "--others", "--exclude-standard"])?;

        let files = resolve_file_set(&self.root, &tracked, &untracked);
        tracing::debug!(
            root = %self.root.display(),
            files = files.len(),
            "resolved file set"
        );
        Ok(files)
    }
}

/// Split NUL-separated git output into paths, dropping empty tokens.
pub fn split_nul(raw: &[u8]) -> impl Iterator<Item = PathBuf> + '_ {
    raw.split(|b| *b == 0)
        .filter(|tok| !tok.is_empty())
        .map(path_from_bytes)
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

// git for Windows emits UTF-8 paths.
#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Merge tracked then untracked listings and keep only paths present under `root`.
pub fn resolve_file_set(root: &Path, tracked: &[u8], untracked: &[u8]) -> FileSet {
    split_nul(tracked)
        .chain(split_nul(untracked))
        .collect::<FileSet>()
        .paths
        .into_iter()
        .filter(|p| {
            let exists = root.join(p).exists();
            if !exists {
                tracing::debug!(path = %p.display(), "skipping path missing on disk");
            }
            exists
        })
        .collect()
}
