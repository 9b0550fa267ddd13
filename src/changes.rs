//! changes
//!
//! Resolve the set of files the engine should look at.
//!
//! # Design
//!
//! The run controller only sees the [`ChangeSetSource`] trait, so it can be
//! driven by a fake in tests. [`GitChangeSetSource`] is the real source: it
//! reads the index status through [`crate::git`] and keeps the staged paths
//! whose extension matches.
//!
//! A directory that is not a repository yields an empty set rather than an
//! error. The hook should no-op silently there.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::git::{Git, GitError};

/// Errors from resolving the change set.
#[derive(Debug, Error)]
pub enum ChangeSetError {
    /// The repository exists but its status could not be read.
    #[error("failed to read repository status: {0}")]
    Status(#[from] GitError),
}

/// Paths staged for commit that match the target extension.
///
/// Backed by an ordered set: no duplicates and a stable iteration order, so
/// the generated file list is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: BTreeSet<String>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path; returns false if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    /// Whether there is nothing to analyse.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the path is part of the set.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Iterate paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Anything that can tell the hook which files changed.
pub trait ChangeSetSource {
    /// Resolve the current change set.
    fn changed_files(&self) -> Result<ChangeSet, ChangeSetError>;
}

/// Whether `path` ends in `.<extension>`.
///
/// The comparison is exact: `Foo.JAVA` does not match `java`, and a file
/// named just `.java` has no extension.
///
/// # Example
///
/// ```
/// use pmd_precommit::changes::matches_extension;
///
/// assert!(matches_extension("src/Main.java", "java"));
/// assert!(!matches_extension("src/Main.kt", "java"));
/// ```
pub fn matches_extension(path: &str, extension: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext == extension)
}

/// Change set source backed by the repository's index status.
#[derive(Debug, Clone)]
pub struct GitChangeSetSource {
    root: PathBuf,
    extension: String,
}

impl GitChangeSetSource {
    /// Create a source for the repository at `root` filtering on `extension`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }
}

impl ChangeSetSource for GitChangeSetSource {
    fn changed_files(&self) -> Result<ChangeSet, ChangeSetError> {
        let git = match Git::open(&self.root) {
            Ok(git) => git,
            Err(GitError::NotARepo { path }) => {
                tracing::debug!("no repository at {}", path.display());
                return Ok(ChangeSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let changes = git
            .index_status()?
            .into_iter()
            .filter(|entry| entry.state.is_staged_for_analysis())
            .filter(|entry| matches_extension(&entry.path, &self.extension))
            .map(|entry| entry.path)
            .collect();

        Ok(changes)
    }
}
