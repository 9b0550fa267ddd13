//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to the repository. The hook only
//! ever reads from Git: it opens the repository at the working directory and
//! asks for the per-path status so that staged files can be picked out.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: No repository at the given path
//! - [`GitError::BareRepo`]: Repository has no working tree
//! - [`GitError::Internal`]: Anything libgit2 reports while reading status
//!
//! # Example
//!
//! ```ignore
//! use pmd_precommit::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for entry in git.index_status()? {
//!     println!("{} {}", entry.state, entry.path);
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository rooted at the given path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with the operation as context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        GitError::Internal {
            message: format!("{}: {}", context, err.message()),
        }
    }
}

/// Index-side classification of a single path.
///
/// Only the half of the status flags describing the index (what would be
/// committed) is considered. Working-tree-only edits leave a tracked file
/// `Unmodified` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagingState {
    /// Nothing staged for this path.
    Unmodified,
    /// Present in the working tree but not in the index.
    Untracked,
    /// Newly added to the index.
    Added,
    /// Content changed in the index.
    Modified,
    /// Removed from the index.
    Deleted,
    /// File type changed in the index (e.g. file to symlink).
    TypeChange,
    /// Unresolved merge conflict.
    Conflicted,
}

impl StagingState {
    /// Classify a libgit2 status bitset.
    fn from_status(status: git2::Status) -> Self {
        if status.is_conflicted() {
            StagingState::Conflicted
        } else if status.is_index_new() {
            StagingState::Added
        } else if status.is_index_modified() || status.is_index_renamed() {
            StagingState::Modified
        } else if status.is_index_deleted() {
            StagingState::Deleted
        } else if status.is_index_typechange() {
            StagingState::TypeChange
        } else if status.is_wt_new() {
            StagingState::Untracked
        } else {
            StagingState::Unmodified
        }
    }

    /// Whether a path in this state is part of the commit being made and
    /// still exists on disk to be analysed.
    ///
    /// # Example
    ///
    /// ```
    /// use pmd_precommit::git::StagingState;
    ///
    /// assert!(StagingState::Added.is_staged_for_analysis());
    /// assert!(!StagingState::Untracked.is_staged_for_analysis());
    /// ```
    pub fn is_staged_for_analysis(&self) -> bool {
        matches!(
            self,
            StagingState::Added | StagingState::Modified | StagingState::TypeChange
        )
    }

    /// Get a short description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            StagingState::Unmodified => "unmodified",
            StagingState::Untracked => "untracked",
            StagingState::Added => "added",
            StagingState::Modified => "modified",
            StagingState::Deleted => "deleted",
            StagingState::TypeChange => "typechange",
            StagingState::Conflicted => "conflicted",
        }
    }
}

impl std::fmt::Display for StagingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// One path reported by the status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// Index-side state of the path.
    pub state: StagingState,
}

/// The Git interface.
///
/// No other module imports `git2` directly.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository rooted at `path`.
    ///
    /// Unlike discovery, parent directories are not searched: the hook runs
    /// from the repository root and a directory without its own `.git` is
    /// treated as "no repository".
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository exists at `path`
    /// - [`GitError::BareRepo`] if the repository has no working directory
    /// - [`GitError::Internal`] if the repository exists but cannot be read
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::NotARepo {
                path: path.to_path_buf(),
            },
            _ => GitError::from_git2(e, "open"),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Status of every path libgit2 reports, untracked included.
    ///
    /// Ignored files are excluded. Paths that are not valid UTF-8 are skipped.
    pub fn index_status(&self) -> Result<Vec<StatusEntry>, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut entries = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                tracing::debug!("skipping status entry with non UTF-8 path");
                continue;
            };
            entries.push(StatusEntry {
                path: path.to_string(),
                state: StagingState::from_status(entry.status()),
            });
        }

        Ok(entries)
    }
}
