//! core::paths
//!
//! Centralized path routing for the hook's on-disk state.
//!
//! # Storage Layout
//!
//! Everything lives under `<root>/<work_dir>/` (`./target/pmd` by default):
//! - `sourceFiles.txt` - file list handed to the engine, rewritten every run
//! - `cache` - the engine's own incremental analysis cache
//! - `<release-package>/bin/` - the installed engine
//!
//! **Hard rule:** no code outside this module joins these names onto a path.
//!
//! # Example
//!
//! ```
//! use pmd_precommit::core::config::HookConfig;
//! use pmd_precommit::core::paths::HookPaths;
//! use std::path::PathBuf;
//!
//! let paths = HookPaths::from_config(&HookConfig::default().with_root("/repo"));
//!
//! assert_eq!(
//!     paths.file_list_path(),
//!     PathBuf::from("/repo/target/pmd/sourceFiles.txt")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::HookConfig;

/// Centralized path routing for hook storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPaths {
    /// `<root>/<work_dir>`.
    pub work_dir: PathBuf,

    /// Top-level directory name inside the release archive.
    pub release_package: String,
}

impl HookPaths {
    /// Create HookPaths from a work directory and release package name.
    pub fn new(work_dir: PathBuf, release_package: impl Into<String>) -> Self {
        Self {
            work_dir,
            release_package: release_package.into(),
        }
    }

    /// Create HookPaths from a configuration.
    pub fn from_config(config: &HookConfig) -> Self {
        Self::new(config.root.join(&config.work_dir), config.release_package())
    }

    /// Get the work directory as a Path reference.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Get the path to the generated file list.
    ///
    /// This is `<work_dir>/sourceFiles.txt`.
    pub fn file_list_path(&self) -> PathBuf {
        self.work_dir.join("sourceFiles.txt")
    }

    /// Get the path to the engine's analysis cache.
    ///
    /// This is `<work_dir>/cache`.
    pub fn cache_path(&self) -> PathBuf {
        self.work_dir.join("cache")
    }

    /// Get the root of the extracted engine release.
    ///
    /// This is `<work_dir>/<release_package>`.
    pub fn engine_home(&self) -> PathBuf {
        self.work_dir.join(&self.release_package)
    }

    /// Get the engine's executable directory.
    ///
    /// This is `<work_dir>/<release_package>/bin`. Its existence is the only
    /// installation check.
    pub fn engine_bin_dir(&self) -> PathBuf {
        self.engine_home().join("bin")
    }
}
