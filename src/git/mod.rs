//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module should import
//! `git2`. The hook never writes to the repository; it only opens it and reads
//! the per-path status.
//!
//! # Responsibilities
//!
//! - Opening the repository at the working directory
//! - Classifying each path by its index (staging) state
//!
//! # Example
//!
//! ```ignore
//! use pmd_precommit::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let staged: Vec<_> = git
//!     .index_status()?
//!     .into_iter()
//!     .filter(|e| e.state.is_staged_for_analysis())
//!     .collect();
//! ```

mod interface;

pub use interface::{Git, GitError, StagingState, StatusEntry};
