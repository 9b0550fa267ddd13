//! pmd-precommit - run PMD against the Java files staged for commit
//!
//! The hook resolves which `.java` files are staged, makes sure a PMD
//! release is unpacked under `./target/pmd`, runs it over exactly those files
//! and exits non-zero only when PMD reports violations (and failures are not
//! suppressed).
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing and wiring of the real collaborators
//! - [`hook`] - Run controller: ResolveChanges → WriteList → Provision → Invoke
//! - [`changes`] - Staged-file resolution behind [`changes::ChangeSetSource`]
//! - [`provision`] - Engine install behind [`provision::EnginePackage`]
//! - [`invocation`] - Command construction and [`invocation::ProcessRunner`]
//! - [`git`] - Single interface for all Git operations
//! - [`core`] - Configuration and path routing
//!
//! # Failure Policy
//!
//! The hook fails open. Missing repository, unreadable status, an unwritable
//! file list, a failed download or a PMD that cannot be started all log a
//! message and exit 0. Only PMD's own failure blocks a commit.

pub mod changes;
pub mod cli;
pub mod core;
pub mod git;
pub mod hook;
pub mod invocation;
pub mod provision;
