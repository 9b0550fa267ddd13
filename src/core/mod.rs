//! core
//!
//! Configuration and on-disk layout shared by every component.
//!
//! # Modules
//!
//! - [`config`] - Immutable run configuration with environment overrides
//! - [`paths`] - Centralized path routing under the work directory

pub mod config;
pub mod paths;
