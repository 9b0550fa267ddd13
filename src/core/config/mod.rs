//! core::config
//!
//! Immutable run configuration.
//!
//! # Overview
//!
//! Everything that would otherwise be a scattered literal (the engine release,
//! where it is installed, the default rule set, which files count as sources)
//! lives in a single [`HookConfig`] built once at startup and passed by
//! reference to every component.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Environment variables
//! 3. CLI flags (`--cwd`, not handled here)
//!
//! # Environment Variables
//!
//! - `PMD_PRECOMMIT_VERSION` - engine release version; also re-derives the
//!   release URL unless one is given explicitly
//! - `PMD_PRECOMMIT_RELEASE_URL` - release archive URL
//! - `PMD_PRECOMMIT_WORK_DIR` - install/cache directory, relative to the root
//!
//! Empty values are ignored.
//!
//! # Example
//!
//! ```
//! use pmd_precommit::core::config::HookConfig;
//!
//! let config = HookConfig::default();
//! assert_eq!(config.engine_version, "6.55.0");
//! assert_eq!(config.release_package(), "pmd-bin-6.55.0");
//! ```

use std::path::{Path, PathBuf};

/// Application name used as the prefix of every log line.
pub const APP_NAME: &str = "pmd-java-pre-commit-hook";

/// Engine release installed when nothing else is configured.
pub const DEFAULT_ENGINE_VERSION: &str = "6.55.0";

/// Rule set used when none is passed on the command line.
pub const DEFAULT_RULE_SET: &str = "rulesets/java/quickstart.xml";

/// Install/cache directory, relative to the root.
pub const DEFAULT_WORK_DIR: &str = "target/pmd";

/// Extension (without the dot) of files handed to the engine.
pub const DEFAULT_SOURCE_EXTENSION: &str = "java";

const ENV_VERSION: &str = "PMD_PRECOMMIT_VERSION";
const ENV_RELEASE_URL: &str = "PMD_PRECOMMIT_RELEASE_URL";
const ENV_WORK_DIR: &str = "PMD_PRECOMMIT_WORK_DIR";

/// Release archive URL for an engine version.
///
/// # Example
///
/// ```
/// use pmd_precommit::core::config::release_url_for;
///
/// assert_eq!(
///     release_url_for("6.55.0"),
///     "https://github.com/pmd/pmd/releases/download/pmd_releases%2F6.55.0/pmd-bin-6.55.0.zip"
/// );
/// ```
pub fn release_url_for(version: &str) -> String {
    format!(
        "https://github.com/pmd/pmd/releases/download/pmd_releases%2F{v}/pmd-bin-{v}.zip",
        v = version
    )
}

/// Configuration for one hook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    /// Directory every relative path hangs off; also the repository root.
    pub root: PathBuf,
    /// Engine release version.
    pub engine_version: String,
    /// URL of the release archive for `engine_version`.
    pub release_url: String,
    /// Install/cache directory, relative to `root`.
    pub work_dir: PathBuf,
    /// Rule set used when none is given on the command line.
    pub default_rule_set: String,
    /// Extension of files handed to the engine, without the dot.
    pub source_extension: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
            release_url: release_url_for(DEFAULT_ENGINE_VERSION),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            default_rule_set: DEFAULT_RULE_SET.to_string(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
        }
    }
}

impl HookConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary key lookup.
    ///
    /// # Example
    ///
    /// ```
    /// use pmd_precommit::core::config::HookConfig;
    ///
    /// let config = HookConfig::from_lookup(|key| match key {
    ///     "PMD_PRECOMMIT_VERSION" => Some("7.0.0".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.release_package(), "pmd-bin-7.0.0");
    /// assert!(config.release_url.ends_with("pmd-bin-7.0.0.zip"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(version) = get(ENV_VERSION) {
            config.release_url = release_url_for(&version);
            config.engine_version = version;
        }
        if let Some(url) = get(ENV_RELEASE_URL) {
            config.release_url = url;
        }
        if let Some(dir) = get(ENV_WORK_DIR) {
            config.work_dir = PathBuf::from(dir);
        }

        config
    }

    /// Rebase the configuration onto another root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Name of the top-level directory inside the release archive.
    pub fn release_package(&self) -> String {
        format!("pmd-bin-{}", self.engine_version)
    }

    /// Root as a Path reference.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
