//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Build the configuration and the real collaborators
//! - Hand over to [`crate::hook`] and turn its outcome into an exit code
//!
//! # Architecture
//!
//! The CLI layer is thin. It never decides whether a commit is blocked; that
//! is [`Outcome::exit_code`](crate::hook::Outcome::exit_code).

pub mod args;

pub use args::Cli;

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::changes::GitChangeSetSource;
use crate::core::config::HookConfig;
use crate::core::paths::HookPaths;
use crate::hook::Hook;
use crate::invocation::SystemProcessRunner;
use crate::provision::ReleasePackage;

/// Run the hook for already parsed arguments.
///
/// # Errors
///
/// Only if `--cwd` cannot be resolved. Everything after that point fails
/// open and is reported through the returned exit code.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = HookConfig::from_env();
    if let Some(cwd) = &cli.cwd {
        let root = std::fs::canonicalize(cwd)
            .with_context(|| format!("cannot resolve --cwd {}", cwd.display()))?;
        config = config.with_root(root);
    }
    tracing::debug!("configuration: {:?}", config);

    let args = cli.run_arguments(&config.default_rule_set);
    let source = GitChangeSetSource::new(config.root(), config.source_extension.clone());
    let package = ReleasePackage::new(config.release_url.clone(), HookPaths::from_config(&config));
    let runner = SystemProcessRunner;

    let outcome = Hook::new(&config, &source, &package, &runner).run(&args);
    Ok(ExitCode::from(outcome.exit_code()))
}
