//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Positional Arguments
//!
//! `[RULE_SET] [SUPPRESS_FAILURES]`, exactly as hook runners pass them. They
//! are collected raw and interpreted by
//! [`RunArguments::from_positional`](crate::hook::RunArguments::from_positional),
//! so a malformed list falls back to defaults instead of being rejected.
//! Arguments that are not valid UTF-8 are converted lossily.
//!
//! # Global Flags
//!
//! - `--cwd <path>`: Run as if started in that directory
//! - `--debug`: Enable debug logging

use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::hook::RunArguments;

/// Run PMD against the Java files staged for commit
#[derive(Parser, Debug, Default)]
#[command(name = "pmd-java-pre-commit-hook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run as if the hook was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Rule set, then whether to suppress failures (true/false)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

impl Cli {
    /// Parse command-line arguments.
    ///
    /// `--help` and `--version` print and exit as usual. Any other parse
    /// error is returned so the caller can fall back to defaults; a hook
    /// must never exit with a usage error.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::parse_from_args(std::env::args_os())
    }

    /// [`parse_args`](Self::parse_args) over an explicit argument list.
    pub fn parse_from_args<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(argv) {
            Ok(cli) => Ok(cli),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve the positional arguments against the default rule set.
    pub fn run_arguments(&self, default_rule_set: &str) -> RunArguments {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        RunArguments::from_positional(&args, default_rule_set)
    }
}
