//! invocation
//!
//! Build and execute the engine command line.
//!
//! # Command Shape
//!
//! ```text
//! <bin>/run.sh pmd -R <rule-set> -f text --cache <cache> --file-list <list>   (Unix)
//! <bin>\pmd.bat    -R <rule-set> -f text --cache <cache> --file-list <list>   (Windows)
//! ```
//!
//! The engine's output is never captured: stdout and stderr are inherited so
//! its own report is what the user sees.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::changes::ChangeSet;
use crate::core::paths::HookPaths;

/// Output format requested from the engine.
pub const OUTPUT_FORMAT: &str = "text";

/// Operating system family, as far as launching the engine is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// All platforms, for exhaustive checks.
    pub const ALL: [Platform; 4] = [
        Platform::Windows,
        Platform::MacOs,
        Platform::Linux,
        Platform::Other,
    ];

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

/// Launcher script and subcommand for a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launcher {
    /// Script name inside the engine's bin directory.
    pub script: &'static str,
    /// Subcommand token passed before the flags, if the platform needs one.
    pub subcommand: Option<&'static str>,
}

impl Launcher {
    /// Launcher for `platform`.
    ///
    /// # Example
    ///
    /// ```
    /// use pmd_precommit::invocation::{Launcher, Platform};
    ///
    /// let launcher = Launcher::for_platform(Platform::Linux);
    /// assert_eq!(launcher.script, "run.sh");
    /// assert_eq!(launcher.subcommand, Some("pmd"));
    /// ```
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Launcher {
                script: "pmd.bat",
                subcommand: None,
            },
            Platform::MacOs | Platform::Linux | Platform::Other => Launcher {
                script: "run.sh",
                subcommand: Some("pmd"),
            },
        }
    }
}

/// A fully resolved engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Launcher script to execute.
    pub executable: PathBuf,
    /// Subcommand token, if any.
    pub subcommand: Option<String>,
    /// Rule set identifier passed to `-R`.
    pub rule_set: String,
    /// Persistent cache file passed to `--cache`.
    pub cache_path: PathBuf,
    /// File list passed to `--file-list`.
    pub file_list_path: PathBuf,
    /// Directory the engine runs in; file list entries are relative to it.
    pub working_dir: PathBuf,
}

impl InvocationSpec {
    /// Build the invocation for an engine installed at `bin_dir`.
    pub fn build(
        platform: Platform,
        bin_dir: &Path,
        rule_set: &str,
        paths: &HookPaths,
        working_dir: &Path,
    ) -> Self {
        let launcher = Launcher::for_platform(platform);
        Self {
            executable: bin_dir.join(launcher.script),
            subcommand: launcher.subcommand.map(str::to_string),
            rule_set: rule_set.to_string(),
            cache_path: paths.cache_path(),
            file_list_path: paths.file_list_path(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Arguments after the executable, in order.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(9);
        if let Some(sub) = &self.subcommand {
            args.push(sub.clone());
        }
        args.extend([
            "-R".to_string(),
            self.rule_set.clone(),
            "-f".to_string(),
            OUTPUT_FORMAT.to_string(),
            "--cache".to_string(),
            self.cache_path.display().to_string(),
            "--file-list".to_string(),
            self.file_list_path.display().to_string(),
        ]);
        args
    }
}

impl std::fmt::Display for InvocationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in self.args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Write `changes` to `path`, one path per line.
///
/// Parent directories are created. The file is replaced, not appended to.
pub fn write_file_list(path: &Path, changes: &ChangeSet) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for file in changes.iter() {
        writeln!(writer, "{}", file)?;
    }
    writer.flush()
}

/// How the engine process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Exit status zero.
    Passed,
    /// Non-zero exit, or killed by a signal (`code` is `None`).
    Failed { code: Option<i32> },
}

/// Errors from running the engine.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The process could not be started at all.
    #[error("failed to start {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },
}

/// Something that can execute an engine invocation.
pub trait ProcessRunner {
    /// Run to completion and report how it ended.
    fn run(&self, spec: &InvocationSpec) -> Result<EngineStatus, RunnerError>;
}

/// Runs the engine as a child process with inherited stdio.
///
/// Blocks until the child exits; there is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, spec: &InvocationSpec) -> Result<EngineStatus, RunnerError> {
        let status = Command::new(&spec.executable)
            .args(spec.args())
            .current_dir(&spec.working_dir)
            .status()
            .map_err(|source| RunnerError::Spawn {
                executable: spec.executable.clone(),
                source,
            })?;

        if status.success() {
            Ok(EngineStatus::Passed)
        } else {
            Ok(EngineStatus::Failed {
                code: status.code(),
            })
        }
    }
}
