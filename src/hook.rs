//! hook
//!
//! The run controller: resolve changes, write the file list, provision the
//! engine, run it, and map the result to an exit code.
//!
//! # Lifecycle
//!
//! ```text
//! ResolveChanges ─┬─ none ──────────────────────────────► NoChanges (0)
//!                 └─ some ─► WriteList ─┬─ fail ────────► Skipped   (0)
//!                                       └─ ok ─► Provision ─┬─ fail ► Skipped (0)
//!                                                           └─ ok ─► Invoke
//! Invoke ─┬─ passed ──────────────► Passed     (0)
//!         ├─ failed, suppressed ──► Suppressed (0)
//!         └─ failed ──────────────► Failed     (1)
//! ```
//!
//! Every infrastructure failure fails open: the commit is never blocked
//! because the hook itself could not do its job, only by real findings.

use tracing::{debug, info, warn};

use crate::changes::{ChangeSetError, ChangeSetSource};
use crate::core::config::{HookConfig, APP_NAME};
use crate::core::paths::HookPaths;
use crate::invocation::{
    write_file_list, EngineStatus, InvocationSpec, Platform, ProcessRunner, RunnerError,
};
use crate::provision::{ensure_engine, EnginePackage, ProvisionError};

/// Effective run arguments after positional parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArguments {
    /// Rule set handed to the engine.
    pub rule_set: String,
    /// Whether engine failures still exit 0.
    pub suppressed: bool,
}

impl RunArguments {
    /// Map positional arguments onto run arguments.
    ///
    /// - no arguments: default rule set, not suppressed
    /// - one: the rule set
    /// - two: the rule set and a boolean token for suppression
    /// - three or more: treated as malformed, same as none
    ///
    /// Parsing never fails: an unrecognised boolean token means `false`.
    ///
    /// # Example
    ///
    /// ```
    /// use pmd_precommit::hook::RunArguments;
    ///
    /// let args = RunArguments::from_positional(
    ///     &["custom.xml".to_string(), "true".to_string()],
    ///     "default.xml",
    /// );
    /// assert_eq!(args.rule_set, "custom.xml");
    /// assert!(args.suppressed);
    /// ```
    pub fn from_positional(args: &[String], default_rule_set: &str) -> Self {
        match args {
            [rule_set] => Self {
                rule_set: rule_set.clone(),
                suppressed: false,
            },
            [rule_set, suppressed] => Self {
                rule_set: rule_set.clone(),
                suppressed: parse_bool_token(suppressed).unwrap_or(false),
            },
            _ => Self {
                rule_set: default_rule_set.to_string(),
                suppressed: false,
            },
        }
    }
}

/// Parse the boolean spellings commonly accepted on command lines.
///
/// # Example
///
/// ```
/// use pmd_precommit::hook::parse_bool_token;
///
/// assert_eq!(parse_bool_token("TRUE"), Some(true));
/// assert_eq!(parse_bool_token("0"), Some(false));
/// assert_eq!(parse_bool_token("yes"), None);
/// ```
pub fn parse_bool_token(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Why a run was skipped without analysing anything.
#[derive(Debug)]
pub enum SkipReason {
    /// The repository status could not be read.
    Status(ChangeSetError),
    /// The file list could not be written.
    FileList(std::io::Error),
    /// The engine could not be installed.
    Provision(ProvisionError),
    /// The engine could not be started.
    Spawn(RunnerError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Status(e) => write!(f, "failed to get staged files: {}", e),
            SkipReason::FileList(e) => write!(f, "failed to write file list: {}", e),
            SkipReason::Provision(e) => write!(f, "failed to install PMD: {}", e),
            SkipReason::Spawn(e) => write!(
                f,
                "failed to run PMD: {}; if the install is broken, delete it to reinstall",
                e
            ),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum Outcome {
    /// No staged files of the target type.
    NoChanges,
    /// Infrastructure failure; analysis did not happen.
    Skipped(SkipReason),
    /// The engine found nothing to report.
    Passed,
    /// The engine failed but failures are suppressed.
    Suppressed { code: Option<i32> },
    /// The engine failed.
    Failed { code: Option<i32> },
}

impl Outcome {
    /// Process exit code for this outcome. Only `Failed` blocks the commit.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Failed { .. } => 1,
            Outcome::NoChanges
            | Outcome::Skipped(_)
            | Outcome::Passed
            | Outcome::Suppressed { .. } => 0,
        }
    }
}

/// One hook run wired to its collaborators.
pub struct Hook<'a> {
    config: &'a HookConfig,
    platform: Platform,
    source: &'a dyn ChangeSetSource,
    package: &'a dyn EnginePackage,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Hook<'a> {
    /// Create a hook for the current platform.
    pub fn new(
        config: &'a HookConfig,
        source: &'a dyn ChangeSetSource,
        package: &'a dyn EnginePackage,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            config,
            platform: Platform::current(),
            source,
            package,
            runner,
        }
    }

    /// Override the platform used to build the command line.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Run the hook once and log how it ended.
    pub fn run(&self, args: &RunArguments) -> Outcome {
        let outcome = self.execute(args);
        match &outcome {
            Outcome::NoChanges => info!(
                "{} didn't find any staged .{} files",
                APP_NAME, self.config.source_extension
            ),
            Outcome::Skipped(reason) => warn!("{} {}", APP_NAME, reason),
            Outcome::Passed => debug!("{} analysis passed", APP_NAME),
            Outcome::Suppressed { code } => info!(
                "{} analysis failed (exit {:?}) but failures are suppressed",
                APP_NAME, code
            ),
            Outcome::Failed { code } => debug!("{} analysis failed (exit {:?})", APP_NAME, code),
        }
        outcome
    }

    fn execute(&self, args: &RunArguments) -> Outcome {
        let changes = match self.source.changed_files() {
            Ok(changes) => changes,
            Err(e) => return Outcome::Skipped(SkipReason::Status(e)),
        };
        if changes.is_empty() {
            return Outcome::NoChanges;
        }
        debug!("{} staged files to analyse", changes.len());

        let paths = HookPaths::from_config(self.config);
        let file_list = paths.file_list_path();
        if let Err(e) = write_file_list(&file_list, &changes) {
            return Outcome::Skipped(SkipReason::FileList(e));
        }

        let bin_dir = match ensure_engine(self.package, paths.work_dir()) {
            Ok(dir) => dir,
            Err(e) => return Outcome::Skipped(SkipReason::Provision(e)),
        };

        let spec = InvocationSpec::build(
            self.platform,
            &bin_dir,
            &args.rule_set,
            &paths,
            self.config.root(),
        );
        debug!("running {}", spec);

        match self.runner.run(&spec) {
            Ok(EngineStatus::Passed) => Outcome::Passed,
            Ok(EngineStatus::Failed { code }) if args.suppressed => Outcome::Suppressed { code },
            Ok(EngineStatus::Failed { code }) => Outcome::Failed { code },
            Err(e) => Outcome::Skipped(SkipReason::Spawn(e)),
        }
    }
}
