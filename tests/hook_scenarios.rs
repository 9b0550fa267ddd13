//! End-to-end runs of the hook controller against fake collaborators.
//!
//! No repository, network or PMD binary is needed: the change set, the
//! engine package and the process runner are all in-memory doubles that
//! record how they were used.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use pmd_precommit::changes::{ChangeSet, ChangeSetError, ChangeSetSource, GitChangeSetSource};
use pmd_precommit::core::config::HookConfig;
use pmd_precommit::core::paths::HookPaths;
use pmd_precommit::git::GitError;
use pmd_precommit::hook::{Hook, Outcome, RunArguments, SkipReason};
use pmd_precommit::invocation::{EngineStatus, InvocationSpec, Platform, ProcessRunner, RunnerError};
use pmd_precommit::provision::{EnginePackage, ProvisionError};

// =============================================================================
// Test Doubles
// =============================================================================

enum FakeSource {
    Files(Vec<&'static str>),
    Broken,
}

impl ChangeSetSource for FakeSource {
    fn changed_files(&self) -> Result<ChangeSet, ChangeSetError> {
        match self {
            FakeSource::Files(files) => Ok(files.iter().copied().collect()),
            FakeSource::Broken => Err(ChangeSetError::Status(GitError::Internal {
                message: "index is locked".to_string(),
            })),
        }
    }
}

struct FakePackage {
    bin_dir: PathBuf,
    downloads: Cell<usize>,
    fail_download: bool,
}

impl FakePackage {
    fn new(paths: &HookPaths) -> Self {
        Self {
            bin_dir: paths.engine_bin_dir(),
            downloads: Cell::new(0),
            fail_download: false,
        }
    }

    fn preinstalled(paths: &HookPaths) -> Self {
        let package = Self::new(paths);
        std::fs::create_dir_all(&package.bin_dir).unwrap();
        package
    }
}

impl EnginePackage for FakePackage {
    fn bin_dir(&self) -> PathBuf {
        self.bin_dir.clone()
    }

    fn download(&self, dest: &Path) -> Result<(), ProvisionError> {
        self.downloads.set(self.downloads.get() + 1);
        if self.fail_download {
            return Err(ProvisionError::HttpStatus {
                url: "https://example.invalid/pmd.zip".to_string(),
                status: 503,
            });
        }
        std::fs::write(dest, b"PK\x03\x04").unwrap();
        Ok(())
    }

    fn extract(&self, _archive: &Path) -> Result<(), ProvisionError> {
        std::fs::create_dir_all(&self.bin_dir).unwrap();
        Ok(())
    }
}

struct FakeRunner {
    result: Option<EngineStatus>,
    calls: RefCell<Vec<InvocationSpec>>,
}

impl FakeRunner {
    fn exiting(status: EngineStatus) -> Self {
        Self {
            result: Some(status),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn unstartable() -> Self {
        Self {
            result: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, spec: &InvocationSpec) -> Result<EngineStatus, RunnerError> {
        self.calls.borrow_mut().push(spec.clone());
        self.result.ok_or_else(|| RunnerError::Spawn {
            executable: spec.executable.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })
    }
}

// =============================================================================
// Fixtures
// =============================================================================

struct Workspace {
    dir: TempDir,
    config: HookConfig,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let config = HookConfig::default().with_root(dir.path());
        Self { dir, config }
    }

    fn paths(&self) -> HookPaths {
        HookPaths::from_config(&self.config)
    }

    fn run(
        &self,
        source: &dyn ChangeSetSource,
        package: &dyn EnginePackage,
        runner: &dyn ProcessRunner,
        args: &[&str],
    ) -> Outcome {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let args = RunArguments::from_positional(&args, &self.config.default_rule_set);
        Hook::new(&self.config, source, package, runner)
            .with_platform(Platform::Linux)
            .run(&args)
    }

    fn file_list(&self) -> String {
        std::fs::read_to_string(self.paths().file_list_path()).unwrap()
    }
}

fn two_java_files() -> FakeSource {
    FakeSource::Files(vec!["src/Main.java", "src/util/Helper.java"])
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn no_repository_exits_zero() {
    let ws = Workspace::new();
    let source = GitChangeSetSource::new(ws.dir.path(), "java");
    let package = FakePackage::new(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Passed);

    let outcome = ws.run(&source, &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::NoChanges));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(runner.call_count(), 0);
    assert_eq!(package.downloads.get(), 0);
}

#[test]
fn zero_staged_files_skips_engine_and_network() {
    let ws = Workspace::new();
    let package = FakePackage::new(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Passed);

    let outcome = ws.run(&FakeSource::Files(vec![]), &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::NoChanges));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(runner.call_count(), 0);
    assert_eq!(package.downloads.get(), 0);
    assert!(!ws.paths().file_list_path().exists());
}

#[test]
fn passing_engine_exits_zero_and_lists_exactly_the_staged_files() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Passed);

    let outcome = ws.run(&two_java_files(), &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::Passed));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(ws.file_list(), "src/Main.java\nsrc/util/Helper.java\n");
    assert_eq!(package.downloads.get(), 0);

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    let spec = &calls[0];
    assert_eq!(spec.executable, ws.paths().engine_bin_dir().join("run.sh"));
    assert_eq!(spec.rule_set, "rulesets/java/quickstart.xml");
    assert_eq!(spec.file_list_path, ws.paths().file_list_path());
    assert_eq!(spec.cache_path, ws.paths().cache_path());
    assert_eq!(spec.working_dir, ws.dir.path());
}

#[test]
fn failing_engine_exits_one() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&two_java_files(), &package, &runner, &["custom.xml"]);

    assert!(matches!(outcome, Outcome::Failed { code: Some(4) }));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(runner.calls.borrow()[0].rule_set, "custom.xml");
}

#[test]
fn explicit_false_suppression_still_fails() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&two_java_files(), &package, &runner, &["custom.xml", "false"]);

    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn suppressed_failure_exits_zero() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&two_java_files(), &package, &runner, &["custom.xml", "true"]);

    assert!(matches!(outcome, Outcome::Suppressed { code: Some(4) }));
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn first_run_installs_then_reuses_engine() {
    let ws = Workspace::new();
    let package = FakePackage::new(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Passed);

    let first = ws.run(&two_java_files(), &package, &runner, &[]);
    let second = ws.run(&two_java_files(), &package, &runner, &[]);

    assert!(matches!(first, Outcome::Passed));
    assert!(matches!(second, Outcome::Passed));
    assert_eq!(package.downloads.get(), 1);

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].executable, calls[1].executable);
}

#[test]
fn status_failure_fails_open() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&FakeSource::Broken, &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::Skipped(SkipReason::Status(_))));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn unwritable_file_list_fails_open() {
    let ws = Workspace::new();
    // A regular file where the work directory should be.
    std::fs::create_dir_all(ws.dir.path().join("target")).unwrap();
    std::fs::write(ws.paths().work_dir(), "not a directory").unwrap();
    let package = FakePackage::new(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&two_java_files(), &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::Skipped(SkipReason::FileList(_))));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(package.downloads.get(), 0);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn install_failure_fails_open() {
    let ws = Workspace::new();
    let mut package = FakePackage::new(&ws.paths());
    package.fail_download = true;
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&two_java_files(), &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::Skipped(SkipReason::Provision(_))));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(package.downloads.get(), 1);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn engine_that_cannot_start_fails_open() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::unstartable();

    let outcome = ws.run(&two_java_files(), &package, &runner, &[]);

    assert!(matches!(outcome, Outcome::Skipped(SkipReason::Spawn(_))));
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn malformed_arguments_use_defaults() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Failed { code: Some(4) });

    let outcome = ws.run(&two_java_files(), &package, &runner, &["a.xml", "true", "extra"]);

    // Suppression is dropped along with the rule set.
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        runner.calls.borrow()[0].rule_set,
        "rulesets/java/quickstart.xml"
    );
}

#[test]
fn windows_invocation_uses_batch_launcher() {
    let ws = Workspace::new();
    let package = FakePackage::preinstalled(&ws.paths());
    let runner = FakeRunner::exiting(EngineStatus::Passed);
    let args = RunArguments::from_positional(&[], &ws.config.default_rule_set);

    Hook::new(&ws.config, &two_java_files(), &package, &runner)
        .with_platform(Platform::Windows)
        .run(&args);

    let calls = runner.calls.borrow();
    assert_eq!(calls[0].executable, ws.paths().engine_bin_dir().join("pmd.bat"));
    assert_eq!(calls[0].subcommand, None);
}
