//! Batch runner.
//!
//! Runs every file of a corpus through the reference and candidate pipelines
//! (or through the single compiler in smoke mode), compares the results and
//! aggregates them into a [`SessionReport`]. Per-file errors become failure
//! records; nothing raised for one file stops the batch unless the session is
//! fail-fast.

use std::fmt;
use std::path::{Path, PathBuf};

use frontdiff_pipeline::{CapturedRun, PipelineError, ToolchainSpec};
use tracing::{debug, info_span};

use crate::compare::{Divergence, compare_runs};
use crate::config::{FailurePolicy, HarnessConfig};
use crate::corpus::display_name;

/// Why a file failed.
#[derive(Debug)]
pub enum Failure {
    /// Outputs diverged.
    Mismatch(Divergence),
    /// A pipeline could not produce comparable output.
    Pipeline {
        toolchain: String,
        error: PipelineError,
    },
    /// Smoke mode: the compiler exited non-zero or reported errors.
    Compile {
        exit_code: Option<i32>,
        stderr: Vec<String>,
    },
}

impl Failure {
    /// Short category label for reports and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Mismatch(divergence) => divergence.kind(),
            Self::Pipeline { error, .. } => error.category(),
            Self::Compile { .. } => "compile",
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch(divergence) => write!(f, "{divergence}"),
            Self::Pipeline { toolchain, error } => write!(f, "{toolchain} pipeline: {error}"),
            Self::Compile {
                exit_code: Some(code),
                ..
            } => write!(f, "compiler exited with code {code}"),
            Self::Compile {
                exit_code: None, ..
            } => write!(f, "compiler was terminated by a signal"),
        }
    }
}

/// Outcome for one source file.
#[derive(Debug)]
pub struct FileOutcome {
    /// Source path.
    pub path: PathBuf,
    /// Name shown in reports.
    pub name: String,
    /// `None` if the file passed.
    pub failure: Option<Failure>,
    /// Compiler stdout (smoke mode only; empty otherwise).
    pub output: Vec<String>,
    /// Compiler stderr (smoke mode only; empty otherwise).
    pub errors: Vec<String>,
}

impl FileOutcome {
    fn new(path: &Path, name: String) -> Self {
        Self {
            path: path.to_path_buf(),
            name,
            failure: None,
            output: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn failed(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Aggregate results of a batch.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub passed: usize,
    pub failed: usize,
    /// Files never attempted because a fail-fast session stopped early.
    pub not_run: usize,
    pub failures: Vec<FileOutcome>,
}

impl SessionReport {
    /// Number of files attempted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Whether every attempted file passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code for this report.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }

    /// Names of failing files, in the order they were run.
    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.name.as_str())
    }

    /// Add an outcome to the report.
    pub fn add(&mut self, outcome: FileOutcome) {
        crate::metrics::record_file(
            outcome.passed(),
            outcome.failure.as_ref().map(Failure::category),
        );
        if outcome.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.failures.push(outcome);
        }
    }
}

/// Callbacks fired while a batch runs.
pub trait SessionObserver {
    /// A file is about to be run.
    fn file_started(&mut self, _index: usize, _total: usize, _name: &str) {}

    /// A file finished. Called exactly once per attempted file.
    fn file_finished(&mut self, _index: usize, _total: usize, _outcome: &FileOutcome) {}
}

impl SessionObserver for () {}

/// What each file is run through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reference vs candidate lexer/parser pipelines.
    Compare,
    /// Single compiler, no comparison.
    Smoke,
}

/// A configured harness session.
#[derive(Debug, Clone)]
pub struct Session {
    config: HarnessConfig,
}

impl Session {
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn name_for(&self, path: &Path) -> String {
        display_name(path, Some(&self.config.corpus_dir))
    }

    fn capture(&self, toolchain: &ToolchainSpec, path: &Path) -> Result<CapturedRun, Failure> {
        let run = self
            .config
            .executor()
            .run(toolchain, path)
            .map_err(|error| Failure::Pipeline {
                toolchain: toolchain.name.clone(),
                error,
            })?;
        crate::metrics::record_pipeline(&toolchain.name, run.elapsed.as_secs_f64());
        Ok(if self.config.normalize {
            run.normalized()
        } else {
            run
        })
    }

    /// Run one file through both toolchains and compare.
    #[must_use]
    pub fn compare_file(&self, path: &Path) -> FileOutcome {
        let outcome = FileOutcome::new(path, self.name_for(path));
        let span = info_span!("compare", file = %outcome.name);
        let _enter = span.enter();

        let reference = match self.capture(&self.config.reference, path) {
            Ok(run) => run,
            Err(failure) => return outcome.failed(failure),
        };
        let candidate = match self.capture(&self.config.candidate, path) {
            Ok(run) => run,
            Err(failure) => return outcome.failed(failure),
        };

        let comparison = compare_runs(&reference, &candidate);
        debug!(matched = comparison.matched, "compared");
        match comparison.divergence {
            Some(divergence) => outcome.failed(Failure::Mismatch(divergence)),
            None => outcome,
        }
    }

    /// Compile one file with the single compiler.
    ///
    /// Passes only if the compiler exits zero with nothing on stderr.
    #[must_use]
    pub fn smoke_file(&self, path: &Path) -> FileOutcome {
        let mut outcome = FileOutcome::new(path, self.name_for(path));
        let span = info_span!("smoke", file = %outcome.name);
        let _enter = span.enter();

        let run = match self.config.executor().run_single(&self.config.compiler, path) {
            Ok(run) => run,
            Err(error) => {
                return outcome.failed(Failure::Pipeline {
                    toolchain: "compiler".to_string(),
                    error,
                });
            }
        };
        crate::metrics::record_pipeline("compiler", run.elapsed.as_secs_f64());

        let clean = run.is_clean();
        let exit_code = run.exit_code();
        outcome.output = run.stdout;
        outcome.errors = run.stderr;
        if clean {
            outcome
        } else {
            let stderr = outcome.errors.clone();
            outcome.failed(Failure::Compile { exit_code, stderr })
        }
    }

    /// Run a file in the given mode.
    #[must_use]
    pub fn run_file(&self, mode: Mode, path: &Path) -> FileOutcome {
        match mode {
            Mode::Compare => self.compare_file(path),
            Mode::Smoke => self.smoke_file(path),
        }
    }

    /// Run every file sequentially and aggregate the outcomes.
    ///
    /// With [`FailurePolicy::FailFast`] the batch stops after the first
    /// failing file; the remaining files are counted in
    /// [`SessionReport::not_run`].
    pub fn run<O: SessionObserver + ?Sized>(
        &self,
        mode: Mode,
        files: &[PathBuf],
        observer: &mut O,
    ) -> SessionReport {
        let total = files.len();
        let mut report = SessionReport::default();

        for (i, path) in files.iter().enumerate() {
            observer.file_started(i + 1, total, &self.name_for(path));
            let outcome = self.run_file(mode, path);
            observer.file_finished(i + 1, total, &outcome);

            let failed = !outcome.passed();
            report.add(outcome);
            if failed && self.config.failure_policy == FailurePolicy::FailFast {
                report.not_run = total - (i + 1);
                debug!(not_run = report.not_run, "stopping after first failure");
                break;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdiff_pipeline::StreamKind;

    fn outcome(name: &str, failure: Option<Failure>) -> FileOutcome {
        let mut outcome = FileOutcome::new(Path::new(name), name.to_string());
        outcome.failure = failure;
        outcome
    }

    #[test]
    fn test_report_counts_and_names() {
        let mut report = SessionReport::default();
        report.add(outcome("a.cl", None));
        report.add(outcome(
            "b.cl",
            Some(Failure::Mismatch(Divergence::Length {
                stream: StreamKind::Stdout,
                reference: 1,
                candidate: 2,
            })),
        ));
        report.add(outcome(
            "c.cl",
            Some(Failure::Compile {
                exit_code: Some(1),
                stderr: vec!["error".into()],
            }),
        ));

        assert_eq!(report.total(), 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 2);
        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_names().collect::<Vec<_>>(), ["b.cl", "c.cl"]);
    }

    #[test]
    fn test_empty_report_passes() {
        let report = SessionReport::default();
        assert!(report.all_passed());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_failure_category_and_display() {
        let failure = Failure::Mismatch(Divergence::Line {
            stream: StreamKind::Stderr,
            index: 2,
            reference: "x".into(),
            candidate: "y".into(),
        });
        assert_eq!(failure.category(), "stderr-mismatch");
        assert_eq!(failure.to_string(), "mismatch in stderr at line 2");

        let failure = Failure::Pipeline {
            toolchain: "candidate".into(),
            error: PipelineError::Timeout(std::time::Duration::from_secs(2)),
        };
        assert_eq!(failure.category(), "timeout");
        assert_eq!(failure.to_string(), "candidate pipeline: pipeline timed out after 2s");

        let failure = Failure::Compile {
            exit_code: None,
            stderr: Vec::new(),
        };
        assert_eq!(failure.category(), "compile");
        assert_eq!(failure.to_string(), "compiler was terminated by a signal");
    }

    #[test]
    fn test_missing_toolchain_is_recorded_not_raised() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("a.cl");
        std::fs::write(&src, "class Main {};\n").unwrap();

        let config = HarnessConfig::default()
            .with_reference(
                "/nonexistent/lexer".parse().unwrap(),
                "/nonexistent/parser".parse().unwrap(),
            )
            .with_corpus_dir(temp.path());
        let session = Session::new(config);
        let report = session.run(Mode::Compare, &[src.clone(), src], &mut ());

        assert_eq!(report.failed, 2);
        let failure = report.failures[0].failure.as_ref().unwrap();
        assert_eq!(failure.category(), "launch");
        assert_eq!(report.failures[0].name, "a.cl");
    }
}
