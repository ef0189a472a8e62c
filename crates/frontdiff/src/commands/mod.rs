//! Command implementations.
//!
//! Each submodule handles one CLI command. All of them share the terminal
//! observer and summary printing defined here.

mod compare;
mod smoke;

use frontdiff::{Divergence, Failure, FileOutcome, SessionObserver, SessionReport};

use crate::cli::{Cli, Commands};
use crate::terminal::{self, Spinner};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Dir {
            dir,
            filter,
            toolchains,
        } => compare::cmd_dir(dir, filter.as_deref(), toolchains, cli.silent),
        Commands::Files {
            files,
            corpus,
            toolchains,
        } => compare::cmd_files(files, corpus, toolchains, cli.silent),
        Commands::Smoke {
            dir,
            compiler,
            filter,
            timeout,
        } => smoke::cmd_smoke(dir, compiler, filter.as_deref(), *timeout, cli.silent),
    }
}

/// Prints one result line per file, with a spinner while the file runs.
pub struct TerminalObserver {
    silent: bool,
    spinner: Option<Spinner>,
}

impl TerminalObserver {
    pub const fn new(silent: bool) -> Self {
        Self {
            silent,
            spinner: None,
        }
    }
}

impl SessionObserver for TerminalObserver {
    fn file_started(&mut self, index: usize, total: usize, name: &str) {
        if !self.silent {
            self.spinner = Some(Spinner::new(format!("[{index}/{total}] {name}")));
        }
    }

    fn file_finished(&mut self, index: usize, total: usize, outcome: &FileOutcome) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        print_outcome(index, total, outcome, self.silent);
    }
}

/// Print a file's result line and, for failures, where it went wrong.
fn print_outcome(index: usize, total: usize, outcome: &FileOutcome, silent: bool) {
    let prefix = format!("[{index}/{total}] {}", outcome.name);

    let Some(failure) = &outcome.failure else {
        if !silent {
            terminal::pass(&format!("{prefix} passed"));
            for line in &outcome.output {
                terminal::dim(line);
            }
        }
        return;
    };

    terminal::fail(&format!("{prefix}: {failure}"));
    match failure {
        Failure::Mismatch(Divergence::Line {
            reference,
            candidate,
            ..
        }) => {
            terminal::detail("Reference:", reference);
            terminal::detail("Candidate:", candidate);
        }
        Failure::Mismatch(Divergence::Length { .. }) | Failure::Pipeline { .. } => {}
        Failure::Compile { stderr, .. } => {
            for line in &outcome.output {
                terminal::dim(line);
            }
            for line in stderr {
                terminal::detail("stderr:", line);
            }
        }
    }
}

/// Print the end-of-run summary.
pub fn print_summary(report: &SessionReport) {
    terminal::header("Test Summary");
    if report.not_run > 0 {
        terminal::warning(&format!(
            "stopped after first failure; {} file(s) not run",
            report.not_run
        ));
    }
    if report.all_passed() {
        terminal::pass(&format!("All {} file(s) passed!", report.passed));
        return;
    }
    println!("{} of {} file(s) failed:", report.failed, report.total());
    for name in report.failed_names() {
        println!("  {name}");
    }
}
