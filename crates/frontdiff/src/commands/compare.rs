use std::path::{Path, PathBuf};

use frontdiff::{CorpusPolicy, FailurePolicy, HarnessConfig, Mode, Session};

use super::{TerminalObserver, print_summary};
use crate::cli::{EXIT_FAILURE, ToolchainArgs};
use crate::terminal;

fn harness_config(toolchains: &ToolchainArgs, corpus_dir: &Path) -> HarnessConfig {
    HarnessConfig::default()
        .with_reference(
            toolchains.reference_lexer.clone(),
            toolchains.reference_parser.clone(),
        )
        .with_candidate(
            toolchains.candidate_lexer.clone(),
            toolchains.candidate_parser.clone(),
        )
        .with_normalize(!toolchains.no_normalize)
        .with_timeout_secs(toolchains.timeout)
        .with_corpus_dir(corpus_dir)
}

/// Compare every eligible file in a directory, attempting all of them.
pub fn cmd_dir(dir: &Path, filter: Option<&str>, toolchains: &ToolchainArgs, silent: bool) -> i32 {
    let config = harness_config(toolchains, dir).with_failure_policy(FailurePolicy::Continue);
    run_compare(config, &CorpusPolicy::Directory(dir.to_path_buf()), filter, silent)
}

/// Compare explicit files, stopping at the first failure.
pub fn cmd_files(files: &[PathBuf], corpus: &Path, toolchains: &ToolchainArgs, silent: bool) -> i32 {
    let config = harness_config(toolchains, corpus).with_failure_policy(FailurePolicy::FailFast);
    let policy = CorpusPolicy::Files {
        base: corpus.to_path_buf(),
        files: files.to_vec(),
    };
    run_compare(config, &policy, None, silent)
}

fn run_compare(
    config: HarnessConfig,
    policy: &CorpusPolicy,
    filter: Option<&str>,
    silent: bool,
) -> i32 {
    let files = match policy.discover(filter) {
        Ok(files) => files,
        Err(e) => {
            terminal::error(&format!("Error: {e}"));
            return EXIT_FAILURE;
        }
    };

    if !silent {
        terminal::info(&config.reference.to_string());
        terminal::info(&config.candidate.to_string());
        if !config.normalize {
            terminal::info("line-number normalization disabled");
        }
        terminal::info(&format!("Comparing {} file(s)", files.len()));
        println!();
    }

    let session = Session::new(config);
    let mut observer = TerminalObserver::new(silent);
    let report = session.run(Mode::Compare, &files, &mut observer);
    print_summary(&report);
    report.exit_code()
}
