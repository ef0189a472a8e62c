use std::path::Path;

use frontdiff::{CorpusPolicy, FailurePolicy, HarnessConfig, Invocation, Mode, Session};

use super::{TerminalObserver, print_summary};
use crate::cli::EXIT_FAILURE;
use crate::terminal;

/// Compile every eligible file under `dir`, reporting each compiler's output.
///
/// Never stops early.
pub fn cmd_smoke(
    dir: &Path,
    compiler: &Invocation,
    filter: Option<&str>,
    timeout: u64,
    silent: bool,
) -> i32 {
    let files = match CorpusPolicy::Tree(dir.to_path_buf()).discover(filter) {
        Ok(files) => files,
        Err(e) => {
            terminal::error(&format!("Error: {e}"));
            return EXIT_FAILURE;
        }
    };

    if !silent {
        terminal::info(&format!("Compiler: {compiler}"));
        terminal::info(&format!("Compiling {} file(s)", files.len()));
        println!();
    }

    let config = HarnessConfig::default()
        .with_compiler(compiler.clone())
        .with_timeout_secs(timeout)
        .with_corpus_dir(dir)
        .with_failure_policy(FailurePolicy::Continue);
    let session = Session::new(config);
    let mut observer = TerminalObserver::new(silent);
    let report = session.run(Mode::Smoke, &files, &mut observer);
    print_summary(&report);
    report.exit_code()
}
