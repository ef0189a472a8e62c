//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use frontdiff::Invocation;
use frontdiff::config::{
    DEFAULT_CANDIDATE_PARSER, DEFAULT_COMPILER, DEFAULT_CORPUS_DIR, DEFAULT_LEXER,
    DEFAULT_REFERENCE_PARSER, DEFAULT_TIMEOUT_SECS,
};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "frontdiff")]
#[command(about = "Differential testing for lexer/parser front ends")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare reference and candidate output for every .cl file in a directory
    Dir {
        /// Directory containing .cl files (not searched recursively)
        #[arg(value_name = "DIR", default_value = DEFAULT_CORPUS_DIR)]
        dir: PathBuf,

        /// Only run files whose name contains this string
        #[arg(long)]
        filter: Option<String>,

        #[command(flatten)]
        toolchains: ToolchainArgs,
    },
    /// Compare reference and candidate output for specific files, stopping at the first mismatch
    Files {
        /// Source files; names not found as given are looked up in --corpus
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Directory used to resolve bare file names
        #[arg(long, default_value = DEFAULT_CORPUS_DIR)]
        corpus: PathBuf,

        #[command(flatten)]
        toolchains: ToolchainArgs,
    },
    /// Compile every .cl file under a directory tree and report compiler errors
    Smoke {
        /// Root of the tree to search
        #[arg(value_name = "DIR", default_value = DEFAULT_CORPUS_DIR)]
        dir: PathBuf,

        /// Full compiler command, invoked as `<compiler> <file>`
        #[arg(long, default_value = DEFAULT_COMPILER)]
        compiler: Invocation,

        /// Only run files whose name contains this string
        #[arg(long)]
        filter: Option<String>,

        /// Per-file timeout in seconds (0 = no timeout)
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
}

impl Commands {
    /// Short label for the active command.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dir { .. } => "dir",
            Self::Files { .. } => "files",
            Self::Smoke { .. } => "smoke",
        }
    }
}

/// Toolchain selection shared by the comparison commands.
#[derive(Args, Clone, Debug)]
pub struct ToolchainArgs {
    /// Lexer used by the reference toolchain
    #[arg(long, default_value = DEFAULT_LEXER)]
    pub reference_lexer: Invocation,

    /// Reference parser
    #[arg(long, default_value = DEFAULT_REFERENCE_PARSER)]
    pub reference_parser: Invocation,

    /// Lexer used by the candidate toolchain
    #[arg(long, default_value = DEFAULT_LEXER)]
    pub candidate_lexer: Invocation,

    /// Candidate parser under test
    #[arg(long, default_value = DEFAULT_CANDIDATE_PARSER)]
    pub candidate_parser: Invocation,

    /// Compare raw output without rewriting `#<digits>` line markers
    #[arg(long)]
    pub no_normalize: bool,

    /// Per-pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dir_defaults() {
        let cli = Cli::try_parse_from(["frontdiff", "dir"]).unwrap();
        let Commands::Dir {
            dir, toolchains, ..
        } = cli.command
        else {
            panic!("expected dir command");
        };
        assert_eq!(dir, PathBuf::from(DEFAULT_CORPUS_DIR));
        assert_eq!(toolchains.reference_lexer, toolchains.candidate_lexer);
        assert_eq!(toolchains.timeout, DEFAULT_TIMEOUT_SECS);
        assert!(!toolchains.no_normalize);
    }

    #[test]
    fn test_files_requires_a_file() {
        assert!(Cli::try_parse_from(["frontdiff", "files"]).is_err());
        let cli = Cli::try_parse_from([
            "frontdiff",
            "files",
            "a.cl",
            "b.cl",
            "--candidate-parser",
            "python3 parser.py",
        ])
        .unwrap();
        let Commands::Files {
            files, toolchains, ..
        } = cli.command
        else {
            panic!("expected files command");
        };
        assert_eq!(files, [PathBuf::from("a.cl"), PathBuf::from("b.cl")]);
        assert_eq!(toolchains.candidate_parser.args(), ["parser.py"]);
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["frontdiff", "-v", "-s", "dir"]).is_err());
    }
}
