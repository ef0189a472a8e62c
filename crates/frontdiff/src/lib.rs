//! frontdiff - differential testing for lexer/parser front ends
//!
//! Feeds each source file through a reference `lexer | parser` pipeline and a
//! candidate one, normalizes line-number markers, and reports the first place
//! the outputs diverge.
//!
//! # Example
//!
//! ```ignore
//! use frontdiff::{CorpusPolicy, HarnessConfig, Mode, Session};
//!
//! let config = HarnessConfig::default().with_corpus_dir("tests/cool");
//! let files = CorpusPolicy::Directory(config.corpus_dir.clone()).discover(None)?;
//! let report = Session::new(config).run(Mode::Compare, &files, &mut ());
//! std::process::exit(report.exit_code());
//! ```

pub mod compare;
pub mod config;
pub mod corpus;
pub mod metrics;
pub mod session;

pub use compare::{Comparison, Divergence, compare_runs, compare_stream};
pub use config::{FailurePolicy, HarnessConfig};
pub use corpus::{CorpusError, CorpusPolicy, SOURCE_SUFFIX};
pub use frontdiff_pipeline::{
    CapturedRun, Invocation, PipelineError, PipelineExecutor, Stage, StreamKind, ToolchainSpec,
    normalize_line,
};
pub use session::{FileOutcome, Failure, Mode, Session, SessionObserver, SessionReport};
