//! Harness configuration.

use std::path::PathBuf;
use std::time::Duration;

use frontdiff_pipeline::{Invocation, PipelineExecutor, ToolchainSpec};

/// Default location of the example corpus.
pub const DEFAULT_CORPUS_DIR: &str = "/afs/ir/class/cs143/examples/";
/// Default reference parser.
pub const DEFAULT_REFERENCE_PARSER: &str = "/afs/ir/class/cs143/bin/parser";
/// Default lexer, shared by both toolchains unless overridden.
pub const DEFAULT_LEXER: &str = "./lexer";
/// Default candidate parser.
pub const DEFAULT_CANDIDATE_PARSER: &str = "./parser";
/// Default full compiler for smoke runs.
pub const DEFAULT_COMPILER: &str = "./mycoolc";
/// Default per-pipeline timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Whether a batch keeps going after a failing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Attempt every file.
    #[default]
    Continue,
    /// Stop at the first failing file.
    FailFast,
}

/// Configuration for a harness session.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Trusted toolchain.
    pub reference: ToolchainSpec,
    /// Toolchain under test.
    pub candidate: ToolchainSpec,
    /// Single combined compiler for smoke runs.
    pub compiler: Invocation,
    /// Rewrite `#<digits>` markers before comparing.
    pub normalize: bool,
    /// Per-pipeline timeout (`None` waits forever).
    pub timeout: Option<Duration>,
    /// Corpus root, used for display names and explicit-file lookup.
    pub corpus_dir: PathBuf,
    /// Batch failure policy.
    pub failure_policy: FailurePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            reference: ToolchainSpec::new(
                "reference",
                Invocation::new(DEFAULT_LEXER),
                Invocation::new(DEFAULT_REFERENCE_PARSER),
            ),
            candidate: ToolchainSpec::new(
                "candidate",
                Invocation::new(DEFAULT_LEXER),
                Invocation::new(DEFAULT_CANDIDATE_PARSER),
            ),
            compiler: Invocation::new(DEFAULT_COMPILER),
            normalize: true,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            failure_policy: FailurePolicy::Continue,
        }
    }
}

impl HarnessConfig {
    /// Set the reference toolchain.
    #[must_use]
    pub fn with_reference(mut self, lexer: Invocation, parser: Invocation) -> Self {
        self.reference = ToolchainSpec::new("reference", lexer, parser);
        self
    }

    /// Set the candidate toolchain.
    #[must_use]
    pub fn with_candidate(mut self, lexer: Invocation, parser: Invocation) -> Self {
        self.candidate = ToolchainSpec::new("candidate", lexer, parser);
        self
    }

    /// Set the smoke-run compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Invocation) -> Self {
        self.compiler = compiler;
        self
    }

    /// Enable or disable line-marker normalization.
    #[must_use]
    pub const fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set timeout in seconds (0 disables the timeout).
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = if secs == 0 {
            None
        } else {
            Some(Duration::from_secs(secs))
        };
        self
    }

    /// Set the timeout directly.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the corpus directory.
    #[must_use]
    pub fn with_corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = dir.into();
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Executor honoring the configured timeout.
    #[must_use]
    pub const fn executor(&self) -> PipelineExecutor {
        match self.timeout {
            Some(timeout) => PipelineExecutor::new().with_timeout(timeout),
            None => PipelineExecutor::new(),
        }
    }
}
