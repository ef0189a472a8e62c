//! Two-stage process pipelines with captured, normalized output.
//!
//! A [`ToolchainSpec`] names a lexer and a parser. [`PipelineExecutor::run`]
//! runs `lexer <source> | parser` with real OS-level piping between the two
//! stages and returns a [`CapturedRun`] holding the parser's stdout and stderr
//! as ordered lines. [`normalize_line`] rewrites `#<digits>` line markers so
//! that line-number drift does not register as a difference.
//!
//! # Example
//!
//! ```ignore
//! use frontdiff_pipeline::{Invocation, PipelineExecutor, ToolchainSpec};
//!
//! let toolchain = ToolchainSpec::new("candidate", "./lexer".parse()?, "./parser".parse()?);
//! let run = PipelineExecutor::new().run(&toolchain, "hello.cl".as_ref())?.normalized();
//! ```

mod capture;
mod error;
mod executor;
mod normalize;
mod toolchain;

pub use capture::{CapturedRun, StreamKind};
pub use error::{PipelineError, Result};
pub use executor::PipelineExecutor;
pub use normalize::{LINE_PLACEHOLDER, normalize_line, normalize_lines};
pub use toolchain::{Invocation, Stage, ToolchainSpec};
