//! Pipeline error types.

use std::time::Duration;

use thiserror::Error;

use crate::{Stage, StreamKind};

/// Failure to produce a [`CapturedRun`](crate::CapturedRun).
///
/// None of these are output mismatches: the pipeline never produced
/// comparable output.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to launch {stage}: {source}")]
    Launch {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} {stream} is not valid UTF-8: {source}")]
    Decode {
        stage: Stage,
        stream: StreamKind,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("pipeline timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("failed to collect {stage} output: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Short category name for reports and metric labels.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "launch",
            Self::Decode { .. } => "decode",
            Self::Timeout(_) => "timeout",
            Self::Io { .. } => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
