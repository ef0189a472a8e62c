//! Output comparison for differential testing.
//!
//! Compares the captured output of the reference toolchain against the
//! candidate's. Stdout is checked completely before stderr, and within each
//! stream a content divergence is reported before a length divergence. The
//! walk stops at the first divergence: later ones are usually cascading noise.

use std::fmt;

use frontdiff_pipeline::{CapturedRun, StreamKind};

/// Result of comparing two captured runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Number of lines that matched before the walk stopped (both streams).
    pub matched: usize,
    /// First divergence (if any).
    pub divergence: Option<Divergence>,
}

impl Comparison {
    /// Whether both streams matched exactly.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.divergence.is_none()
    }
}

/// Where two runs first disagreed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// Lines differ at a 1-based `index`.
    Line {
        stream: StreamKind,
        index: usize,
        reference: String,
        candidate: String,
    },
    /// All common lines match but the streams have different lengths.
    Length {
        stream: StreamKind,
        reference: usize,
        candidate: usize,
    },
}

impl Divergence {
    /// Stream the divergence was found in.
    #[must_use]
    pub const fn stream(&self) -> StreamKind {
        match self {
            Self::Line { stream, .. } | Self::Length { stream, .. } => *stream,
        }
    }

    /// Short kind label, e.g. `stdout-mismatch` or `stderr-length`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Line {
                stream: StreamKind::Stdout,
                ..
            } => "stdout-mismatch",
            Self::Line {
                stream: StreamKind::Stderr,
                ..
            } => "stderr-mismatch",
            Self::Length {
                stream: StreamKind::Stdout,
                ..
            } => "stdout-length",
            Self::Length {
                stream: StreamKind::Stderr,
                ..
            } => "stderr-length",
        }
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line { stream, index, .. } => write!(f, "mismatch in {stream} at line {index}"),
            Self::Length {
                stream,
                reference,
                candidate,
            } => write!(
                f,
                "{stream} length mismatch: reference has {reference} lines, candidate has {candidate}"
            ),
        }
    }
}

/// Compare one stream's lines, stopping at the first difference.
///
/// Returns the number of matched lines and the divergence, if any.
#[must_use]
pub fn compare_stream(
    stream: StreamKind,
    reference: &[String],
    candidate: &[String],
) -> (usize, Option<Divergence>) {
    for (i, (ref_line, cand_line)) in reference.iter().zip(candidate).enumerate() {
        if ref_line != cand_line {
            let divergence = Divergence::Line {
                stream,
                index: i + 1,
                reference: ref_line.clone(),
                candidate: cand_line.clone(),
            };
            return (i, Some(divergence));
        }
    }

    let matched = reference.len().min(candidate.len());
    if reference.len() != candidate.len() {
        let divergence = Divergence::Length {
            stream,
            reference: reference.len(),
            candidate: candidate.len(),
        };
        return (matched, Some(divergence));
    }
    (matched, None)
}

/// Compare two runs: stdout first, then stderr only if stdout matched.
///
/// Callers normalize both runs beforehand; this compares lines literally.
#[must_use]
pub fn compare_runs(reference: &CapturedRun, candidate: &CapturedRun) -> Comparison {
    let mut matched = 0;
    for stream in [StreamKind::Stdout, StreamKind::Stderr] {
        let (count, divergence) =
            compare_stream(stream, reference.lines(stream), candidate.lines(stream));
        matched += count;
        if divergence.is_some() {
            return Comparison {
                matched,
                divergence,
            };
        }
    }
    Comparison {
        matched,
        divergence: None,
    }
}

#[cfg(test)]
mod tests;
