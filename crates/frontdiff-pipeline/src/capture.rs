//! Captured pipeline output.

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::normalize::normalize_lines;
use crate::Stage;

/// Which output stream of the final stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one pipeline run against one source file.
///
/// Lines keep the exact order the process wrote them in.
#[derive(Debug, Clone, Default)]
pub struct CapturedRun {
    /// Final-stage stdout, split into lines.
    pub stdout: Vec<String>,
    /// Final-stage stderr, split into lines.
    pub stderr: Vec<String>,
    /// Final-stage exit status.
    pub status: ExitStatus,
    /// Lexer exit status, when the run was a two-stage pipeline.
    pub lexer_status: Option<ExitStatus>,
    /// Wall-clock time from first spawn to last reap.
    pub elapsed: Duration,
}

impl CapturedRun {
    /// Build a run from already-split lines with a successful status.
    pub fn from_lines<I, J, S, T>(stdout: I, stderr: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            stdout: stdout.into_iter().map(Into::into).collect(),
            stderr: stderr.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Rewrite line-number markers in both streams.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        normalize_lines(&mut self.stdout);
        normalize_lines(&mut self.stderr);
        self
    }

    /// Lines of the given stream.
    #[must_use]
    pub fn lines(&self, stream: StreamKind) -> &[String] {
        match stream {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        }
    }

    /// Exit code of the final stage (`None` if killed by a signal).
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Final stage exited zero and wrote nothing to stderr.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.status.success() && self.stderr.is_empty()
    }
}

/// Characters that end a line, besides the `\r\n` pair.
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split text into lines on every Unicode line boundary.
///
/// `\r\n` counts as one break. A trailing terminator does not add an empty line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let Some(at) = rest.find(is_line_break) else {
            lines.push(rest.to_owned());
            break;
        };
        lines.push(rest[..at].to_owned());
        let tail = &rest[at..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
    }
    lines
}

/// Decode captured bytes and split them into lines.
pub(crate) fn decode_lines(bytes: Vec<u8>, stage: Stage, stream: StreamKind) -> Result<Vec<String>> {
    let text =
        String::from_utf8(bytes).map_err(|source| PipelineError::Decode {
            stage,
            stream,
            source,
        })?;
    Ok(split_lines(&text))
}
