//! Toolchain configuration: which executables make up a pipeline.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

/// Pipeline stage, used to attribute launch and drain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Lexer stage: reads the source file, writes tokens.
    Lexer,
    /// Parser stage: reads tokens on stdin.
    Parser,
    /// Single combined compiler (smoke mode).
    Compiler,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lexer => "lexer",
            Self::Parser => "parser",
            Self::Compiler => "compiler",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An executable plus leading arguments.
///
/// Parsed from a whitespace-separated string (`"./lexer"`,
/// `"python3 lexer.py"`). There is no shell quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
}

impl Invocation {
    /// Invocation with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a leading argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several leading arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build a `Command` for this invocation, optionally followed by a source path.
    pub(crate) fn command(&self, source: Option<&OsStr>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(source) = source {
            cmd.arg(source);
        }
        cmd
    }
}

impl FromStr for Invocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| "empty command".to_string())?;
        Ok(Self::new(program).with_args(parts))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A lexer/parser pair run as `lexer <source> | parser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainSpec {
    /// Label used in logs and metrics ("reference", "candidate").
    pub name: String,
    pub lexer: Invocation,
    pub parser: Invocation,
}

impl ToolchainSpec {
    pub fn new(name: impl Into<String>, lexer: Invocation, parser: Invocation) -> Self {
        Self {
            name: name.into(),
            lexer,
            parser,
        }
    }
}

impl fmt::Display for ToolchainSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} <file> | {}", self.name, self.lexer, self.parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invocation() {
        let inv: Invocation = "./parser".parse().unwrap();
        assert_eq!(inv.program(), Path::new("./parser"));
        assert!(inv.args().is_empty());

        let inv: Invocation = "  python3   lexer.py -v ".parse().unwrap();
        assert_eq!(inv.program(), Path::new("python3"));
        assert_eq!(inv.args(), ["lexer.py", "-v"]);
    }

    #[test]
    fn test_parse_empty_invocation() {
        assert!("".parse::<Invocation>().is_err());
        assert!("   ".parse::<Invocation>().is_err());
    }

    #[test]
    fn test_command_appends_source_last() {
        let inv = Invocation::new("sh").with_args(["-c", "cat \"$0\""]);
        let cmd = inv.command(Some(OsStr::new("a.cl")));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-c", "cat \"$0\"", "a.cl"]);
    }

    #[test]
    fn test_display() {
        let spec = ToolchainSpec::new(
            "reference",
            Invocation::new("./lexer"),
            Invocation::new("/usr/class/bin/parser"),
        );
        assert_eq!(
            spec.to_string(),
            "reference: ./lexer <file> | /usr/class/bin/parser"
        );
    }
}
