//! Pipeline executor.
//!
//! Runs `lexer <source> | parser` with the lexer's stdout wired straight into
//! the parser's stdin at the OS level, drains the parser's stdout and stderr on
//! reader threads, and reaps both children before returning. The timeout covers
//! both waiting for the children and draining their output.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, warn};

use crate::capture::{CapturedRun, StreamKind, decode_lines};
use crate::error::{PipelineError, Result};
use crate::toolchain::{Invocation, Stage, ToolchainSpec};

/// Poll interval while waiting for children to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A spawned child that is killed and reaped on every exit path.
struct ChildGuard {
    child: Child,
    stage: Stage,
    status: Option<ExitStatus>,
}

impl ChildGuard {
    fn spawn(cmd: &mut Command, stage: Stage) -> Result<Self> {
        let child = cmd
            .spawn()
            .map_err(|source| PipelineError::Launch { stage, source })?;
        debug!(stage = %stage, pid = child.id(), "spawned");
        Ok(Self {
            child,
            stage,
            status: None,
        })
    }

    /// Returns true once the child has exited.
    fn poll(&mut self) -> Result<bool> {
        if self.status.is_none() {
            self.status = self.child.try_wait().map_err(|source| PipelineError::Io {
                stage: self.stage,
                source,
            })?;
            if let Some(status) = self.status {
                debug!(stage = %self.stage, ?status, "exited");
            }
        }
        Ok(self.status.is_some())
    }

    fn kill(&mut self) {
        if self.status.is_none() {
            warn!(stage = %self.stage, pid = self.child.id(), "killing");
            let _ = self.child.kill();
            self.status = self.child.wait().ok();
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.status.is_none() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Time budget for one pipeline run.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    /// Budget left, or `None` when unbounded.
    fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }

    fn expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    fn error(&self) -> PipelineError {
        PipelineError::Timeout(self.limit.unwrap_or_default())
    }
}

/// Output of one stream, delivered by its reader thread.
type Drain = Receiver<std::io::Result<Vec<u8>>>;

/// Read a stream to end-of-file on its own thread.
///
/// The thread outlives the run if a leftover descendant keeps the pipe open
/// after the deadline; it exits once that process does.
fn drain<R: Read + Send + 'static>(mut reader: R) -> Drain {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = reader.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });
    rx
}

/// Collect a drained stream, giving up once the deadline passes.
fn collect(rx: &Drain, stage: Stage, deadline: Deadline) -> Result<Vec<u8>> {
    let received = match deadline.remaining() {
        Some(left) => rx.recv_timeout(left),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(bytes) => bytes.map_err(|source| PipelineError::Io { stage, source }),
        Err(RecvTimeoutError::Timeout) => {
            warn!(stage = %stage, "output still open at deadline");
            Err(deadline.error())
        }
        Err(RecvTimeoutError::Disconnected) => Err(PipelineError::Io {
            stage,
            source: std::io::Error::other("reader thread panicked"),
        }),
    }
}

/// Spawns pipelines and captures their output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineExecutor {
    timeout: Option<Duration>,
}

impl PipelineExecutor {
    /// Executor that waits indefinitely.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill both stages if the whole pipeline has not exited within `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `lexer <source> | parser` and capture the parser's output.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Launch`] if either stage cannot be spawned,
    /// [`PipelineError::Timeout`] if the pipeline outlives the timeout, and
    /// [`PipelineError::Decode`] if the parser's output is not UTF-8.
    pub fn run(&self, toolchain: &ToolchainSpec, source: &Path) -> Result<CapturedRun> {
        let span = debug_span!(
            "pipeline",
            toolchain = %toolchain.name,
            source = %source.display()
        );
        let _enter = span.enter();
        let deadline = Deadline::new(self.timeout);

        let mut lexer_cmd = toolchain.lexer.command(Some(source.as_os_str()));
        lexer_cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut lexer = ChildGuard::spawn(&mut lexer_cmd, Stage::Lexer)?;

        let tokens = lexer.child.stdout.take().ok_or_else(|| PipelineError::Io {
            stage: Stage::Lexer,
            source: std::io::Error::other("no stdout"),
        })?;
        let lexer_err = lexer.child.stderr.take().map(drain);

        let mut parser = {
            let mut parser_cmd = toolchain.parser.command(None);
            parser_cmd
                .stdin(Stdio::from(tokens))
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            // The command owns our copy of the token pipe; it is dropped at
            // the end of this block so only the two children hold its ends.
            ChildGuard::spawn(&mut parser_cmd, Stage::Parser)?
        };

        let (out, err) = take_output(&mut parser)?;
        let mut children = [lexer, parser];
        wait_all(&mut children, deadline)?;
        let [lexer, parser] = children;

        if let Some(rx) = lexer_err {
            let bytes = collect(&rx, Stage::Lexer, deadline)?;
            for line in String::from_utf8_lossy(&bytes).lines() {
                debug!(stage = "lexer", "{line}");
            }
        }

        let stdout = decode_lines(
            collect(&out, Stage::Parser, deadline)?,
            Stage::Parser,
            StreamKind::Stdout,
        )?;
        let stderr = decode_lines(
            collect(&err, Stage::Parser, deadline)?,
            Stage::Parser,
            StreamKind::Stderr,
        )?;

        let elapsed = deadline.start.elapsed();
        debug!(
            stdout_lines = stdout.len(),
            stderr_lines = stderr.len(),
            elapsed_ms = elapsed.as_millis(),
            "captured"
        );

        Ok(CapturedRun {
            stdout,
            stderr,
            status: parser.status.unwrap_or_default(),
            lexer_status: lexer.status,
            elapsed,
        })
    }

    /// Run a single `compiler <source>` invocation and capture its output.
    ///
    /// # Errors
    ///
    /// Same conditions as [`run`](Self::run), attributed to [`Stage::Compiler`].
    pub fn run_single(&self, compiler: &Invocation, source: &Path) -> Result<CapturedRun> {
        let span = debug_span!("compile", source = %source.display());
        let _enter = span.enter();
        let deadline = Deadline::new(self.timeout);

        let mut cmd = compiler.command(Some(source.as_os_str()));
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = ChildGuard::spawn(&mut cmd, Stage::Compiler)?;

        let (out, err) = take_output(&mut child)?;
        let mut children = [child];
        wait_all(&mut children, deadline)?;
        let [child] = children;

        let stdout = decode_lines(
            collect(&out, Stage::Compiler, deadline)?,
            Stage::Compiler,
            StreamKind::Stdout,
        )?;
        let stderr = decode_lines(
            collect(&err, Stage::Compiler, deadline)?,
            Stage::Compiler,
            StreamKind::Stderr,
        )?;

        Ok(CapturedRun {
            stdout,
            stderr,
            status: child.status.unwrap_or_default(),
            lexer_status: None,
            elapsed: deadline.start.elapsed(),
        })
    }
}

/// Start draining a child's stdout and stderr.
fn take_output(guard: &mut ChildGuard) -> Result<(Drain, Drain)> {
    let stage = guard.stage;
    let missing = |name: &str| PipelineError::Io {
        stage,
        source: std::io::Error::other(format!("no {name}")),
    };
    let out = guard.child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let err = guard.child.stderr.take().ok_or_else(|| missing("stderr"))?;
    Ok((drain(out), drain(err)))
}

/// Wait for every child to exit, killing all of them once `timeout` elapses.
fn wait_all(children: &mut [ChildGuard], deadline: Deadline) -> Result<()> {
    loop {
        let mut done = true;
        for child in children.iter_mut() {
            done &= child.poll()?;
        }
        if done {
            return Ok(());
        }
        if deadline.expired() {
            warn!(
                timeout_secs = deadline.limit.unwrap_or_default().as_secs_f64(),
                "pipeline timed out"
            );
            for child in children.iter_mut() {
                child.kill();
            }
            return Err(deadline.error());
        }
        thread::sleep(POLL_INTERVAL);
    }
}
