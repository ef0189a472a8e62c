//! Styled terminal output.
//!
//! Result lines go to stdout so a batch log can be captured with a plain
//! redirect; progress and diagnostics go to stderr.

use std::time::Duration;

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner shown while one file's pipelines run.
///
/// Draws nothing when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: String) -> Self {
        let bar = if Term::stderr().is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        };
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            bar.set_style(spinner_style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Pass,
    Fail,
    Info,
    Warn,
}

impl Mark {
    fn styled(self) -> console::StyledObject<&'static str> {
        match self {
            Self::Pass => style("✓").green().bold(),
            Self::Fail => style("✗").red().bold(),
            Self::Info => style("→").cyan(),
            Self::Warn => style("!").yellow().bold(),
        }
    }
}

fn out(mark: Mark, message: &str) {
    println!("{} {message}", mark.styled());
}

fn diag(mark: Mark, message: &str) {
    eprintln!("{} {message}", mark.styled());
}

pub fn pass(message: &str) {
    out(Mark::Pass, message);
}

pub fn fail(message: &str) {
    out(Mark::Fail, message);
}

pub fn info(message: &str) {
    diag(Mark::Info, message);
}

pub fn error(message: &str) {
    diag(Mark::Fail, message);
}

pub fn warning(message: &str) {
    diag(Mark::Warn, message);
}

/// Indented `label value` line under a result.
pub fn detail(label: &str, message: &str) {
    println!("    {} {message}", style(label).dim());
}

/// Indented dimmed line, used for relayed tool output.
pub fn dim(message: &str) {
    println!("    {}", style(message).dim());
}

pub fn header(title: &str) {
    println!();
    println!("{}", style(format!("=== {title} ===")).bold());
}
