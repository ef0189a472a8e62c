//! frontdiff CLI - differential testing for lexer/parser front ends

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize metrics recorder if enabled
    let metrics_handle = if cli.metrics {
        frontdiff::metrics::SummaryRecorder::new().install()
    } else {
        None
    };

    // Initialize metric descriptions
    frontdiff::metrics::init();

    let default_level = if cli.verbose {
        "frontdiff=debug"
    } else if cli.silent {
        "frontdiff=error"
    } else {
        "frontdiff=warn"
    };
    // Target prefix match also covers the frontdiff_pipeline crate.
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = default_level.parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::debug!(command = cli.command.name(), "starting");
    let exit_code = commands::run_command(&cli);

    // Print metrics summary if enabled
    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}
