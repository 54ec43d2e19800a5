mod app;
mod cli;
mod config;
mod error;
mod queue;
mod splitter;
mod tui;
mod ui;
mod utils;

use clap::Parser;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Guard flushes the debug log on drop
    let _log_guard = utils::init_logging();

    cli::run(cli)
}
