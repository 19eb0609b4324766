use std::io;

use clap::Parser;
use tracing::Level;

mod auth;
mod cli;
mod commands;
mod config;
mod menu;
mod render;
mod session;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    commands::run_command(cli, &mut stdout.lock())
}
