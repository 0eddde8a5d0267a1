mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    /// Explicit config file from `--config` / `LISTSYNC_CONFIG`
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Cycle commands log their progress at info by default
    let default_level = match cli.command {
        Command::Run(_) | Command::Once(_) => log::LevelFilter::Info,
        _ => log::LevelFilter::Warn,
    };
    let log_level = match cli.verbose {
        0 => default_level,
        1 => default_level.max(log::LevelFilter::Info),
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut logger = env_logger::Builder::new();
    logger.filter_level(if cli.quiet {
        log::LevelFilter::Error
    } else {
        log_level
    });
    logger.parse_default_env();
    // A long-running service wants timestamps on every line
    if !matches!(cli.command, Command::Run(_)) {
        logger.format_timestamp(None);
    }
    logger.init();

    let ctx = Context {
        quiet: cli.quiet,
        config: cli.config,
    };

    match cli.command {
        Command::Run(args) => commands::run::run(&ctx, &args),
        Command::Once(args) => commands::once::run(&ctx, &args),
        Command::Diff(args) => commands::diff::run(&ctx, &args),
        Command::Config(args) => commands::config::run(&ctx, &args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "listsync", &mut io::stdout());
            Ok(())
        }
    }
}
