// Cycle commands
pub mod once;
pub mod run;

// Inspection commands
pub mod config;
pub mod diff;

use anyhow::Result;
use std::time::Duration;

use crate::Context;
use crate::cli::ConnectArgs;
use crate::config::{FileConfig, Settings};

/// Load the config file and resolve settings against flags and env
fn load_settings(
    ctx: &Context,
    connect: &ConnectArgs,
    interval: Option<Duration>,
    dry_run: bool,
) -> Result<Settings> {
    let file = FileConfig::load(ctx.config.as_deref())?;
    Ok(Settings::resolve(connect, interval, dry_run, file)?)
}
