use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::parse_interval;

#[derive(Parser)]
#[command(name = "listsync")]
#[command(version)]
#[command(about = "Keep a Twitter list in sync with the accounts you follow", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/listsync/config.toml)
    #[arg(long, global = true, env = "LISTSYNC_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile the list now and then on every interval until interrupted
    Run(SyncArgs),

    /// Run a single reconciliation cycle and exit
    Once(SyncArgs),

    /// Show what the next cycle would add and remove
    Diff(DiffArgs),

    /// Show the resolved configuration (secrets masked)
    Config(SyncArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Credentials and list selection shared by every command that talks to the API
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectArgs {
    /// OAuth consumer key
    #[arg(long, env = "CK", hide_env_values = true)]
    pub consumer_key: Option<String>,

    /// OAuth consumer secret
    #[arg(long, env = "CS", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    /// OAuth access token
    #[arg(long, env = "AT", hide_env_values = true)]
    pub access_token: Option<String>,

    /// OAuth access token secret
    #[arg(long, env = "ATS", hide_env_values = true)]
    pub access_token_secret: Option<String>,

    /// ID of the list to keep in sync
    #[arg(long, env = "LIST_ID")]
    pub list_id: Option<i64>,

    /// Identifiers requested per fetch (1-5000)
    #[arg(long, env = "PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// API base URL
    #[arg(long, env = "TWITTER_API_BASE", hide = true)]
    pub api_base: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Time between cycles: seconds, or a value like 30s, 5m, 1h, 1m30s
    #[arg(short, long, env = "SYNC_INTERVAL", value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Compute the diff but do not modify the list
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DiffArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Print the diff as JSON
    #[arg(long)]
    pub json: bool,
}
