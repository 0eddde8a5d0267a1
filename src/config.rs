//! Settings resolution.
//!
//! Built-in defaults, then the optional TOML file, then environment
//! variables and flags (clap merges those two). Credentials only ever come
//! from the environment or the command line.

use anyhow::{Context, Result, bail};
use reconcile::{ListId, ReconcileOptions, format_interval};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use twitterkit::{API_BASE, Client, Credentials, MAX_PAGE_SIZE};

use crate::cli::ConnectArgs;
use crate::paths;

/// Interval between cycles when nothing else is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Longest accepted interval between cycles (30 days)
pub const MAX_INTERVAL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Invalid or incomplete settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing credential --{flag} (or ${env})")]
    MissingCredential {
        flag: &'static str,
        env: &'static str,
    },

    #[error("no list id configured (set LIST_ID or list_id in the config file)")]
    MissingListId,

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("interval {0} is longer than the maximum of 30 days")]
    IntervalTooLarge(String),

    #[error("page size {0} is out of range (1-5000)")]
    PageSize(u32),
}

// ============================================================================
// Config File
// ============================================================================

/// `config.toml` contents
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub list_id: Option<ListId>,
    /// Same syntax as `--interval`
    pub interval: Option<String>,
    pub page_size: Option<u32>,
    pub dry_run: Option<bool>,

    /// Where this was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. The default location is optional and
    /// yields an empty config when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = paths::default_config_file()?;
                if !path.exists() {
                    log::debug!("No config file at {}", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        Self::from_file(&path)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Everything a command needs, validated
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub list_id: ListId,
    pub interval: Duration,
    pub page_size: u32,
    pub dry_run: bool,
    pub api_base: String,
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Merge flags/env over the file config over defaults, then validate.
    pub fn resolve(
        connect: &ConnectArgs,
        interval: Option<Duration>,
        dry_run: bool,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let credentials = Credentials::new(
            required(connect.consumer_key.as_deref(), "consumer-key", "CK")?,
            required(connect.consumer_secret.as_deref(), "consumer-secret", "CS")?,
            required(connect.access_token.as_deref(), "access-token", "AT")?,
            required(
                connect.access_token_secret.as_deref(),
                "access-token-secret",
                "ATS",
            )?,
        );

        let list_id = connect
            .list_id
            .or(file.list_id)
            .ok_or(ConfigError::MissingListId)?;

        let interval = match (interval, file.interval.as_deref()) {
            (Some(interval), _) => interval,
            (None, Some(raw)) => parse_interval(raw).map_err(ConfigError::InvalidInterval)?,
            (None, None) => DEFAULT_INTERVAL,
        };
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if interval > MAX_INTERVAL {
            return Err(ConfigError::IntervalTooLarge(format_interval(interval)));
        }

        let page_size = connect
            .page_size
            .or(file.page_size)
            .unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::PageSize(page_size));
        }

        Ok(Self {
            credentials,
            list_id,
            interval,
            page_size,
            dry_run: dry_run || file.dry_run.unwrap_or(false),
            api_base: connect
                .api_base
                .clone()
                .unwrap_or_else(|| API_BASE.to_string()),
            source: file.source,
        })
    }

    /// API client for these settings
    pub fn client(&self) -> Client {
        Client::with_api_base(self.credentials.clone(), &self.api_base).page_size(self.page_size)
    }

    pub fn options(&self) -> ReconcileOptions {
        ReconcileOptions {
            dry_run: self.dry_run,
        }
    }

    /// Human form of the interval
    pub fn interval_display(&self) -> String {
        format_interval(self.interval)
    }
}

fn required(
    value: Option<&str>,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingCredential { flag, env }),
    }
}

// ============================================================================
// Interval Parsing
// ============================================================================

/// Parse an interval string (e.g., "90", "30s", "5m", "1h", "1m30s", "500ms")
///
/// A bare number is seconds. Units: ms, s, m, h (case-insensitive).
pub fn parse_interval(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty interval".to_string());
    }
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(format!("Invalid interval: '{input}'"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("Invalid number in interval: '{input}'"))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = rest[..unit_len].to_ascii_lowercase();
        rest = &rest[unit_len..];

        let part = match unit.as_str() {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "h" => value.checked_mul(3600).map(Duration::from_secs),
            "" => return Err(format!("Missing unit in interval: '{input}'")),
            other => return Err(format!("Unknown unit '{other}' in interval: '{input}'")),
        };

        total = part
            .and_then(|p| total.checked_add(p))
            .ok_or_else(|| format!("Interval too large: '{input}'"))?;
    }

    Ok(total)
}
