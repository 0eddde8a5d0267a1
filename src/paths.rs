//! Path resolution for listsync
//!
//! # Environment Variables
//!
//! - `LISTSYNC_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `LISTSYNC_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/listsync` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\listsync`
//!    - macOS/Linux: `~/.config/listsync`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "LISTSYNC_CONFIG_DIR";

/// Name of the optional config file inside [`config_dir`]
pub const CONFIG_FILE: &str = "config.toml";

/// Get the listsync config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("listsync");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            return Ok(app_data.join("listsync"));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("listsync");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default config file location
pub fn default_config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
