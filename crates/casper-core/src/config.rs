//! Configuration for the login component.
//!
//! Loads configuration from ${CASPER_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::job::{JobOptions, TubeNames};

pub mod paths {
    //! Path resolution for casper configuration and data files.
    //!
    //! CASPER_HOME resolution order:
    //! 1. CASPER_HOME environment variable (if set)
    //! 2. ~/.config/casper (default)

    use std::path::PathBuf;

    /// Returns the casper home directory.
    pub fn casper_home() -> PathBuf {
        if let Ok(home) = std::env::var("CASPER_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".casper"),
            |h| h.join(".config").join("casper"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        casper_home().join("config.toml")
    }

    /// Returns the path to the saved credentials file.
    pub fn credentials_path() -> PathBuf {
        casper_home().join("credentials.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        casper_home().join("logs")
    }
}

/// Login component configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// How long to wait for the server to respond, in seconds.
    pub timeout: u64,

    /// Prefix for the tube names.
    pub tube_prefix: String,

    /// Domain used by the session cookie, important when running in a cluster.
    /// Handed to the transport when the login runtime starts.
    pub cookie_domain: Option<String>,

    /// Initial state of the "remember me" checkbox.
    pub remember: bool,

    /// Disable the automatic login attempt on connect.
    pub no_auto_login: bool,

    /// Log level used when RUST_LOG is not set.
    pub log_level: Option<String>,
}

impl LoginConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_TUBE_PREFIX: &'static str = "casper";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(LoginConfig::default())
        }
    }

    /// Timing parameters shared by every job this component submits.
    pub fn job_options(&self) -> JobOptions {
        JobOptions::from_timeout(self.timeout)
    }

    /// Tube names derived from the configured prefix.
    pub fn tubes(&self) -> TubeNames {
        TubeNames::from_prefix(&self.tube_prefix)
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT_SECS,
            tube_prefix: Self::DEFAULT_TUBE_PREFIX.to_string(),
            cookie_domain: None,
            remember: false,
            no_auto_login: false,
            log_level: None,
        }
    }
}
