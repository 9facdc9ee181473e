//! Configuration management for Plaza.
//!
//! Loads configuration from ${PLAZA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `[server].base_url`.
pub const SERVER_URL_ENV: &str = "PLAZA_SERVER_URL";

pub mod paths {
    //! Path resolution for Plaza configuration and data directories.
    //!
    //! PLAZA_HOME resolution order:
    //! 1. PLAZA_HOME environment variable (if set)
    //! 2. ~/.config/plaza (default)

    use std::path::PathBuf;

    /// Returns the Plaza home directory.
    ///
    /// Falls back to `./.plaza` when no home directory can be determined.
    pub fn plaza_home() -> PathBuf {
        if let Ok(home) = std::env::var("PLAZA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".plaza"),
            |h| h.join(".config").join("plaza"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        plaza_home().join("config.toml")
    }

    /// Returns the path to the persisted session (token) store.
    pub fn session_path() -> PathBuf {
        plaza_home().join("session.json")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        plaza_home().join("logs")
    }
}

/// Returns the default config template.
pub fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupConfig {
    /// Quiet period before a username availability check is sent.
    pub username_debounce_ms: u64,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            username_debounce_ms: Config::DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Seconds before a new OTP can be requested.
    pub resend_cooldown_secs: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: Config::DEFAULT_RESEND_COOLDOWN_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub signup: SignupConfig,
    pub otp: OtpConfig,
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";
    pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
    pub const DEFAULT_RESEND_COOLDOWN_SECS: u32 = 60;

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
            Ok(Config::default())
        }
    }

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen value is not a valid URL.
    pub fn base_url(&self) -> Result<String> {
        resolve_base_url(
            std::env::var(SERVER_URL_ENV).ok().as_deref(),
            Some(self.server.base_url.as_str()),
        )
    }

    pub fn username_debounce(&self) -> Duration {
        Duration::from_millis(self.signup.username_debounce_ms)
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Picks the first non-blank candidate (env, then config), else the default.
fn resolve_base_url(env_url: Option<&str>, config_url: Option<&str>) -> Result<String> {
    let chosen = [env_url, config_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(Config::DEFAULT_BASE_URL);

    url::Url::parse(chosen).with_context(|| format!("Invalid server base URL: {chosen}"))?;
    Ok(chosen.to_string())
}
