//! # Configuration State
//!
//! Shop settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`MALIGAI_*`)
//! 2. Config file (`maligai.toml`, or `--config <PATH>`)
//! 3. Defaults (this file)
//!
//! ## Example `maligai.toml`
//! ```toml
//! shop_name = "Balu Maligai"
//! currency_symbol = "₹"
//! scan_confirm_delay_ms = 2000
//! scan_timeout_secs = 120
//! seed_sample_catalog = true
//! ```
//!
//! Configuration is read-only after loading.

use chrono::{FixedOffset, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "maligai.toml";

/// Database file name inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "maligai.db";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Shop name (receipts, payment codes, share text)
    pub shop_name: String,

    /// Line printed under the shop name on receipts
    pub shop_tagline: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Pause after a verified scan before the sale is committed
    pub scan_confirm_delay_ms: u64,

    /// Give up on a scan session after this long
    pub scan_timeout_secs: u64,

    /// Fill an empty catalog with the sample shelf on startup
    pub seed_sample_catalog: bool,

    /// Offset used for month buckets and printed dates, in minutes east of
    /// UTC. `None` follows the machine's local offset.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            shop_name: "Balu Maligai".to_string(),
            shop_tagline: "Local Grocery & Vegetables Shop".to_string(),
            currency_symbol: "₹".to_string(),
            database_path: None,
            scan_confirm_delay_ms: 2000,
            scan_timeout_secs: 120,
            seed_sample_catalog: true,
            utc_offset_minutes: None,
        }
    }
}

impl ConfigState {
    /// Loads configuration: defaults, then the file (if it exists), then
    /// environment overrides, then validation.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks values that would make the counter misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shop_name.trim().is_empty() {
            return Err(ConfigError::Invalid("shop_name must not be empty".to_string()));
        }
        if self.scan_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "scan_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if FixedOffset::east_opt(minutes * 60).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "utc_offset_minutes {} is out of range",
                    minutes
                )));
            }
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `MALIGAI_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("MALIGAI_SHOP_NAME") {
            debug!(shop_name = %name, "Overriding shop name from environment");
            self.shop_name = name;
        }

        if let Some(symbol) = lookup("MALIGAI_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(path) = lookup("MALIGAI_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(delay) = lookup("MALIGAI_SCAN_CONFIRM_DELAY_MS") {
            if let Ok(ms) = delay.parse() {
                self.scan_confirm_delay_ms = ms;
            }
        }

        if let Some(timeout) = lookup("MALIGAI_SCAN_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.scan_timeout_secs = secs;
            }
        }

        if let Some(seed) = lookup("MALIGAI_SEED_SAMPLE_CATALOG") {
            if let Ok(flag) = seed.parse() {
                self.seed_sample_catalog = flag;
            }
        }

        if let Some(offset) = lookup("MALIGAI_UTC_OFFSET_MINUTES") {
            if let Ok(minutes) = offset.parse() {
                self.utc_offset_minutes = Some(minutes);
            }
        }
    }

    /// `maligai.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "maligai", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Determines the database file path.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.maligai.pos/maligai.db`
    /// - **Windows**: `%APPDATA%\maligai\pos\data\maligai.db`
    /// - **Linux**: `~/.local/share/pos/maligai.db`
    ///
    /// An explicit `database_path` wins. The data directory is created if
    /// it does not exist yet.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("com", "maligai", "pos").ok_or_else(|| {
            ConfigError::Invalid("Could not determine app data directory".to_string())
        })?;

        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    pub fn scan_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.scan_confirm_delay_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    /// Offset for month buckets and printed dates.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| *Local::now().offset())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.scan_confirm_delay(), Duration::from_secs(2));
        assert_eq!(config.scan_timeout(), Duration::from_secs(120));
        assert!(config.seed_sample_catalog);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "shop_name = \"Meena Stores\"\nscan_timeout_secs = 30\nutc_offset_minutes = 330\n",
        )
        .unwrap();

        let config = ConfigState::from_file(&path).unwrap();
        assert_eq!(config.shop_name, "Meena Stores");
        assert_eq!(config.scan_timeout_secs, 30);
        assert_eq!(config.scan_confirm_delay_ms, 2000);
        assert_eq!(config.utc_offset().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "scan_timeout_secs = \"soon\"").unwrap();

        assert!(matches!(
            ConfigState::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MALIGAI_SHOP_NAME", "Corner Shop"),
            ("MALIGAI_DB_PATH", "/tmp/corner.db"),
            ("MALIGAI_SCAN_TIMEOUT_SECS", "not a number"),
            ("MALIGAI_SEED_SAMPLE_CATALOG", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigState::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.shop_name, "Corner Shop");
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/corner.db")));
        assert_eq!(config.scan_timeout_secs, 120);
        assert!(!config.seed_sample_catalog);
    }

    #[test]
    fn test_validation() {
        let config = ConfigState {
            scan_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ConfigState {
            utc_offset_minutes: Some(24 * 60),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let config = ConfigState {
            database_path: Some(PathBuf::from("shop.db")),
            ..Default::default()
        };
        assert_eq!(config.resolve_database_path().unwrap(), PathBuf::from("shop.db"));
    }
}
