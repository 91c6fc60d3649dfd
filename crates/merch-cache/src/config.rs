//! # Cache Configuration
//!
//! Configuration for the offline cache: the maximum total size and the
//! periodic sweep interval, both externally overridable.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MERCH_CACHE_MAX_BYTES=10485760                                     │
//! │     MERCH_CACHE_SWEEP_DAYS=3                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/merchstand/cache.toml (Linux)                            │
//! │     ~/Library/Application Support/com.merchstand.merch/cache.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     max_total_bytes = 50 MB, sweep_interval_days = 7                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cache.toml
//! max_total_bytes = 52428800
//! sweep_interval_days = 7
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};

// =============================================================================
// Defaults
// =============================================================================

/// Default cache size bound: 50 MB.
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 50 * 1024 * 1024;

/// Default sweep interval: 7 days since the last cleanup.
pub const DEFAULT_SWEEP_INTERVAL_DAYS: i64 = 7;

fn default_max_total_bytes() -> u64 {
    DEFAULT_MAX_TOTAL_BYTES
}

fn default_sweep_interval_days() -> i64 {
    DEFAULT_SWEEP_INTERVAL_DAYS
}

// =============================================================================
// Cache Configuration
// =============================================================================

/// Offline cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum running byte estimate before cleanup triggers.
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,

    /// Days between periodic sweeps.
    #[serde(default = "default_sweep_interval_days")]
    pub sweep_interval_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_total_bytes: default_max_total_bytes(),
            sweep_interval_days: default_sweep_interval_days(),
        }
    }
}

impl CacheConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`cache.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CacheResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cache config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)
                    .map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
            } else {
                debug!(?path, "Cache config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if the load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cache config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CacheResult<()> {
        if self.max_total_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_total_bytes must be greater than 0".into(),
            ));
        }

        if self.sweep_interval_days <= 0 {
            return Err(CacheError::InvalidConfig(
                "sweep_interval_days must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// The sweep interval as a chrono duration.
    pub fn sweep_interval(&self) -> chrono::Duration {
        chrono::Duration::days(self.sweep_interval_days)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(bytes) = std::env::var("MERCH_CACHE_MAX_BYTES") {
            if let Ok(parsed) = bytes.parse::<u64>() {
                debug!(max_total_bytes = parsed, "Overriding cache size bound from environment");
                self.max_total_bytes = parsed;
            }
        }

        if let Ok(days) = std::env::var("MERCH_CACHE_SWEEP_DAYS") {
            if let Ok(parsed) = days.parse::<i64>() {
                debug!(sweep_interval_days = parsed, "Overriding sweep interval from environment");
                self.sweep_interval_days = parsed;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "merchstand", "merch")
            .map(|dirs| dirs.config_dir().join("cache.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
