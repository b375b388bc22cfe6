//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `rfid-sink.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - ServerConfig: where to listen (all interfaces, port 5000).
//!     - HistoryConfig: how many reads to keep.
//!     - LoggingConfig: log level and whether each read is echoed.
//!
//! every field has a default, so a partial file is fine.
//!
//! ==============================================================================

use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::event_log::DEFAULT_CAPACITY;

/// env var pointing at an explicit config file
pub const CONFIG_ENV: &str = "RFID_SINK_CONFIG";

/// root configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SinkConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub show_readings: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: default_capacity() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), show_readings: true }
    }
}

impl ServerConfig {
    /// socket address to bind
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// result of `SinkConfig::load_or_default`
///
/// logging is not up yet when the config is read (the level lives in the
/// config), so anything worth reporting is collected here for main.rs.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: SinkConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl SinkConfig {
    /// parse a toml document
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;
        Self::from_toml(&content)
    }

    /// fix values that would make the service misbehave, returning what changed
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.history.capacity == 0 {
            warnings.push(format!(
                "history.capacity = 0 is not allowed, using {}",
                DEFAULT_CAPACITY
            ));
            self.history.capacity = DEFAULT_CAPACITY;
        }
        warnings
    }

    /// load with default fallback
    ///
    /// `$RFID_SINK_CONFIG` first, then config/rfid-sink.toml in the working
    /// directory or its parent. never fails.
    pub fn load_or_default() -> LoadedConfig {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("config").join("rfid-sink.toml"));
        paths.push(PathBuf::from("..").join("config").join("rfid-sink.toml"));

        let mut warnings = Vec::new();
        for path in &paths {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(mut config) => {
                    warnings.extend(config.sanitize());
                    return LoadedConfig { config, source: Some(path.clone()), warnings };
                }
                Err(e) => warnings.push(format!("Failed to load {}: {:#}", path.display(), e)),
            }
        }

        warnings.push("No config file found - using defaults".to_string());
        LoadedConfig { config: Self::default(), source: None, warnings }
    }

    /// log the configuration summary
    pub fn log_summary(&self) {
        tracing::info!(
            host = %self.server.host,
            port = self.server.port,
            capacity = self.history.capacity,
            level = %self.logging.level,
            show_readings = self.logging.show_readings,
            "[CONFIG] active configuration"
        );
    }
}
