//! Configuration for the presence watcher.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for the presence watcher.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    pub renderer: RendererConfig,
}

/// Gateway connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// WebSocket URL of the presence gateway.
    pub url: String,
    /// Credential presented in the identify handshake.
    pub credential: String,
    /// Base delay for reconnect backoff.
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,
    /// Upper bound for reconnect backoff.
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_secs: u64,
}

/// The fixed watch-list: which entities and groups this process tracks.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatchConfig {
    /// Watched entity ids mapped to their display names.
    #[serde(default)]
    pub entities: HashMap<String, String>,
    /// Group ids whose member lists are watched.
    /// Example: { "group-id" = true }
    #[serde(default)]
    pub groups: HashMap<String, bool>,
}

/// External renderer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Program invoked with `set <name>,<color>,<headline>` on every change.
    pub command: String,
}

// Default values
fn default_backoff_base() -> u64 {
    1
}
fn default_backoff_cap() -> u64 {
    60
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (PRESENCE__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("gateway.backoff_base_secs", default_backoff_base() as i64)?
            .set_default("gateway.backoff_cap_secs", default_backoff_cap() as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("PRESENCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
