//! Handles settings for the application. Configuration is written in
//! `settings.toml`.
//!
//! See `settings.toml` at the repository root for a commented example.
use std::collections::HashMap;

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Disk tier of the fx rate cache. Absent section disables the tier.
#[derive(Debug, Deserialize)]
pub struct FxCache {
    pub path: String,
    #[serde(default = "default_fx_ttl")]
    pub ttl_secs: u64,
}

fn default_fx_ttl() -> u64 {
    engine::DEFAULT_CACHE_TTL_SECS
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub fx_cache: Option<FxCache>,
    /// Participant alias map: spelling variant → canonical name.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        settings.try_deserialize()
    }
}
