//! # configs
//!
//! Layered settings for the chainforum binary: built-in defaults, then an
//! optional `chainforum.toml`, then `CHAINFORUM__*` environment variables
//! (`CHAINFORUM__SERVER__PORT=9000`). A `.env` file is loaded first so its
//! entries count as environment.

use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CHAINFORUM";
pub const CONFIG_FILE: &str = "chainforum";
/// `ledger.url` value that selects the in-process ledger.
pub const MEMORY_LEDGER: &str = "memory";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerSettings {
    /// An sqlx SQLite URL, or `memory`.
    pub url: String,
}

impl LedgerSettings {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_LEDGER
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElectionSettings {
    /// Delay between scheduling a community and its first election.
    pub initial_delay_secs: u64,
    pub period_secs: u64,
}

impl ElectionSettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    /// env_logger filter directive, e.g. `info` or `cf_contract=debug`.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub ledger: LedgerSettings,
    pub election: ElectionSettings,
    pub log: LogSettings,
}

fn with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
    Ok(Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("ledger.url", "sqlite:chainforum.db")?
        .set_default("election.initial_delay_secs", 600)?
        .set_default("election.period_secs", 7_776_000)?
        .set_default("log.filter", "info")?)
}

impl Settings {
    /// Reads `.env`, `chainforum.toml` (if present) and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        let raw = with_defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::finish(raw)
    }

    /// Defaults overlaid with a TOML document; no file or environment access.
    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        let raw = with_defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(raw)
    }

    fn finish(raw: Config) -> Result<Self, SettingsError> {
        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.ledger.url.trim().is_empty() {
            return Err(SettingsError::Invalid { key: "ledger.url", reason: "must not be empty".into() });
        }
        if self.election.period_secs == 0 {
            return Err(SettingsError::Invalid {
                key: "election.period_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
