use std::{str::FromStr, time::Duration};

use derive_more::Display;

/// Longest lifetime a note may be configured with: 100 years.
const MAX_LIFETIME_SECS: u64 = 100 * 365 * 24 * 60 * 60;

const POSITIVE: &str = "must be positive";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    Uuid,
    NanoId,
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum ConfigError {
    #[display(fmt = "env {} has an invalid value: '{}'", _0, _1)]
    Invalid(&'static str, String),
    #[display(fmt = "env {} is out of range: {}", _0, _1)]
    OutOfRange(&'static str, &'static str),
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub note_lifetime: Duration,
    pub store_timeout: Duration,
    pub cleanup_interval: Duration,
    pub id_format: IdFormat,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse(&var, "PORT", 3000)?;
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let lifetime_secs: u64 = parse(&var, "NOTE_LIFETIME_SECS", 60 * 60 * 24 * 365)?;
        if lifetime_secs == 0 || lifetime_secs > MAX_LIFETIME_SECS {
            return Err(ConfigError::OutOfRange(
                "NOTE_LIFETIME_SECS",
                "must be between 1 second and 100 years",
            ));
        }

        let timeout_ms: u64 = parse(&var, "STORE_TIMEOUT_MS", 5000)?;
        if timeout_ms == 0 {
            return Err(ConfigError::OutOfRange("STORE_TIMEOUT_MS", POSITIVE));
        }

        let interval_secs: u64 = parse(&var, "CLEANUP_INTERVAL", 2700)?;
        if interval_secs == 0 {
            return Err(ConfigError::OutOfRange("CLEANUP_INTERVAL", POSITIVE));
        }

        let rate_limit_burst: u32 = parse(&var, "RATE_LIMIT_BURST", 120)?;
        if rate_limit_burst == 0 {
            return Err(ConfigError::OutOfRange("RATE_LIMIT_BURST", POSITIVE));
        }

        let id_format = match var("ID_FORMAT").as_deref() {
            None | Some("uuid") => IdFormat::Uuid,
            Some("nanoid") => IdFormat::NanoId,
            Some(other) => return Err(ConfigError::Invalid("ID_FORMAT", other.to_string())),
        };

        Ok(Config {
            host,
            port,
            base_url,
            database_url: var("DATABASE_URL"),
            note_lifetime: Duration::from_secs(lifetime_secs),
            store_timeout: Duration::from_millis(timeout_ms),
            cleanup_interval: Duration::from_secs(interval_secs),
            id_format,
            rate_limit_burst,
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}
