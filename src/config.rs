use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub write_conflict_retries: u32,
    pub write_conflict_backoff: Duration,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`Config::from_env`], but uses `database_url` when `DATABASE_URL`
    /// is unset. Malformed values in the other variables are still errors.
    pub fn from_env_or_database(database_url: &str) -> Result<Self, AppError> {
        Self::from_lookup(|name| match name {
            "DATABASE_URL" => env::var(name).ok().or_else(|| Some(database_url.to_string())),
            _ => env::var(name).ok(),
        })
    }

    /// Defaults for a given database, used by tests and tooling.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            write_conflict_retries: 5,
            write_conflict_backoff: Duration::from_millis(10),
            log_dir: "./logs".to_string(),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| AppError::Configuration("DATABASE_URL must be set".into()))?,
            max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            write_conflict_retries: parse_var(&lookup, "WRITE_CONFLICT_RETRIES", 5)?,
            write_conflict_backoff: Duration::from_millis(parse_var(&lookup, "WRITE_CONFLICT_BACKOFF_MS", 10)?),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string()),
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} must be a number, got {:?}", name, raw))),
        None => Ok(default),
    }
}
