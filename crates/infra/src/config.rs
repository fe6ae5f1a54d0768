//! Configuration loading and representation.
//!
//! Everything comes from the environment; unset variables take defaults,
//! malformed ones are errors.

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Log output format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("expected json or pretty, got {other}")),
        }
    }
}

/// Postgres connection settings, present only when persistent stores are on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub log_level: String,
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:9090";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "SHAREIT_BIND_ADDR", Self::DEFAULT_BIND_ADDR)?;
        let log_format = parse_or(&lookup, "SHAREIT_LOG_FORMAT", "json")?;
        let log_level = lookup("SHAREIT_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let persistent: bool = parse_or(&lookup, "USE_PERSISTENT_STORES", "false")?;
        let database = if persistent {
            let url = lookup("DATABASE_URL")
                .filter(|u| !u.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = parse_or(
                &lookup,
                "SHAREIT_DB_MAX_CONNECTIONS",
                &Self::DEFAULT_MAX_CONNECTIONS.to_string(),
            )?;
            Some(DatabaseConfig {
                url,
                max_connections,
            })
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            log_format,
            log_level,
            database,
        })
    }
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var).unwrap_or_else(|| default.to_string());
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        value: value.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 9090);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.database.is_none());
    }

    #[test]
    fn persistent_stores_require_database_url() {
        let err = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn persistent_stores_read_pool_settings() {
        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/shareit"),
            ("SHAREIT_DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        let db = cfg.database.unwrap();
        assert_eq!(db.url, "postgres://localhost/shareit");
        assert_eq!(db.max_connections, 12);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            config(&[("SHAREIT_BIND_ADDR", "not-an-addr")]),
            Err(ConfigError::Invalid { var: "SHAREIT_BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("SHAREIT_LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { var: "SHAREIT_LOG_FORMAT", .. })
        ));
        assert!(matches!(
            config(&[("USE_PERSISTENT_STORES", "yes")]),
            Err(ConfigError::Invalid { var: "USE_PERSISTENT_STORES", .. })
        ));
    }

    #[test]
    fn log_format_is_case_insensitive() {
        let cfg = config(&[("SHAREIT_LOG_FORMAT", "Pretty")]).unwrap();
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }
}
