//! Process configuration, read once from the environment at startup.

use std::time::Duration;

use thiserror::Error;

use doorsales_infra::DbSettings;
use doorsales_observability::LogFormat;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FRONTEND_ORIGINS: &[&str] = &["http://localhost:4200", "http://109.196.100.71"];
const FALLBACK_FRONTEND_ORIGIN: &str = "http://localhost:4200";
pub const DEFAULT_JWT_TTL_HOURS: i64 = 24;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

const REQUIRED: &[&str] = &["DB_HOST", "DB_PORT", "DB_USER", "DB_NAME", "JWT_SECRET"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub db: DbSettings,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub frontend_origins: Vec<String>,
    pub shutdown_grace: Duration,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("db", &self.db)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .field("frontend_origins", &self.frontend_origins)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |key: &'static str| get(key).ok_or_else(|| ConfigError::Missing(vec![key]));

        let db = DbSettings {
            host: required("DB_HOST")?,
            port: parse_port("DB_PORT", &required("DB_PORT")?)?,
            user: required("DB_USER")?,
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            database: required("DB_NAME")?,
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?,
        };

        let port = match get("PORT") {
            Some(raw) => parse_port("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let ttl_hours: i64 = parse_or("JWT_TTL_HOURS", get("JWT_TTL_HOURS"), DEFAULT_JWT_TTL_HOURS)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_TTL_HOURS",
                value: ttl_hours.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let grace_secs: u64 = parse_or("SHUTDOWN_GRACE_SECS", get("SHUTDOWN_GRACE_SECS"), DEFAULT_SHUTDOWN_GRACE_SECS)?;

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| {
                ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            port,
            db,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl: chrono::Duration::hours(ttl_hours),
            frontend_origins: parse_origins(lookup("FRONTEND_ORIGINS").as_deref()),
            shutdown_grace: Duration::from_secs(grace_secs),
            log_format,
        })
    }
}

fn parse_port(var: &'static str, raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected a port number between 1 and 65535".to_string(),
        }),
        Ok(port) => Ok(port),
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Comma-separated list; blanks dropped.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return DEFAULT_FRONTEND_ORIGINS.iter().map(|o| o.to_string()).collect();
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec![FALLBACK_FRONTEND_ORIGIN.to_string()]
    } else {
        origins
    }
}
