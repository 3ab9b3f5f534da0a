//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOGO_BUCKET: &str = "company-logos";
pub const DEFAULT_STORAGE_ROOT: &str = "./storage";
/// Draft sessions untouched for this long are discarded.
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{key} must be set when {because}")]
    Missing {
        key: &'static str,
        because: &'static str,
    },
}

/// Which record stores back the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// Process-local stores, optionally seeded with package rows from a JSON file.
    InMemory { packages_seed: Option<PathBuf> },
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub persistence: Persistence,
    pub logo_bucket: String,
    pub storage_root: PathBuf,
    pub session_idle_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            message: format!("'{bind_raw}': {e}"),
        })?;

        let persistent = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                message: format!("expected true/false, got '{raw}'"),
            })?,
        };

        let persistence = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing {
                key: "DATABASE_URL",
                because: "USE_PERSISTENT_STORES is true",
            })?;
            Persistence::Postgres { database_url }
        } else {
            Persistence::InMemory {
                packages_seed: get("PACKAGES_SEED_FILE").map(PathBuf::from),
            }
        };

        let session_idle_ttl = match get("SESSION_IDLE_TTL_SECS") {
            None => Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_IDLE_TTL_SECS",
                        message: format!("expected a positive number of seconds, got '{raw}'"),
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            persistence,
            logo_bucket: get("LOGO_BUCKET").unwrap_or_else(|| DEFAULT_LOGO_BUCKET.to_string()),
            storage_root: get("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT)),
            session_idle_ttl,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
