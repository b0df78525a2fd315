use std::str::FromStr;

use log::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024;
pub const DEFAULT_UPLOAD_LIMIT: usize = 32 * 1024 * 1024;

/// Request size limits shared with the route handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub json_bytes: usize,
    pub upload_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            json_bytes: DEFAULT_JSON_LIMIT,
            upload_bytes: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub limits: Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: num_cpus::get(),
            limits: Limits::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `WORKERS`, `MAX_JSON_BYTES` and `MAX_UPLOAD_BYTES`.
    /// Only bind address, worker count and body limits are tunable; endpoint
    /// constants and thresholds are not.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or("PORT", &lookup, defaults.port),
            workers: parse_or("WORKERS", &lookup, defaults.workers).max(1),
            limits: Limits {
                json_bytes: parse_or("MAX_JSON_BYTES", &lookup, defaults.limits.json_bytes),
                upload_bytes: parse_or("MAX_UPLOAD_BYTES", &lookup, defaults.limits.upload_bytes),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {key}={raw:?}, using {default}");
            default
        }),
        None => default,
    }
}
