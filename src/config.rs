//! Service configuration read from the environment (after `.env` is loaded).
//!
//! | Variable | Default |
//! |---|---|
//! | `STOREFRONT_HOST` | `0.0.0.0` |
//! | `STOREFRONT_PORT` | `3000` |
//! | `DATABASE_URL` | unset: in-memory store |
//! | `CART_STORAGE_DIR` | `data/carts` |
//! | `CHECKOUT_WEBHOOK_URL` | unset: notifications skipped |
//! | `CHAT_WEBHOOK_URL` | unset: fallback replies only |
//! | `WEBHOOK_MAX_ATTEMPTS` | `3` |
//! | `WEBHOOK_RETRY_BACKOFF_MS` | `500` |
//! | `ADMIN_API_TOKEN` | unset: admin routes refuse every request |

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use thiserror::Error;

use crate::api::ApiUrls;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct WebhookPolicy {
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for WebhookPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub cart_storage_dir: PathBuf,
    pub api_urls: ApiUrls,
    pub webhook_policy: WebhookPolicy,
    pub admin_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("cart_storage_dir", &self.cart_storage_dir)
            .field("api_urls", &self.api_urls)
            .field("webhook_policy", &self.webhook_policy)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Loads configuration from the process environment.
pub fn load() -> Result<Config, ConfigError> {
    Config::from_lookup(|key| std::env::var(key).ok())
}

impl Config {
    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let defaults = WebhookPolicy::default();
        let max_attempts = parse_or(&get, "WEBHOOK_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "WEBHOOK_MAX_ATTEMPTS",
                "must be at least 1".into(),
            ));
        }
        let backoff_ms = parse_or(
            &get,
            "WEBHOOK_RETRY_BACKOFF_MS",
            u64::try_from(defaults.retry_backoff.as_millis()).unwrap_or(500),
        )?;

        Ok(Self {
            server: ServerConfig {
                host: parse_or(&get, "STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
                port: parse_or(&get, "STOREFRONT_PORT", 3000)?,
            },
            database: get("DATABASE_URL").map(|url| DatabaseConfig { url }),
            cart_storage_dir: get("CART_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/carts")),
            api_urls: ApiUrls {
                checkout_webhook_url: get("CHECKOUT_WEBHOOK_URL"),
                chat_webhook_url: get("CHAT_WEBHOOK_URL"),
            },
            webhook_policy: WebhookPolicy {
                max_attempts,
                retry_backoff: Duration::from_millis(backoff_ms),
            },
            admin_token: get("ADMIN_API_TOKEN"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidEnvVar(key, err.to_string())),
        None => Ok(default),
    }
}
