//! Application configuration.
//!
//! Settings come from `config/config.toml` (optional) and `COURTSIDE__*` environment
//! variables, e.g. `COURTSIDE__DATABASE__URL` or `COURTSIDE__SERVER__HOST_PORT`. Every
//! key has a default, so an empty environment yields a runnable development setup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use crate::pool::config::DatabaseConfig;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "COURTSIDE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host_port")]
    pub host_port: String,
    /// `may` worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host_port: default_host_port(),
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Key that signs session tokens.
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

fn default_host_port() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_token_secret() -> String {
    "courtside-development-secret".to_string()
}

fn default_token_ttl_seconds() -> i64 {
    7 * 24 * 60 * 60
}

impl AppConfig {
    /// Load from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        Self::from_settings(&settings)
    }

    /// Deserialize an already built [`Config`].
    pub fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        settings.clone().try_deserialize::<AppConfig>().map_err(|e| {
            ConfigError::Message(format!(
                "Configuration could not be loaded from file or environment: {e}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let settings = Config::builder().build().unwrap();
        let config = AppConfig::from_settings(&settings).unwrap();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.pool_timeout_seconds, 30);
        assert_eq!(config.server.host_port, "0.0.0.0:8000");
        assert!(config.server.workers >= 1);
        assert_eq!(config.auth.token_ttl_seconds, 604_800);
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Config::builder()
            .set_override("database.url", "postgres://u:p@db:5432/courtside")
            .unwrap()
            .set_override("database.max_connections", 3)
            .unwrap()
            .set_override("server.host_port", "127.0.0.1:9000")
            .unwrap()
            .set_override("auth.token_secret", "s3cret")
            .unwrap()
            .build()
            .unwrap();
        let config = AppConfig::from_settings(&settings).unwrap();
        assert_eq!(config.database.url, "postgres://u:p@db:5432/courtside");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.server.host_port, "127.0.0.1:9000");
        assert_eq!(config.auth.token_secret, "s3cret");
    }
}
