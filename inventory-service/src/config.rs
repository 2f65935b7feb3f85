//! Inventory service configuration, loaded once in `main` and passed down
//! explicitly — no process-wide singletons (§9 "Global mutable state").

use redstone_common::ConfigError;
use redstone_common::config::{BrokerConfig, env_or, require_env};

/// Everything `main` needs to wire up the inventory service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Used in log lines and as the default Kafka consumer group id.
    pub service_name: String,
    /// Port the HTTP stock-read endpoint listens on.
    pub http_port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// Broker connection and topic names.
    pub broker: BrokerConfig,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] if `DATABASE_URL` is unset, or
    /// [`ConfigError::InvalidVar`] if `HTTP_PORT` does not parse as a `u16`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let service_name = env_or("SERVICE_NAME", "inventory-service");
        let http_port = env_or("HTTP_PORT", "8082")
            .parse()
            .map_err(|_| ConfigError::InvalidVar {
                var: "HTTP_PORT",
                reason: "must be a valid port number".to_string(),
            })?;
        let database_url = require_env("DATABASE_URL")?;
        let broker = BrokerConfig::from_env(&service_name);

        Ok(Self {
            service_name,
            http_port,
            database_url,
            broker,
        })
    }
}
