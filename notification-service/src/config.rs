//! Notification service configuration, loaded once in `main` and passed
//! down explicitly — no process-wide singletons (§9).

use redstone_common::ConfigError;
use redstone_common::config::{BrokerConfig, env_or};

/// Everything `main` needs to wire up the notification service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Used in log lines and as the default Kafka consumer group id prefix.
    pub service_name: String,
    /// Port the HTTP surface listens on.
    pub http_port: u16,
    /// Broker connection and topic names.
    pub broker: BrokerConfig,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVar`] if `HTTP_PORT` does not parse as
    /// a `u16`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let service_name = env_or("SERVICE_NAME", "notification-service");
        let http_port = env_or("HTTP_PORT", "8084")
            .parse()
            .map_err(|_| ConfigError::InvalidVar {
                var: "HTTP_PORT",
                reason: "must be a valid port number".to_string(),
            })?;
        let broker = BrokerConfig::from_env(&service_name);

        Ok(Self { service_name, http_port, broker })
    }
}
