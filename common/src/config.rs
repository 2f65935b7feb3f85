//! Environment-variable configuration, shared shape across all four
//! services (§6 "Environment variables").
//!
//! Grounded on `original_source`'s `env()`/`parseCSV()` helpers, but
//! expressed as a fallible constructor rather than an inline
//! log-and-exit, so each service's `main` decides how to report the
//! failure (always: log at `error` level and exit non-zero, per §7 "Fatal
//! startup errors").

use crate::error::ConfigError;

/// Read an environment variable, trimming whitespace, falling back to
/// `default` when unset or empty.
#[must_use]
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a required environment variable, trimming whitespace.
///
/// # Errors
///
/// Returns [`ConfigError::MissingVar`] if the variable is unset or empty
/// after trimming.
pub fn require_env(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(key))
}

/// Split a comma-separated environment value into trimmed, non-empty parts.
///
/// Used for `KAFKA_BROKERS`.
#[must_use]
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Kafka topic names, identical across every service per §6.
#[derive(Debug, Clone)]
pub struct Topics {
    /// `KAFKA_TOPIC_ORDERS`
    pub orders: String,
    /// `KAFKA_TOPIC_INVENTORY`
    pub inventory: String,
    /// `KAFKA_TOPIC_PAYMENTS`
    pub payments: String,
    /// `KAFKA_TOPIC_NOTIFICATIONS`
    ///
    /// No service currently publishes to this topic (notification fan-out is
    /// a log sink, not a producer); it is read from the environment for
    /// parity with the source system's configuration surface and to leave
    /// the door open for a future real notification transport.
    pub notifications: String,
}

impl Topics {
    /// Load topic names from the environment, applying the `redstone.*`
    /// defaults used throughout local development and the test scenarios.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            orders: env_or("KAFKA_TOPIC_ORDERS", "redstone.orders"),
            inventory: env_or("KAFKA_TOPIC_INVENTORY", "redstone.inventory"),
            payments: env_or("KAFKA_TOPIC_PAYMENTS", "redstone.payments"),
            notifications: env_or("KAFKA_TOPIC_NOTIFICATIONS", "redstone.notifications"),
        }
    }
}

/// Broker connection details shared by every service.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Bootstrap server list, already split on commas.
    pub brokers: Vec<String>,
    /// Consumer group id for this service's subscriptions.
    pub group_id: String,
    /// Topic names.
    pub topics: Topics,
}

impl BrokerConfig {
    /// Load broker configuration from the environment.
    #[must_use]
    pub fn from_env(default_group_id: &str) -> Self {
        Self {
            brokers: parse_csv(&env_or("KAFKA_BROKERS", "localhost:9092")),
            group_id: env_or("KAFKA_GROUP_ID", default_group_id),
            topics: Topics::from_env(),
        }
    }

    /// Bootstrap servers joined back into the comma-separated form `rdkafka`
    /// expects for `bootstrap.servers`.
    #[must_use]
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_trims_and_drops_empties() {
        assert_eq!(
            parse_csv(" a, b ,,c "),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn env_or_falls_back_when_unset() {
        assert_eq!(env_or("REDSTONE_DEFINITELY_UNSET_VAR", "fallback"), "fallback");
    }
}
