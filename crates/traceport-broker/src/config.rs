//! Broker connection configuration

use std::time::Duration;

/// MQTT connection settings for the telemetry subscriber
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// First topic segment; the subscriber listens on
    /// `<namespace>/operational_data/#`
    pub namespace: String,
    pub keep_alive: Duration,
    /// Fixed delay before rebuilding a failed connection
    pub reconnect_delay: Duration,
    /// Prefix for the per-session client id
    pub client_id_prefix: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            namespace: "dpp".to_string(),
            keep_alive: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(5),
            client_id_prefix: "traceport".to_string(),
        }
    }
}

impl BrokerConfig {
    /// Defaults overridden by TRACEPORT_MQTT_HOST, TRACEPORT_MQTT_PORT,
    /// and TRACEPORT_MQTT_NAMESPACE where set. An unparseable port keeps
    /// the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("TRACEPORT_MQTT_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("TRACEPORT_MQTT_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(namespace) = std::env::var("TRACEPORT_MQTT_NAMESPACE") {
            config.namespace = namespace;
        }
        config
    }

    /// Subscription filter covering all product telemetry in the namespace
    pub fn subscription_topic(&self) -> String {
        format!("{}/operational_data/#", self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrokerConfig::default();
        assert_eq!(config.port, 1883);
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.subscription_topic(), "dpp/operational_data/#");
    }
}
