//! Configuration schema definitions.
//!
//! The on-disk format is a JSON object whose only required fields are
//! `port` and `urls`. Every other section has defaults so the minimal
//! `{"port": "3000", "urls": ["http://127.0.0.1:8081"]}` is a complete config.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Port used when the config leaves `port` empty.
pub const DEFAULT_PORT: &str = "3000";

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    /// Port the balancer listens on for client traffic.
    pub port: String,

    /// Backend URLs in rotation order.
    pub urls: Vec<String>,

    /// Listener configuration (bind host, body limit).
    pub listener: ListenerConfig,

    /// Active health check settings.
    pub health_check: HealthCheckConfig,

    /// Retry and failover budget.
    pub retries: RetryConfig,

    /// Upstream timeouts.
    pub timeouts: TimeoutConfig,

    /// Admin surface (config reload, pool inspection).
    pub admin: AdminConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            urls: Vec::new(),
            listener: ListenerConfig::default(),
            health_check: HealthCheckConfig::default(),
            retries: RetryConfig::default(),
            timeouts: TimeoutConfig::default(),
            admin: AdminConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl BalancerConfig {
    /// Address the client-facing listener binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Largest request body buffered for replay on retry, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Per-backend probe timeout in seconds.
    pub timeout_secs: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 2,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Same-backend retries before the backend is marked down.
    pub max_retries: u32,

    /// Backend selections allowed for one client request.
    pub max_attempts: u32,

    /// Fixed pause before each same-backend retry, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_attempts: 3,
            backoff_ms: 10,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the upstream to return response headers, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// Admin listener bind address.
    pub bind_address: String,

    /// Bearer token required by the admin API. `None` leaves it open.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:3001".to_string(),
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_defaults() {
        let config: BalancerConfig = serde_json::from_str(
            r#"{"port": "8080", "urls": ["http://127.0.0.1:9001", "http://127.0.0.1:9002"]}"#,
        )
        .unwrap();

        assert_eq!(config.port, "8080");
        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.retries, RetryConfig::default());
        assert_eq!(config.health_check.interval(), Duration::from_secs(10));
        assert_eq!(config.listen_address(), "0.0.0.0:8080");
    }

    #[test]
    fn nested_sections_override_defaults() {
        let config: BalancerConfig = serde_json::from_str(
            r#"{
                "port": "8080",
                "urls": [],
                "retries": {"backoff_ms": 50},
                "admin": {"api_key": "secret"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.retries.backoff_ms, 50);
        assert_eq!(config.retries.max_retries, 3);
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));
        assert_eq!(config.admin.bind_address, "127.0.0.1:3001");
    }
}
