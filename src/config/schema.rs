//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! backend. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, timeouts).
    pub listener: ListenerConfig,

    /// Optional shared API key. When set, every endpoint requires the
    /// `x-api-key` header to match.
    pub api_key: Option<String>,

    /// Publish/subscribe notifier settings.
    pub notifier: NotifierConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g. "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Notifier credentials and endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Enable publishing. Disabled means messages are dropped locally.
    pub enabled: bool,

    /// Base URL of the pub/sub service.
    pub endpoint: String,

    /// Key authorizing publishes.
    pub publish_key: String,

    /// Key identifying the subscriber keyset.
    pub subscribe_key: String,

    /// Secret key for the keyset.
    pub secret_key: String,

    /// Channel journey-start messages are published on.
    pub channel: String,

    /// Per-publish request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            publish_key: String::new(),
            subscribe_key: String::new(),
            secret_key: String::new(),
            channel: "journeys".to_string(),
            timeout_secs: 5,
        }
    }
}
