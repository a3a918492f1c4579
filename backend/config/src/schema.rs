//! Shaman configuration schema.
//!
//! Typed for serde YAML/JSON deserialization; every section and field has a
//! default so a partial (or missing) file is valid.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShamanConfig {
    /// Relay server settings
    pub relay: RelayConfig,
    /// Turn controller settings
    pub client: ClientConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// The stateless forwarder between the client and the model provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    pub bind_address: String,
    pub port: u16,
    /// Path the relay handler is mounted on.
    pub route: String,
    /// Chat-completions endpoint of the model provider.
    pub upstream_url: String,
    /// Credential injected as `Authorization: Bearer ...`. Not validated.
    pub api_key: String,
    /// Sent as `HTTP-Referer`.
    pub referer: String,
    /// Sent as `X-Title`.
    pub title: String,
}

/// How the client composes turns and where it sends them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Full URL of the relay route.
    pub relay_url: String,
    pub model: String,
    pub temperature: f64,
    pub assistant_name: String,
    /// Appended to the system prompt as "Reply in <language>." when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::DEFAULT_BIND_ADDRESS.to_string(),
            port: defaults::DEFAULT_PORT,
            route: defaults::DEFAULT_RELAY_ROUTE.to_string(),
            upstream_url: defaults::DEFAULT_UPSTREAM_URL.to_string(),
            api_key: String::new(),
            referer: defaults::DEFAULT_REFERER.to_string(),
            title: defaults::DEFAULT_TITLE.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: defaults::default_relay_url(),
            model: defaults::DEFAULT_MODEL.to_string(),
            temperature: defaults::DEFAULT_TEMPERATURE,
            assistant_name: defaults::DEFAULT_ASSISTANT_NAME.to_string(),
            reply_language: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            dir: defaults::default_log_dir(),
        }
    }
}
