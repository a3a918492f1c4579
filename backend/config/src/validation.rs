//! Config validation with user-friendly messages.

use crate::schema::ShamanConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ShamanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_relay(config, &mut report);
    validate_client(config, &mut report);
    report
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn validate_relay(config: &ShamanConfig, report: &mut ValidationReport) {
    let relay = &config.relay;
    if relay.port == 0 {
        report.error("relay.port", "Port must be non-zero");
    }
    if !relay.route.starts_with('/') {
        report.error("relay.route", "Route must start with '/'");
    }
    if !is_http_url(&relay.upstream_url) {
        report.error("relay.upstreamUrl", "Upstream URL must be http(s)");
    }
    // A missing key is allowed; the provider answers 401 and the client shows it.
    if relay.api_key.trim().is_empty() {
        report.warn("relay.apiKey", "UPSTREAM_API_KEY is not set; upstream calls will be unauthorized");
    }
}

fn validate_client(config: &ShamanConfig, report: &mut ValidationReport) {
    let client = &config.client;
    if !is_http_url(&client.relay_url) {
        report.error("client.relayUrl", "Relay URL must be http(s)");
    }
    if client.model.trim().is_empty() {
        report.error("client.model", "Model id cannot be empty");
    }
    if !(0.0..=2.0).contains(&client.temperature) {
        report.warn("client.temperature", "Temperature outside 0.0..=2.0 may be rejected upstream");
    }
}
