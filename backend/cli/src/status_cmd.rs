//! CLI Status Command
//!
//! Probes the relay's health route and reports what answered.

use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use shaman_config::ShamanConfig;

use crate::terminal_output::{note_error, note_success};

/// Health URL on the same origin as the relay URL.
pub fn health_url(relay_url: &str) -> Result<Url> {
    let base = Url::parse(relay_url).with_context(|| format!("Invalid relay URL: {relay_url}"))?;
    Ok(base.join("/api/health")?)
}

pub async fn run(config: &ShamanConfig) -> Result<()> {
    let url = health_url(&config.client.relay_url)?;
    let client = reqwest::Client::new();

    match client.get(url.clone()).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: Value = resp.json().await?;
            note_success(&format!("Relay is up at {url}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => {
            note_error(&format!("Relay at {url} answered {}", resp.status()));
        }
        Err(_) => {
            note_error(&format!("Relay is not running at {url}"));
        }
    }

    Ok(())
}
