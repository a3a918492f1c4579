//! Config defaults.

use std::path::PathBuf;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8787;

pub const DEFAULT_RELAY_ROUTE: &str = "/api/proxy";

pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub const DEFAULT_REFERER: &str = "https://shamanai2.netlify.app";

pub const DEFAULT_TITLE: &str = "shamanAi";

pub const DEFAULT_MODEL: &str = "qwen/qwen-vl-plus";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub const DEFAULT_ASSISTANT_NAME: &str = "ShamanAi";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Relay URL for a relay running locally with the default port and route.
pub fn default_relay_url() -> String {
    format!("http://127.0.0.1:{DEFAULT_PORT}{DEFAULT_RELAY_ROUTE}")
}

/// `<data dir>/shaman/logs`, or `logs` when no data dir is known.
pub fn default_log_dir() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("shaman").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
        .to_string_lossy()
        .into_owned()
}
