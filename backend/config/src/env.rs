//! Environment handling for config values.
//!
//! Two passes run at load time:
//! - `${VAR_NAME}` references inside string values are substituted. Only
//!   uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${}` escapes to a
//!   literal `${}`.
//! - Well-known variables (`UPSTREAM_API_KEY`, `SHAMAN_*`, `RUST_LOG`)
//!   override whatever the file said.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::schema::ShamanConfig;

/// Pattern matching valid uppercase env var names.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Pattern matching escaped env var references (`$${}` → `${}`).
static ESCAPED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree using `env`.
///
/// Only string leaves are processed. A referenced variable that is unset or
/// empty is an error.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        if error.is_some() {
            return String::new();
        }
        // `$${VAR}` is an escape, leave it for the restore pass
        if let Some(start) = caps.get(0).map(|m| m.start()) {
            if start > 0 && s.as_bytes().get(start - 1) == Some(&b'$') {
                return caps[0].to_string();
            }
        }
        match env.get(&caps[1]) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                error = Some(MissingEnvVarError {
                    var_name: caps[1].to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }

    Ok(ESCAPED_PATTERN
        .replace_all(&substituted, |caps: &regex::Captures| format!("${{{}}}", &caps[1]))
        .to_string())
}

/// Apply the well-known environment variables on top of `config`.
///
/// Unparseable numeric values are ignored with a warning.
pub fn apply_env_overrides(mut config: ShamanConfig, env: &HashMap<String, String>) -> ShamanConfig {
    if let Some(key) = env.get("UPSTREAM_API_KEY") {
        config.relay.api_key = key.clone();
    }
    if let Some(bind) = env.get("SHAMAN_BIND") {
        config.relay.bind_address = bind.clone();
    }
    if let Some(port) = env.get("SHAMAN_PORT") {
        match port.parse() {
            Ok(port) => config.relay.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid SHAMAN_PORT"),
        }
    }
    if let Some(url) = env.get("SHAMAN_UPSTREAM_URL") {
        config.relay.upstream_url = url.clone();
    }
    if let Some(url) = env.get("SHAMAN_RELAY_URL") {
        config.client.relay_url = url.clone();
    }
    if let Some(model) = env.get("SHAMAN_MODEL") {
        config.client.model = model.clone();
    }
    if let Some(temperature) = env.get("SHAMAN_TEMPERATURE") {
        match temperature.parse() {
            Ok(t) => config.client.temperature = t,
            Err(_) => warn!(value = %temperature, "Ignoring invalid SHAMAN_TEMPERATURE"),
        }
    }
    if let Some(dir) = env.get("SHAMAN_LOG_DIR") {
        config.logging.dir = dir.clone();
    }
    if let Some(level) = env.get("RUST_LOG") {
        config.logging.level = level.clone();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"apiKey": "${UPSTREAM_API_KEY}"});
        let result = resolve_env_vars_with(&v, &env(&[("UPSTREAM_API_KEY", "sk-abc123")])).unwrap();
        assert_eq!(result["apiKey"], "sk-abc123");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"relay": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("relay.apiKey"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"title": "cost $${PRICE}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["title"], "cost ${PRICE}");
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"key": "plain-string", "n": 3});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = ShamanConfig::default();
        config.client.model = "from-file".into();
        let config = apply_env_overrides(
            config,
            &env(&[
                ("UPSTREAM_API_KEY", "sk-env"),
                ("SHAMAN_MODEL", "from-env"),
                ("SHAMAN_TEMPERATURE", "0.2"),
                ("SHAMAN_PORT", "not-a-port"),
            ]),
        );
        assert_eq!(config.relay.api_key, "sk-env");
        assert_eq!(config.client.model, "from-env");
        assert_eq!(config.client.temperature, 0.2);
        assert_eq!(config.relay.port, crate::defaults::DEFAULT_PORT);
    }
}
