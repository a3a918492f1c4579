//! Log Redaction Layer
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9\-_]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts credentials in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "upstream said: invalid header Bearer sk-or-v1-0123456789abcdef0123";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("sk-or-v1"));
        assert!(clean.starts_with("upstream said: invalid header [REDACTED_TOKEN]"));
    }

    #[test]
    fn test_bare_key_is_redacted() {
        let clean = redact_sensitive_data("key=sk-or-v1-abcdefabcdefabcdef");
        assert_eq!(clean, "key=[REDACTED_TOKEN]");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(redact_sensitive_data("connection refused"), "connection refused");
    }
}
