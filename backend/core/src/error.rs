use thiserror::Error;

/// Top-level error type for the Shaman relay and renderer.
#[derive(Debug, Error)]
pub enum ShamanError {
    #[error("only POST allowed")]
    MethodNotAllowed,

    #[error("relay failed: {0}")]
    Relay(String),

    #[error("API error: {status}")]
    Upstream { status: u16 },

    #[error("chart extraction failed: {0}")]
    Extraction(String),

    #[error("typesetting failed: {0}")]
    Typeset(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShamanError {
    /// Whether the error is recovered inside the rendering path and never
    /// shown in place of a reply.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Typeset(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_matches_inline_error() {
        let err = ShamanError::Upstream { status: 401 };
        assert_eq!(err.to_string(), "API error: 401");
    }

    #[test]
    fn test_local_errors() {
        assert!(ShamanError::Extraction("bad json".into()).is_local());
        assert!(ShamanError::Typeset("engine down".into()).is_local());
        assert!(!ShamanError::MethodNotAllowed.is_local());
        assert!(!ShamanError::Relay("timeout".into()).is_local());
    }
}
