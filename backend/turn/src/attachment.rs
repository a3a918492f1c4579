//! Image attachments inlined into a turn as base64 data URIs.

use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// MIME type used when the extension says nothing useful.
const FALLBACK_MIME: &str = "image/jpeg";

/// An image attached to one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix.
    pub base64: String,
}

impl ImageAttachment {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: STANDARD.encode(bytes),
        }
    }

    /// Read an image file, labelling it by extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let mime_type = detect_image_mime(path);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        if bytes.is_empty() {
            bail!("Image file is empty: {}", path.display());
        }
        Ok(Self::from_bytes(&bytes, mime_type))
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let Some(rest) = uri.strip_prefix("data:") else {
            bail!("not a data URI");
        };
        let Some((meta, payload)) = rest.split_once(',') else {
            bail!("data URI has no payload");
        };
        let Some(mime_type) = meta.strip_suffix(";base64") else {
            bail!("data URI is not base64-encoded");
        };
        STANDARD.decode(payload).context("data URI payload is not valid base64")?;
        Ok(Self {
            mime_type: if mime_type.is_empty() { FALLBACK_MIME.to_string() } else { mime_type.to_string() },
            base64: payload.to_string(),
        })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Detect an image MIME type by file extension.
pub fn detect_image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => FALLBACK_MIME,
    }
}
