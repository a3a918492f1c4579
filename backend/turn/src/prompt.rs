//! System prompt and request payload builder.

use shaman_config::ClientConfig;
use shaman_core::{ChatMessage, ContentPart, ImageUrl, Mode, TurnPayload};

use crate::attachment::ImageAttachment;

pub struct PromptBuilder;

impl PromptBuilder {
    /// The system instruction for a turn in `mode`.
    pub fn build(config: &ClientConfig, mode: Mode) -> String {
        let mut prompt = format!(
            "You are {}, a smart assistant. Use ONLY the $...$ format for formulas. \
            Do NOT wrap formulas in brackets or quotes.",
            config.assistant_name
        );

        if let Some(language) = config.reply_language.as_deref().filter(|l| !l.trim().is_empty()) {
            prompt.push_str(&format!(" Reply in {}.", language.trim()));
        }

        match mode {
            Mode::Graph => prompt.push_str(
                " The user is asking for a chart. Return ONLY Plotly.js JSON inside a single ```json ... ``` block.",
            ),
            Mode::Draw => prompt.push_str(
                " The user wants a drawing. Return ONLY valid SVG inside a single ```svg ... ``` block, with black lines.",
            ),
            Mode::Chat => {}
        }

        prompt
    }
}

/// Compose the outbound request: the system instruction, then one user turn
/// whose parts are the optional text followed by the optional image.
pub fn build_payload(
    config: &ClientConfig,
    mode: Mode,
    text: Option<&str>,
    image: Option<&ImageAttachment>,
) -> TurnPayload {
    let mut parts = Vec::new();
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        parts.push(ContentPart::Text { text: text.to_string() });
    }
    if let Some(image) = image {
        parts.push(ContentPart::ImageUrl { image_url: ImageUrl { url: image.data_uri() } });
    }

    TurnPayload {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(PromptBuilder::build(config, mode)),
            ChatMessage::user(parts),
        ],
        temperature: config.temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shaman_core::MessageContent;

    #[test]
    fn test_mode_suffixes() {
        let config = ClientConfig::default();
        let chat = PromptBuilder::build(&config, Mode::Chat);
        let graph = PromptBuilder::build(&config, Mode::Graph);
        let draw = PromptBuilder::build(&config, Mode::Draw);

        assert!(chat.starts_with("You are ShamanAi"));
        assert!(!chat.contains("```"));
        assert!(graph.starts_with(&chat));
        assert!(graph.contains("```json"));
        assert!(draw.contains("```svg"));
    }

    #[test]
    fn test_reply_language() {
        let config = ClientConfig {
            reply_language: Some("Russian".into()),
            ..ClientConfig::default()
        };
        assert!(PromptBuilder::build(&config, Mode::Chat).contains("Reply in Russian."));
    }

    #[test]
    fn test_payload_text_then_image() {
        let config = ClientConfig::default();
        let image = ImageAttachment::from_bytes(b"abc", "image/png");
        let payload = build_payload(&config, Mode::Draw, Some("a cat"), Some(&image));

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "qwen/qwen-vl-plus");
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(
            value["messages"][1]["content"],
            json!([
                {"type": "text", "text": "a cat"},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,YWJj"}}
            ])
        );
    }

    #[test]
    fn test_payload_image_only() {
        let config = ClientConfig::default();
        let image = ImageAttachment::from_bytes(b"abc", "image/jpeg");
        let payload = build_payload(&config, Mode::Chat, None, Some(&image));
        match &payload.messages[1].content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 1);
                assert!(matches!(parts[0], ContentPart::ImageUrl { .. }));
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }
}
