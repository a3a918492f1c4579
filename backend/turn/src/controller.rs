//! Turn controller.
//!
//! One call to [`TurnController::send`] is one user turn: the user's slots
//! and a pending assistant slot are appended, the request goes to the relay,
//! and the pending slot is resolved with either a rendered reply or a
//! literal error line. Concurrent turns each own their pending slot and may
//! resolve out of send order.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use shaman_config::ClientConfig;
use shaman_core::{Mode, RelayReply, RelayTransport, Sender, ShamanError, Typesetter};
use shaman_logging::{EventLogger, TurnEvent};
use shaman_markdown::{Region, RenderedReply, Renderer};

use crate::attachment::ImageAttachment;
use crate::conversation::{Conversation, MessageBody, MessageId};
use crate::prompt::build_payload;

pub const PENDING_PLACEHOLDER: &str = "Shaman is thinking...";
pub const IMAGE_PLACEHOLDER: &str = "[Image]";
pub const NO_REPLY: &str = "No reply.";

/// Input of one turn. `mode` is the snapshot the reply will be rendered with.
#[derive(Debug, Clone)]
pub struct UserTurn {
    pub text: String,
    pub image: Option<ImageAttachment>,
    pub mode: Mode,
}

impl UserTurn {
    pub fn text(text: impl Into<String>, mode: Mode) -> Self {
        Self { text: text.into(), image: None, mode }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Nothing to send: no text and no image.
    Skipped,
    /// The pending slot now shows a rendered reply.
    Rendered { message_id: MessageId, reply: RenderedReply },
    /// The pending slot now shows a literal error line.
    Failed { message_id: MessageId, error: String },
}

pub struct TurnController {
    config: ClientConfig,
    transport: Arc<dyn RelayTransport>,
    typesetter: Option<Arc<dyn Typesetter>>,
    conversation: Arc<RwLock<Conversation>>,
}

impl TurnController {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn RelayTransport>,
        conversation: Arc<RwLock<Conversation>>,
    ) -> Self {
        Self {
            config,
            transport,
            typesetter: None,
            conversation,
        }
    }

    pub fn with_typesetter(mut self, typesetter: Arc<dyn Typesetter>) -> Self {
        self.typesetter = Some(typesetter);
        self
    }

    pub fn conversation(&self) -> Arc<RwLock<Conversation>> {
        Arc::clone(&self.conversation)
    }

    /// Run one turn to completion. Never fails: relay problems end up as the
    /// pending slot's text.
    #[instrument(skip(self, turn), fields(mode = %turn.mode, transport = self.transport.name()))]
    pub async fn send(&self, turn: UserTurn) -> TurnOutcome {
        let text = turn.text.trim();
        if text.is_empty() && turn.image.is_none() {
            return TurnOutcome::Skipped;
        }
        let mode = turn.mode;

        let message_id = {
            let mut conversation = self.conversation.write().await;
            if let Some(image) = &turn.image {
                conversation.push(Sender::User, IMAGE_PLACEHOLDER, Some(image.clone()));
            }
            if !text.is_empty() {
                conversation.push(Sender::User, text, None);
            }
            conversation.push_pending(PENDING_PLACEHOLDER)
        };
        let turn_id = message_id.to_string();

        let payload = build_payload(&self.config, mode, Some(text), turn.image.as_ref());

        let start = Instant::now();
        let result = self.transport.send(&payload).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let content = match result {
            Ok(reply) => {
                EventLogger::log_event(&turn_id, TurnEvent::RelayCall { status: reply.status, latency_ms });
                reply_content(reply)
            }
            Err(e) => Err(ShamanError::Other(e)),
        };

        match content {
            Ok(content) => {
                let reply = Renderer::render(&content, mode);
                self.conversation
                    .write()
                    .await
                    .update(message_id, MessageBody::Rendered(reply.clone()));

                info!(%message_id, regions = reply.regions.len(), latency_ms, "Turn rendered");
                EventLogger::log_event(
                    &turn_id,
                    TurnEvent::Reply { mode, regions: region_names(&reply) },
                );
                self.spawn_typeset(message_id, &reply);

                TurnOutcome::Rendered { message_id, reply }
            }
            Err(err) => {
                let error = format!("Error: {}", error_text(&err));
                warn!(%message_id, error = %error, "Turn failed");
                EventLogger::log_event(&turn_id, TurnEvent::Error { error_msg: error.clone() });
                self.conversation
                    .write()
                    .await
                    .update(message_id, MessageBody::Text(error.clone()));

                TurnOutcome::Failed { message_id, error }
            }
        }
    }

    /// Typeset the reply's text in a detached task; failures are only logged.
    fn spawn_typeset(&self, message_id: MessageId, reply: &RenderedReply) {
        let (Some(typesetter), Some(text)) = (&self.typesetter, reply.text()) else {
            return;
        };
        let typesetter = Arc::clone(typesetter);
        let source = text.to_source();
        tokio::spawn(async move {
            if let Err(e) = typesetter.typeset(message_id, &source).await {
                let err = ShamanError::Typeset(e.to_string());
                warn!(%message_id, engine = typesetter.name(), error = %err, "Typesetting failed");
            }
        });
    }
}

/// The reply text at `choices[0].message.content`, or [`NO_REPLY`].
fn reply_content(reply: RelayReply) -> Result<String, ShamanError> {
    if !reply.is_success() {
        return Err(ShamanError::Upstream { status: reply.status });
    }
    Ok(extract_content(&reply.body).unwrap_or(NO_REPLY).to_string())
}

fn extract_content(body: &Value) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|c| !c.is_empty())
}

fn error_text(err: &ShamanError) -> String {
    match err {
        ShamanError::Other(e) => format!("{e:#}"),
        other => other.to_string(),
    }
}

fn region_names(reply: &RenderedReply) -> Vec<String> {
    reply
        .regions
        .iter()
        .map(|r| match r {
            Region::Chart(_) => "chart",
            Region::Graphic(_) => "graphic",
            Region::Text(_) => "text",
        })
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use shaman_core::{ContentPart, MessageContent, TurnPayload};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    /// Answers every turn with a fixed reply and records what it was sent.
    struct MockTransport {
        reply: Result<RelayReply, String>,
        delay_for: Option<(String, Duration)>,
        sent: Mutex<Vec<TurnPayload>>,
    }

    impl MockTransport {
        fn ok(content: &str) -> Self {
            Self::with_reply(Ok(RelayReply {
                status: 200,
                body: json!({"choices": [{"message": {"content": content}}]}),
            }))
        }

        fn with_reply(reply: Result<RelayReply, String>) -> Self {
            Self { reply, delay_for: None, sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl RelayTransport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send(&self, payload: &TurnPayload) -> Result<RelayReply> {
            self.sent.lock().unwrap().push(payload.clone());
            if let Some((needle, delay)) = &self.delay_for {
                if serde_json::to_string(payload)?.contains(needle.as_str()) {
                    tokio::time::sleep(*delay).await;
                }
            }
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => bail!("{}", e),
            }
        }
    }

    struct ChannelTypesetter {
        tx: mpsc::UnboundedSender<(Uuid, String)>,
        fail: bool,
    }

    #[async_trait]
    impl Typesetter for ChannelTypesetter {
        fn name(&self) -> &str {
            "test"
        }

        async fn typeset(&self, message_id: Uuid, text: &str) -> Result<()> {
            let _ = self.tx.send((message_id, text.to_string()));
            if self.fail {
                bail!("engine exploded");
            }
            Ok(())
        }
    }

    fn controller(transport: Arc<MockTransport>) -> TurnController {
        TurnController::new(
            ClientConfig::default(),
            transport,
            Arc::new(RwLock::new(Conversation::new())),
        )
    }

    #[tokio::test]
    async fn test_empty_turn_is_skipped() {
        let transport = Arc::new(MockTransport::ok("unused"));
        let controller = controller(transport.clone());

        let outcome = controller.send(UserTurn::text("   ", Mode::Chat)).await;
        assert_eq!(outcome, TurnOutcome::Skipped);
        assert!(transport.sent.lock().unwrap().is_empty());
        assert!(controller.conversation().read().await.messages().is_empty());
    }

    #[tokio::test]
    async fn test_graph_turn_renders_chart_with_send_time_mode() {
        let transport = Arc::new(MockTransport::ok("Here: ```json [{\"y\":[1,2]}] ``` done"));
        let controller = controller(transport.clone());

        let outcome = controller.send(UserTurn::text(" plot y ", Mode::Graph)).await;
        let TurnOutcome::Rendered { message_id, reply } = outcome else {
            panic!("expected a rendered turn");
        };
        assert!(reply.chart().is_some());
        assert_eq!(reply.text().unwrap().to_source(), "Here:  done");

        let conversation = controller.conversation();
        let conversation = conversation.read().await;
        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body, MessageBody::Text("plot y".into()));
        assert_eq!(messages[1].id, message_id);
        assert_eq!(messages[1].body, MessageBody::Rendered(reply));

        let sent = transport.sent.lock().unwrap();
        let MessageContent::Text(system) = &sent[0].messages[0].content else {
            panic!("system prompt should be a string");
        };
        assert!(system.contains("```json"));
    }

    #[tokio::test]
    async fn test_image_turn_adds_placeholder_slot() {
        let transport = Arc::new(MockTransport::ok("A cat."));
        let controller = controller(transport.clone());
        let image = ImageAttachment::from_bytes(b"img", "image/png");

        controller
            .send(UserTurn::text("", Mode::Chat).with_image(image.clone()))
            .await;

        let conversation = controller.conversation();
        let conversation = conversation.read().await;
        let first = &conversation.messages()[0];
        assert_eq!(first.body, MessageBody::Text(IMAGE_PLACEHOLDER.into()));
        assert_eq!(first.image.as_ref(), Some(&image));
        assert_eq!(conversation.messages().len(), 2);

        let sent = transport.sent.lock().unwrap();
        let MessageContent::Parts(parts) = &sent[0].messages[1].content else {
            panic!("user turn should be parts");
        };
        assert_eq!(parts.len(), 1);
        assert!(matches!(parts[0], ContentPart::ImageUrl { .. }));
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_shown_inline() {
        let transport = Arc::new(MockTransport::with_reply(Ok(RelayReply {
            status: 401,
            body: json!({"error": {"message": "No auth"}}),
        })));
        let controller = controller(transport);

        let outcome = controller.send(UserTurn::text("hi", Mode::Chat)).await;
        let TurnOutcome::Failed { message_id, error } = outcome else {
            panic!("expected a failed turn");
        };
        assert_eq!(error, "Error: API error: 401");

        let conversation = controller.conversation();
        let conversation = conversation.read().await;
        assert_eq!(
            conversation.get(message_id).unwrap().body,
            MessageBody::Text("Error: API error: 401".into())
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_shown_inline() {
        let transport = Arc::new(MockTransport::with_reply(Err("connection refused".into())));
        let controller = controller(transport);

        let outcome = controller.send(UserTurn::text("hi", Mode::Draw)).await;
        assert!(matches!(
            outcome,
            TurnOutcome::Failed { ref error, .. } if error == "Error: connection refused"
        ));
    }

    #[tokio::test]
    async fn test_missing_content_falls_back() {
        let transport = Arc::new(MockTransport::with_reply(Ok(RelayReply {
            status: 200,
            body: json!({"choices": []}),
        })));
        let controller = controller(transport);

        let TurnOutcome::Rendered { reply, .. } = controller.send(UserTurn::text("hi", Mode::Chat)).await
        else {
            panic!("expected a rendered turn");
        };
        assert_eq!(reply.text().unwrap().to_source(), NO_REPLY);
    }

    #[tokio::test]
    async fn test_typeset_runs_detached_and_failure_is_not_surfaced() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = Arc::new(MockTransport::ok("Energy $E=mc^2$"));
        let controller = controller(transport)
            .with_typesetter(Arc::new(ChannelTypesetter { tx, fail: true }));

        let TurnOutcome::Rendered { message_id, reply } =
            controller.send(UserTurn::text("explain", Mode::Chat)).await
        else {
            panic!("expected a rendered turn");
        };

        let (typeset_id, text) = rx.recv().await.unwrap();
        assert_eq!(typeset_id, message_id);
        assert_eq!(text, "Energy $E=mc^2$");

        let conversation = controller.conversation();
        let conversation = conversation.read().await;
        assert_eq!(conversation.get(message_id).unwrap().body, MessageBody::Rendered(reply));
    }

    #[tokio::test]
    async fn test_concurrent_turns_resolve_their_own_slots() {
        let mut transport = MockTransport::ok("same reply");
        transport.delay_for = Some(("slow question".into(), Duration::from_millis(100)));
        let controller = Arc::new(controller(Arc::new(transport)));

        let slow = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.send(UserTurn::text("slow question", Mode::Chat)).await })
        };
        // Let the slow turn register its pending slot first.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = controller.send(UserTurn::text("fast question", Mode::Chat)).await;

        let conversation = controller.conversation();
        {
            let conversation = conversation.read().await;
            assert_eq!(conversation.pending_count(), 1);
            let TurnOutcome::Rendered { message_id, .. } = &fast else {
                panic!("expected a rendered turn");
            };
            assert!(!conversation.get(*message_id).unwrap().is_pending());
        }

        let slow = slow.await.unwrap();
        assert!(matches!(slow, TurnOutcome::Rendered { .. }));
        assert_eq!(conversation.read().await.pending_count(), 0);
    }
}
