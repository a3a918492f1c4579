//! Conversation view-model.
//!
//! Holds one element per message in display order. Elements are created
//! immediately (the assistant's in a pending state) and mutated in place
//! once the reply arrives.

use chrono::{DateTime, Utc};
use shaman_core::Sender;
use shaman_markdown::{mount_reply, FormulaText, Mount, Region, RenderedReply, TextRun};
use uuid::Uuid;

use crate::attachment::ImageAttachment;

pub type MessageId = Uuid;

/// What a message element currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Placeholder while the relay round trip is in flight.
    Pending(String),
    /// Literal text: user input, or an error shown instead of a reply.
    Text(String),
    /// A rendered reply.
    Rendered(RenderedReply),
}

#[derive(Debug, Clone)]
pub struct MessageElement {
    pub id: MessageId,
    pub sender: Sender,
    pub image: Option<ImageAttachment>,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

impl MessageElement {
    pub fn is_pending(&self) -> bool {
        matches!(self.body, MessageBody::Pending(_))
    }

    /// Realize the body through a mounting adapter. Literal bodies are
    /// mounted as a single plain text region.
    pub fn mount<M: Mount>(&self, target: M) -> M::Output {
        match &self.body {
            MessageBody::Rendered(reply) => mount_reply(target, reply),
            MessageBody::Pending(text) | MessageBody::Text(text) => {
                let reply = RenderedReply {
                    regions: vec![Region::Text(FormulaText {
                        runs: vec![TextRun::plain(text.clone())],
                    })],
                };
                mount_reply(target, &reply)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<MessageElement>,
    scroll_anchor: Option<MessageId>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message with literal text.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>, image: Option<ImageAttachment>) -> MessageId {
        self.append(sender, MessageBody::Text(text.into()), image)
    }

    /// Append an assistant placeholder to be resolved later.
    pub fn push_pending(&mut self, placeholder: impl Into<String>) -> MessageId {
        self.append(Sender::Assistant, MessageBody::Pending(placeholder.into()), None)
    }

    fn append(&mut self, sender: Sender, body: MessageBody, image: Option<ImageAttachment>) -> MessageId {
        let id = Uuid::new_v4();
        self.messages.push(MessageElement {
            id,
            sender,
            image,
            body,
            created_at: Utc::now(),
        });
        self.scroll_to_bottom();
        id
    }

    /// Replace the content of an element. Returns false when the element is gone.
    pub fn update(&mut self, id: MessageId, body: MessageBody) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        message.body = body;
        self.scroll_to_bottom();
        true
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_anchor = self.messages.last().map(|m| m.id);
    }

    /// The element the view is scrolled to.
    pub fn scroll_anchor(&self) -> Option<MessageId> {
        self.scroll_anchor
    }

    pub fn get(&self, id: MessageId) -> Option<&MessageElement> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[MessageElement] {
        &self.messages
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaman_core::Mode;
    use shaman_markdown::{PlainTextMount, Renderer};

    #[test]
    fn test_pending_then_rendered_in_place() {
        let mut conversation = Conversation::new();
        conversation.push(Sender::User, "hi", None);
        let pending = conversation.push_pending("thinking...");
        assert_eq!(conversation.pending_count(), 1);

        let reply = Renderer::render("hello $x$", Mode::Chat);
        assert!(conversation.update(pending, MessageBody::Rendered(reply)));

        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.pending_count(), 0);
        assert_eq!(conversation.messages()[1].id, pending);
        assert_eq!(conversation.scroll_anchor(), Some(pending));
    }

    #[test]
    fn test_update_unknown_id() {
        let mut conversation = Conversation::new();
        assert!(!conversation.update(Uuid::new_v4(), MessageBody::Text("x".into())));
    }

    #[test]
    fn test_literal_body_mounts_as_plain_text() {
        let mut conversation = Conversation::new();
        let id = conversation.push(Sender::Assistant, "Error: API error: 500", None);
        let out = conversation.get(id).unwrap().mount(PlainTextMount::new());
        assert_eq!(out, "Error: API error: 500");
    }
}
