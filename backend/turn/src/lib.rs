//! Shaman Turn Controller
//!
//! Composes one multimodal request per user turn, sends it to the relay,
//! and mounts the rendered reply into the conversation view-model.

pub mod attachment;
pub mod controller;
pub mod conversation;
pub mod export;
pub mod prompt;
pub mod transport;

pub use attachment::ImageAttachment;
pub use controller::{TurnController, TurnOutcome, UserTurn};
pub use conversation::{Conversation, MessageBody, MessageElement, MessageId};
pub use export::ConversationExporter;
pub use prompt::{build_payload, PromptBuilder};
pub use transport::HttpRelayTransport;
