use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::message::TurnPayload;

/// What came back from the relay: the status it forwarded and the JSON body.
#[derive(Debug, Clone)]
pub struct RelayReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl RelayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by the turn controller to reach the relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Transport name for logs (e.g., "http").
    fn name(&self) -> &str;

    /// Send one turn. `Err` means the relay could not be reached or answered
    /// with something that is not JSON.
    async fn send(&self, payload: &TurnPayload) -> Result<RelayReply>;
}

/// Optional formula engine run after a reply has been mounted.
#[async_trait]
pub trait Typesetter: Send + Sync {
    /// Engine name for logs (e.g., "mathjax").
    fn name(&self) -> &str;

    /// Typeset the formula-bearing text of one message.
    async fn typeset(&self, message_id: Uuid, text: &str) -> Result<()>;
}
