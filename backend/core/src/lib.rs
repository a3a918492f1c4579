pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use error::ShamanError;
pub use message::{ChatMessage, ContentPart, ImageUrl, MessageContent, TurnPayload};
pub use traits::{RelayReply, RelayTransport, Typesetter};
pub use types::{Mode, Sender};
