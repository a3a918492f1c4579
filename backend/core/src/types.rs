use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShamanError;

/// The interaction context that decides which extraction rules apply to a reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Free conversation; inline vector graphics are still honored.
    #[default]
    Chat,
    /// The model is asked for a Plotly chart in a fenced `json` block.
    Graph,
    /// The model is asked for a drawing in a fenced `svg` block.
    Draw,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Chat, Mode::Graph, Mode::Draw];

    /// Whether chart extraction runs for replies in this mode.
    pub fn extracts_charts(self) -> bool {
        self == Mode::Graph
    }

    /// Whether vector-graphic extraction runs for replies in this mode.
    pub fn extracts_graphics(self) -> bool {
        matches!(self, Mode::Chat | Mode::Draw)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chat => write!(f, "chat"),
            Mode::Graph => write!(f, "graph"),
            Mode::Draw => write!(f, "draw"),
        }
    }
}

impl FromStr for Mode {
    type Err = ShamanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Mode::Chat),
            "graph" => Ok(Mode::Graph),
            "draw" => Ok(Mode::Draw),
            other => Err(ShamanError::Config(format!("unknown mode: {other}"))),
        }
    }
}

/// Who a message element belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "ai"),
        }
    }
}
