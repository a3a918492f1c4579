//! Reply Intermediate Representation
//!
//! The view-model a rendered reply is reduced to: an ordered list of typed
//! regions that a mounting adapter realizes on some UI surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formula::split_formula_runs;

/// One mountable region of a message element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Region {
    Chart(ChartSpec),
    Graphic(VectorGraphic),
    Text(FormulaText),
}

impl Region {
    /// Position in the fixed mounting order.
    pub fn order(&self) -> u8 {
        match self {
            Region::Chart(_) => 0,
            Region::Graphic(_) => 1,
            Region::Text(_) => 2,
        }
    }
}

/// A resolved plotting payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub data: Vec<Value>,
    pub layout: Value,
    pub config: Value,
    /// True when the reply carried no layout and the default was substituted.
    pub default_layout: bool,
}

/// Where a vector graphic was found in the reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GraphicSource {
    Fenced,
    Inline,
}

/// Raw vector-graphic markup, injected without sanitization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorGraphic {
    pub markup: String,
    pub source: GraphicSource,
}

impl VectorGraphic {
    /// The markup between the outermost `<svg ...>` and `</svg>` tags, or the
    /// whole markup when it is not wrapped in an `<svg>` element.
    pub fn body(&self) -> &str {
        let trimmed = self.markup.trim();
        if !trimmed.starts_with("<svg") || !trimmed.ends_with("</svg>") {
            return trimmed;
        }
        let Some(open_end) = trimmed.find('>') else {
            return trimmed;
        };
        let close_start = trimmed.len() - "</svg>".len();
        if open_end + 1 > close_start {
            return "";
        }
        &trimmed[open_end + 1..close_start]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Plain,
    Formula,
}

/// A run of text mounted as an inert text node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextRun {
    pub kind: RunKind,
    pub text: String,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { kind: RunKind::Plain, text: text.into() }
    }

    pub fn formula(text: impl Into<String>) -> Self {
        Self { kind: RunKind::Formula, text: text.into() }
    }
}

/// The leftover reply text, split into plain and formula runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormulaText {
    pub runs: Vec<TextRun>,
}

impl FormulaText {
    pub fn split(text: &str) -> Self {
        Self { runs: split_formula_runs(text) }
    }

    pub fn has_formulas(&self) -> bool {
        self.runs.iter().any(|r| r.kind == RunKind::Formula)
    }

    /// The original text, delimiters included.
    pub fn to_source(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Everything one reply renders to, in mounting order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderedReply {
    pub regions: Vec<Region>,
}

impl RenderedReply {
    pub fn chart(&self) -> Option<&ChartSpec> {
        self.regions.iter().find_map(|r| match r {
            Region::Chart(c) => Some(c),
            _ => None,
        })
    }

    pub fn graphic(&self) -> Option<&VectorGraphic> {
        self.regions.iter().find_map(|r| match r {
            Region::Graphic(g) => Some(g),
            _ => None,
        })
    }

    pub fn text(&self) -> Option<&FormulaText> {
        self.regions.iter().find_map(|r| match r {
            Region::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
