//! Reply Renderer
//!
//! Runs the extraction rules over one reply in a fixed precedence order:
//!
//! 1. chart (`graph` mode only): first fenced `json` block;
//! 2. vector graphic (`draw` and `chat` modes): first fenced `svg` block,
//!    else the first inline `<svg>` element;
//! 3. formula-aware text: whatever is left, if it is not blank.
//!
//! Each matched block is cut out of the remaining text so it is not shown
//! twice. Nothing here fails a turn; a malformed chart falls back to text.

use serde_json::{json, Value};
use shaman_core::{Mode, ShamanError};
use tracing::{debug, warn};

use crate::code_block::CodeBlockAnalyzer;
use crate::ir::{ChartSpec, FormulaText, GraphicSource, Region, RenderedReply, VectorGraphic};

/// Layout substituted when a chart payload carries none.
pub fn default_layout() -> Value {
    json!({
        "autosize": true,
        "margin": { "t": 30, "r": 30, "l": 40, "b": 40 },
        "paper_bgcolor": "rgba(0,0,0,0)",
        "plot_bgcolor": "rgba(0,0,0,0)"
    })
}

fn default_config() -> Value {
    json!({ "responsive": true })
}

pub struct Renderer;

impl Renderer {
    /// Decompose a reply into its regions for the given mode snapshot.
    pub fn render(reply: &str, mode: Mode) -> RenderedReply {
        let mut remaining = reply.to_string();
        let mut regions = Vec::new();

        if mode.extracts_charts() {
            if let Some(block) = CodeBlockAnalyzer::first_fenced(&remaining, "json") {
                match Self::parse_chart(block.body) {
                    Ok(chart) => {
                        debug!(traces = chart.data.len(), "Extracted chart");
                        let span = block.span.clone();
                        regions.push(Region::Chart(chart));
                        remaining.replace_range(span, "");
                    }
                    Err(e) => {
                        warn!(error = %e, "Chart block left as text");
                    }
                }
            }
        }

        if mode.extracts_graphics() {
            let found = CodeBlockAnalyzer::first_fenced(&remaining, "svg")
                .map(|b| (b, GraphicSource::Fenced))
                .or_else(|| CodeBlockAnalyzer::first_inline_svg(&remaining).map(|b| (b, GraphicSource::Inline)));

            if let Some((block, source)) = found {
                debug!(?source, "Extracted vector graphic");
                let graphic = VectorGraphic { markup: block.body.to_string(), source };
                let span = block.span.clone();
                regions.push(Region::Graphic(graphic));
                remaining.replace_range(span, "");
            }
        }

        if !remaining.trim().is_empty() {
            regions.push(Region::Text(FormulaText::split(&remaining)));
        }

        RenderedReply { regions }
    }

    /// Resolve a chart payload into data and layout.
    ///
    /// Accepts a trace array, an object with a `data` array and optional
    /// `layout`, or a bare trace object (no `data`, or a null/false/0/""
    /// one).
    pub fn parse_chart(body: &str) -> Result<ChartSpec, ShamanError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ShamanError::Extraction(e.to_string()))?;

        let (data, layout) = match value {
            Value::Array(traces) => (traces, None),
            Value::Object(mut obj) => {
                let layout = obj.get("layout").filter(|l| l.is_object()).cloned();
                match obj.remove("data") {
                    Some(Value::Array(traces)) => (traces, layout),
                    Some(other) if is_truthy(&other) => {
                        return Err(ShamanError::Extraction(format!(
                            "`data` must be an array, got {}",
                            json_kind(&other)
                        )));
                    }
                    // A falsy `data` means the object itself is the trace.
                    Some(falsy) => {
                        obj.insert("data".to_string(), falsy);
                        (vec![Value::Object(obj)], layout)
                    }
                    None => (vec![Value::Object(obj)], layout),
                }
            }
            other => {
                return Err(ShamanError::Extraction(format!(
                    "expected an array or object, got {}",
                    json_kind(&other)
                )));
            }
        };

        Ok(ChartSpec {
            data,
            default_layout: layout.is_none(),
            layout: layout.unwrap_or_else(default_layout),
            config: default_config(),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
