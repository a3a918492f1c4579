//! Reply Renderer
//!
//! Splits one finished model reply into an ordered view-model of chart,
//! vector-graphic and formula-aware text regions, and realizes that
//! view-model through swappable mounting adapters (HTML, plain text).

pub mod code_block;
pub mod formula;
pub mod ir;
pub mod mount;
pub mod renderer;

pub use code_block::{CodeBlockAnalyzer, FencedBlock};
pub use formula::split_formula_runs;
pub use ir::{ChartSpec, FormulaText, GraphicSource, Region, RenderedReply, RunKind, TextRun, VectorGraphic};
pub use mount::{html_escape, mount_reply, HtmlMount, Mount, PlainTextMount};
pub use renderer::{default_layout, Renderer};
