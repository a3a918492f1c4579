//! Fenced Block Locator
//!
//! Finds the first fenced block carrying a given language tag, or the first
//! inline `<svg>` element, and reports the exact source span it occupies.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static JSON_FENCE_RE: Lazy<Regex> = Lazy::new(|| fence_regex("json"));
static SVG_FENCE_RE: Lazy<Regex> = Lazy::new(|| fence_regex("svg"));
static INLINE_SVG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)(<svg.*?</svg>)").unwrap());

fn fence_regex(lang: &str) -> Regex {
    Regex::new(&format!(r"(?s)```{}\s*(.*?)\s*```", regex::escape(lang))).unwrap()
}

/// A match of a fenced block (or inline element) inside a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// The payload between the fences, surrounding whitespace excluded.
    pub body: &'a str,
    /// The full matched text, fences included.
    pub source: &'a str,
    /// Byte range of `source` inside the searched text.
    pub span: Range<usize>,
}

pub struct CodeBlockAnalyzer;

impl CodeBlockAnalyzer {
    /// First fenced block tagged `lang`. Later blocks of the same kind are ignored.
    pub fn first_fenced<'a>(text: &'a str, lang: &str) -> Option<FencedBlock<'a>> {
        match lang {
            "json" => Self::first_match(&JSON_FENCE_RE, text),
            "svg" => Self::first_match(&SVG_FENCE_RE, text),
            other => Self::first_match(&fence_regex(other), text),
        }
    }

    /// First literal `<svg ...>...</svg>` element; the body is the whole element.
    pub fn first_inline_svg(text: &str) -> Option<FencedBlock<'_>> {
        Self::first_match(&INLINE_SVG_RE, text)
    }

    fn first_match<'a>(re: &Regex, text: &'a str) -> Option<FencedBlock<'a>> {
        let caps = re.captures(text)?;
        let whole = caps.get(0)?;
        let body = caps.get(1).map_or("", |m| m.as_str());
        Some(FencedBlock {
            body,
            source: whole.as_str(),
            span: whole.range(),
        })
    }
}
