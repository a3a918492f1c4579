//! Inline formula splitting.
//!
//! `$...$` spans never cross a line terminator (`\n`, `\r`, U+2028,
//! U+2029) and are matched non-greedily, left to right.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::TextRun;

static FORMULA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^\n\r\x{2028}\x{2029}]*?)\$").unwrap());

/// Split text into alternating plain and formula runs.
///
/// Concatenating the runs gives back `text` exactly; formula runs keep their
/// `$` delimiters and empty plain runs are never emitted.
pub fn split_formula_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for m in FORMULA_RE.find_iter(text) {
        if m.start() > last {
            runs.push(TextRun::plain(&text[last..m.start()]));
        }
        runs.push(TextRun::formula(m.as_str()));
        last = m.end();
    }

    if last < text.len() {
        runs.push(TextRun::plain(&text[last..]));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::RunKind;

    fn joined(runs: &[TextRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_no_dollar_is_single_plain_run() {
        for text in ["plain words", "  padded  ", "line one\nline two", "€ and ✓"] {
            let runs = split_formula_runs(text);
            assert_eq!(runs, vec![TextRun::plain(text)]);
        }
    }

    #[test]
    fn test_balanced_pairs_alternate_and_reconstruct() {
        let text = "Area is $\\pi r^2$ and energy $E=mc^2$.";
        let runs = split_formula_runs(text);
        let kinds: Vec<RunKind> = runs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RunKind::Plain, RunKind::Formula, RunKind::Plain, RunKind::Formula, RunKind::Plain]
        );
        assert_eq!(runs[1].text, "$\\pi r^2$");
        assert_eq!(joined(&runs), text);
    }

    #[test]
    fn test_leading_and_adjacent_formulas() {
        let runs = split_formula_runs("$a$$b$ tail");
        assert_eq!(
            runs,
            vec![TextRun::formula("$a$"), TextRun::formula("$b$"), TextRun::plain(" tail")]
        );
    }

    #[test]
    fn test_formula_does_not_span_lines() {
        let text = "cost $5\nand $x$";
        let runs = split_formula_runs(text);
        assert_eq!(runs, vec![TextRun::plain("cost $5\nand "), TextRun::formula("$x$")]);
    }

    #[test]
    fn test_formula_does_not_span_other_line_terminators() {
        for sep in ["\r", "\u{2028}", "\u{2029}"] {
            let text = format!("cost $5{sep}and $x$");
            let runs = split_formula_runs(&text);
            assert_eq!(
                runs,
                vec![TextRun::plain(format!("cost $5{sep}and ")), TextRun::formula("$x$")]
            );
        }
    }

    #[test]
    fn test_unbalanced_dollar_stays_plain() {
        let runs = split_formula_runs("costs $5 today");
        assert_eq!(runs, vec![TextRun::plain("costs $5 today")]);
    }

    #[test]
    fn test_empty_input_has_no_runs() {
        assert!(split_formula_runs("").is_empty());
    }
}
