//! Terminal output: message labels, notes, and the plain-text reply view.

use std::io::Write;

use shaman_core::Sender;
use shaman_markdown::PlainTextMount;
use shaman_turn::MessageElement;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        eprintln!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        eprintln!("INFO: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One message as terminal text: a sender label line, then the body.
pub fn format_message(message: &MessageElement, assistant_name: &str, color: bool) -> String {
    let label = match message.sender {
        Sender::User => "You".to_string(),
        Sender::Assistant => assistant_name.to_string(),
    };
    let label = match (color, message.sender) {
        (false, _) => format!("{label}:"),
        (true, Sender::User) => format!("{BOLD}{label}:{RESET}"),
        (true, Sender::Assistant) => format!("{YELLOW}{BOLD}{label}:{RESET}"),
    };
    let mut body = message.mount(PlainTextMount::new());
    if message.image.is_some() {
        body = match color {
            true => format!("{DIM}{body} (image attached){RESET}"),
            false => format!("{body} (image attached)"),
        };
    }
    format!("{label}\n{body}\n")
}

pub fn print_message(writer: &mut impl Write, message: &MessageElement, assistant_name: &str) -> std::io::Result<()> {
    writer.write_all(format_message(message, assistant_name, supports_color()).as_bytes())?;
    writer.flush()
}
