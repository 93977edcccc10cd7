//! Rendering of offending characters and text inside message arguments
use crate::lexical::is_noncharacter;
use std::fmt::Write;

/// Printable form of a character: `TAB`, `U+XXXX` for control,
/// whitespace and noncharacters, otherwise the character itself
pub fn display_character(ch: char) -> String {
    if ch == '\t' {
        "TAB".to_string()
    } else if ch.is_control() || ch.is_whitespace() || is_noncharacter(ch) {
        format!("U+{:04X}", ch as u32)
    } else {
        ch.to_string()
    }
}

/// Escape sequence that would produce `ch` inside a query
pub fn escape_character(ch: char) -> String {
    match ch {
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\u{8}' => "\\b".to_string(),
        '\u{c}' => "\\f".to_string(),
        _ => {
            let mut units = [0u16; 2];
            let mut out = String::new();
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{:04x}", unit);
            }
            out
        }
    }
}

/// Line breaks become spaces so a message stays on one line; any other
/// unprintable character takes its [`display_character`] form
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' | '\r' | ' ' => out.push(' '),
            _ if ch.is_control() || ch.is_whitespace() || is_noncharacter(ch) => {
                out.push_str(&display_character(ch))
            }
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
