//! Source location tracking for query text
//!
//! Lines are 1-based and advance on `\n` only. Columns are the 0-based
//! character index within the line; every character, tab included,
//! occupies exactly one column. Conversion to the 1-based form shown to
//! users happens once, in [`crate::messages::MessagePosition`].
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in query text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Character index within the line (0-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The position of the first character of any input
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    /// Advance position past one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 0,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position past every character of `s`
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

/// A span of query text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Empty span at `pos`
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input
            .get(self.start.offset..self.end.offset)
            .unwrap_or_default()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line,
                self.start.column + 1,
                self.end.column + 1
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Map the value while preserving the span
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Line lookup over a query, used for caret diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };

        self.source
            .get(start..end)
            .map(|line| line.trim_end_matches('\r'))
    }

    /// Format a message with the offending line and a caret under the
    /// 1-based `line`/`column` pair.
    pub fn format_error(&self, line: i32, column: i32, message: &str) -> String {
        let mut result = format!("error: {}\n", message);

        if line <= 0 {
            return result;
        }

        result.push_str(&format!("  --> {}:{}\n", line, column.max(1)));

        if let Some(text) = self.get_line(line as u32) {
            let line_num_str = line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!(" {} |\n", padding));
            result.push_str(&format!(" {} | {}\n", line_num_str, text));

            if column > 0 {
                let lead = " ".repeat((column - 1) as usize);
                result.push_str(&format!(" {} | {}^\n", padding, lead));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_occupy_one_column() {
        let pos = Position::start().advance_str("a\tb");
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 3);
    }

    #[test]
    fn test_carriage_return_does_not_start_a_line() {
        let pos = Position::start().advance_str("ab\r\ncd\re");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 4);
    }

    #[test]
    fn test_multibyte_offsets() {
        let pos = Position::start().advance('\u{3737}');
        assert_eq!(pos.offset, 3);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_source_map_caret() {
        let map = SourceMap::new("a = b\nc = \"d".to_string());
        assert_eq!(map.line_count(), 2);
        assert_eq!(map.get_line(2), Some("c = \"d"));
        assert_eq!(map.get_line(3), None);

        let rendered = map.format_error(2, 5, "jql.parse.unfinished.string");
        assert!(rendered.contains("--> 2:5"));
        assert!(rendered.ends_with(" | c = \"d\n   |     ^\n"));
    }

    #[test]
    fn test_unknown_position_has_no_excerpt() {
        let map = SourceMap::new("a = ".to_string());
        let rendered = map.format_error(-1, -1, "jql.parse.bad.operand.eof");
        assert_eq!(rendered, "error: jql.parse.bad.operand.eof\n");
    }
}
