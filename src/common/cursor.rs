use std::rc::Rc;

use crate::common::source::Source;
use crate::common::span::Span;

/// Wraps a `Source` and walks it one character at a time, tracking a
/// 1-based line and 0-based column for diagnostics.
///
/// Grounded on the Python `InputStream` this crate's language was distilled
/// from: `peek`/`next`/`eof`, plus line/column bookkeeping on `next`.
pub struct Cursor {
    source: Rc<Source>,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(source: Rc<Source>) -> Cursor {
        let chars = source.contents.chars().collect();
        Cursor { source, chars, pos: 0, line: 1, column: 0 }
    }

    /// Returns the next character without consuming it, or `None` at EOF.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Returns the character after the next one, without consuming either.
    pub fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Returns the next character and advances the cursor, updating
    /// line/column bookkeeping.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }

    /// A point span at the cursor's current position, for error reporting.
    pub fn here(&self) -> Span {
        Span::point(&self.source, self.line, self.column)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut cursor = Cursor::new(Source::inline("ab\ncd"));
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!((cursor.line(), cursor.column()), (1, 1));
        assert_eq!(cursor.advance(), Some('b'));
        assert_eq!(cursor.advance(), Some('\n'));
        assert_eq!((cursor.line(), cursor.column()), (2, 0));
        assert_eq!(cursor.advance(), Some('c'));
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
    }

    #[test]
    fn eof() {
        let mut cursor = Cursor::new(Source::inline("x"));
        assert!(!cursor.eof());
        cursor.advance();
        assert!(cursor.eof());
        assert_eq!(cursor.peek(), None);
    }
}
