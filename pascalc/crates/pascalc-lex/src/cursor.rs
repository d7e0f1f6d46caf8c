//! Character cursor for traversing source code.
//!
//! Tracks byte position and 1-based line/column so tokens can be tagged
//! with a [`pascalc_util::Span`] as they're produced.

/// A cursor over a source string.
pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current character, or `'\0'` at end of input.
    pub fn current(&self) -> char {
        self.peek(0)
    }

    /// Character `offset` positions ahead of the cursor, or `'\0'` past the end.
    pub fn peek(&self, offset: usize) -> char {
        self.source[self.position..].chars().nth(offset).unwrap_or('\0')
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Consumes the current character and returns it.
    pub fn advance(&mut self) -> char {
        let c = self.current();
        if c != '\0' {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }
}
