//! Source location tracking.
//!
//! The compiler handles exactly one source file per run, so a span needs
//! only a 1-based line and column — no file id, no byte range.

/// A point in the source text where a token begins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Span {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Span for synthetic nodes that never appear in a diagnostic.
    pub const DUMMY: Span = Span { line: 0, column: 0 };
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
