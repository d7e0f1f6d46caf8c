//! Token shapes produced by the [`crate::Scanner`].

use pascalc_util::Span;

/// The category a [`Token`] belongs to.
///
/// Mirrors the original scanner's `TokenType`, with `StrConst` folded away:
/// the scanner assembles a string literal's quoted runs and `#N` escapes
/// internally and only ever hands the parser the finished `StringConst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    ReservedWord,
    IntConst,
    HexConst,
    RealConst,
    StringConst,
    Operation,
    Delimiter,
    Eof,
}

/// A single lexeme plus its classification and source position.
///
/// `text` holds the original spelling for identifiers (case preserved) and
/// the decoded contents for string constants; `lower` is the lowercased
/// spelling used for reserved-word and identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub lower: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        let text = text.into();
        let lower = text.to_lowercase();
        Self {
            kind,
            text,
            lower,
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for an `Operation`/`Delimiter`/`ReservedWord` token whose
    /// canonical spelling matches `lexeme` (case-insensitively).
    pub fn is_lexeme(&self, lexeme: &str) -> bool {
        self.lower == lexeme.to_lowercase()
    }
}
