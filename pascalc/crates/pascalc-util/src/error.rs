//! The compiler's single diagnostic type.
//!
//! I/O, lexical, syntactic, semantic and (unreachable) generator errors all
//! settle on exactly one error *kind*: a message plus a source coordinate
//! and the offending lexeme. We model that as one struct rather than an
//! enum per stage, and give each stage constructor functions grouped by
//! the diagnostic category they raise.

use crate::Span;
use std::fmt;

/// A fatal compilation diagnostic.
///
/// Display format: `line:col ERROR at 'lexeme': message`.
#[derive(Debug, Clone, thiserror::Error)]
pub struct CompileError {
    pub span: Span,
    pub lexeme: String,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, CompileError>;

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ERROR at '{}': {}",
            self.span, self.lexeme, self.message
        )
    }
}

impl CompileError {
    pub fn new(span: Span, lexeme: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            lexeme: lexeme.into(),
            message: message.into(),
        }
    }

    // --- I/O -----------------------------------------------------------

    pub fn cannot_open_file(path: &str) -> Self {
        Self::new(Span::DUMMY, path, "can't open file")
    }

    // --- lexical ---------------------------------------------------------

    pub fn unterminated_string(span: Span) -> Self {
        Self::new(span, "'", "unterminated string")
    }

    pub fn unterminated_comment(span: Span) -> Self {
        Self::new(span, "{", "unterminated comment")
    }

    pub fn illegal_character(span: Span, ch: char) -> Self {
        Self::new(span, ch.to_string(), "illegal character")
    }

    pub fn malformed_exponent(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "malformed real exponent")
    }

    pub fn empty_hex_literal(span: Span) -> Self {
        Self::new(span, "$", "hex literal has no digits")
    }

    // --- syntactic ---------------------------------------------------------

    pub fn unexpected_token(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "unexpected token")
    }

    pub fn expected(span: Span, lexeme: impl Into<String>, wanted: &str) -> Self {
        Self::new(span, lexeme, format!("expected {wanted}"))
    }

    pub fn duplicate_identifier(span: Span, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(span, name.clone(), format!("duplicate identifier '{name}'"))
    }

    pub fn identifier_not_found(span: Span, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(span, name.clone(), format!("identifier not found: '{name}'"))
    }

    pub fn kind_mismatch(span: Span, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            span,
            name.clone(),
            format!("'{name}' cannot be used in this position"),
        )
    }

    // --- semantic ---------------------------------------------------------

    pub fn incompatible_types(span: Span, lexeme: impl Into<String>, lhs: &str, rhs: &str) -> Self {
        Self::new(
            span,
            lexeme,
            format!("incompatible types: {lhs} and {rhs}"),
        )
    }

    pub fn integer_expression_expected(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "integer expression expected")
    }

    pub fn lvalue_expected(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "l-value expected")
    }

    pub fn illegal_qualifier(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "illegal qualifier")
    }

    pub fn too_few_params(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "too few actual parameters")
    }

    pub fn too_many_params(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "too many actual parameters")
    }

    pub fn non_integer_array_bound(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "array bounds must be integer constants")
    }

    pub fn unknown_field(span: Span, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(span, name.clone(), format!("unknown record field '{name}'"))
    }

    pub fn not_callable(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "identifier is not callable")
    }

    pub fn not_a_type(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "identifier does not name a type")
    }

    pub fn pointers_not_implemented(span: Span, lexeme: impl Into<String>) -> Self {
        Self::new(span, lexeme, "pointers not implemented")
    }

    // --- generator (should never surface; AST invariants rule these out) --

    pub fn no_lvalue(lexeme: impl Into<String>) -> Self {
        Self::new(Span::DUMMY, lexeme, "constant has no l-value")
    }
}
