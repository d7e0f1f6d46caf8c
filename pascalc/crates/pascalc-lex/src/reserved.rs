//! Fixed mapping from lowercase spelling to token category.
//!
//! Grounded in `original_source/scanner.cpp`'s `ReservedWords::ReservedWords`
//! table, restricted to the words and operators this dialect keeps.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::token::TokenKind;

const WORDS: &[&str] = &[
    "absolute",
    "array",
    "asm",
    "begin",
    "case",
    "const",
    "constructor",
    "destructor",
    "do",
    "downto",
    "else",
    "end",
    "file",
    "for",
    "function",
    "goto",
    "if",
    "implementation",
    "in",
    "inherited",
    "inline",
    "interface",
    "label",
    "nil",
    "object",
    "of",
    "on",
    "operator",
    "packed",
    "procedure",
    "program",
    "record",
    "repeat",
    "reintroduce",
    "set",
    "self",
    "string",
    "then",
    "to",
    "type",
    "unit",
    "until",
    "uses",
    "var",
    "while",
    "with",
];

const OPERATOR_WORDS: &[&str] = &["and", "div", "mod", "not", "or", "shl", "shr", "xor"];

static TABLE: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();

fn table() -> &'static HashMap<&'static str, TokenKind> {
    TABLE.get_or_init(|| {
        let mut map = HashMap::new();
        for word in WORDS {
            map.insert(*word, TokenKind::ReservedWord);
        }
        for word in OPERATOR_WORDS {
            map.insert(*word, TokenKind::Operation);
        }
        map
    })
}

/// Looks up `lower` (already lowercased) as a reserved word or reserved
/// operator; returns `None` when it's an ordinary identifier.
pub fn lookup(lower: &str) -> Option<TokenKind> {
    table().get(lower).copied()
}
