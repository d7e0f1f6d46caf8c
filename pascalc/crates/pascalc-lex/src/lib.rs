//! pascalc-lex - scanner and token types for the Pascal subset.
//!
//! Turns a source string into `Token`s on demand: `Scanner::new` performs
//! the implicit first advance, `Scanner::advance` produces each subsequent
//! one. There is no separate tokenize-everything-up-front pass; the parser
//! drives the scanner one token at a time.

mod cursor;
mod reserved;
mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};
