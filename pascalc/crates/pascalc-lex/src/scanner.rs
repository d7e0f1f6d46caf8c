//! Turns a source string into a stream of [`Token`]s on demand.
//!
//! Grounded in `original_source/scanner.cpp`'s character-at-a-time state
//! machine (`NONE`/`IDENTIFIER`/`INTEGER`/`OPERATION`/`EOF`), extended with
//! a `HEX` state for `$` literals. Dispatch is by first character rather
//! than an explicit state enum.

use pascalc_util::{CompileError, Result, Span};

use crate::cursor::Cursor;
use crate::reserved;
use crate::token::{Token, TokenKind};

const TWO_CHAR_OPS: &[&str] = &["..", ":=", ">=", "<=", "<>"];

pub struct Scanner<'a> {
    cursor: Cursor<'a>,
    current: Token,
}

impl<'a> Scanner<'a> {
    /// Builds a scanner over `source` and performs the implicit first
    /// advance, so `current()` is always a real token.
    pub fn new(source: &'a str) -> Result<Self> {
        let mut scanner = Self {
            cursor: Cursor::new(source),
            current: Token::eof(Span::DUMMY),
        };
        scanner.current = scanner.scan_token()?;
        Ok(scanner)
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Produces and returns the next token, also making it `current()`.
    pub fn advance(&mut self) -> Result<Token> {
        let token = self.scan_token()?;
        self.current = token.clone();
        Ok(token)
    }

    fn scan_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;

        let span = Span::new(self.cursor.line(), self.cursor.column());
        if self.cursor.is_at_end() {
            return Ok(Token::eof(span));
        }

        match self.cursor.current() {
            c if c == '_' || c.is_alphabetic() => Ok(self.lex_identifier(span)),
            c if c.is_ascii_digit() => self.lex_number(span),
            '$' => self.lex_hex(span),
            '\'' | '#' => self.lex_string(span),
            _ => self.lex_operation(span),
        }
    }

    /// Skips whitespace, `//` line comments and non-nesting `{ }` block
    /// comments until a real token can start.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while self.cursor.current().is_whitespace() {
                self.cursor.advance();
            }

            if self.cursor.current() == '/' && self.cursor.peek(1) == '/' {
                while self.cursor.current() != '\n' && !self.cursor.is_at_end() {
                    self.cursor.advance();
                }
                continue;
            }

            if self.cursor.current() == '{' {
                let start = Span::new(self.cursor.line(), self.cursor.column());
                self.cursor.advance();
                loop {
                    if self.cursor.is_at_end() {
                        return Err(CompileError::unterminated_comment(start));
                    }
                    if self.cursor.advance() == '}' {
                        break;
                    }
                }
                continue;
            }

            break;
        }
        Ok(())
    }

    fn lex_identifier(&mut self, span: Span) -> Token {
        let mut text = String::new();
        while {
            let c = self.cursor.current();
            c.is_alphanumeric() || c == '_'
        } {
            text.push(self.cursor.advance());
        }
        let lower = text.to_lowercase();
        let kind = reserved::lookup(&lower).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, span)
    }

    fn lex_number(&mut self, span: Span) -> Result<Token> {
        let mut text = String::new();
        while self.cursor.current().is_ascii_digit() {
            text.push(self.cursor.advance());
        }

        let mut is_real = false;

        // A lone '.' starts a fractional part; '..' is the range operator
        // and must be left for the next token (array bounds like `1..5`).
        if self.cursor.current() == '.' && self.cursor.peek(1) != '.' {
            is_real = true;
            text.push(self.cursor.advance());
            while self.cursor.current().is_ascii_digit() {
                text.push(self.cursor.advance());
            }
        }

        if self.cursor.current() == 'e' || self.cursor.current() == 'E' {
            is_real = true;
            text.push(self.cursor.advance());
            if self.cursor.current() == '+' || self.cursor.current() == '-' {
                text.push(self.cursor.advance());
            }
            if !self.cursor.current().is_ascii_digit() {
                return Err(CompileError::malformed_exponent(span, text));
            }
            while self.cursor.current().is_ascii_digit() {
                text.push(self.cursor.advance());
            }
        }

        let kind = if is_real {
            TokenKind::RealConst
        } else {
            TokenKind::IntConst
        };
        Ok(Token::new(kind, text, span))
    }

    fn lex_hex(&mut self, span: Span) -> Result<Token> {
        self.cursor.advance(); // '$'
        let mut text = String::new();
        while self.cursor.current().is_ascii_hexdigit() {
            text.push(self.cursor.advance());
        }
        if text.is_empty() {
            return Err(CompileError::empty_hex_literal(span));
        }
        Ok(Token::new(TokenKind::HexConst, text, span))
    }

    /// A string literal is a concatenation of `'...'` quoted runs (with
    /// `''` as an embedded quote) and `#N` character codes.
    fn lex_string(&mut self, span: Span) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.cursor.current() {
                '\'' => {
                    self.cursor.advance();
                    loop {
                        match self.cursor.current() {
                            '\0' | '\n' => return Err(CompileError::unterminated_string(span)),
                            '\'' => {
                                self.cursor.advance();
                                if self.cursor.current() == '\'' {
                                    text.push('\'');
                                    self.cursor.advance();
                                } else {
                                    break;
                                }
                            }
                            c => {
                                text.push(c);
                                self.cursor.advance();
                            }
                        }
                    }
                }
                '#' => {
                    self.cursor.advance();
                    let mut digits = String::new();
                    while self.cursor.current().is_ascii_digit() {
                        digits.push(self.cursor.advance());
                    }
                    if digits.is_empty() {
                        return Err(CompileError::unexpected_token(span, "#"));
                    }
                    let code: u32 = digits.parse().expect("digits are ascii digits");
                    text.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
                _ => break,
            }
        }
        Ok(Token::new(TokenKind::StringConst, text, span))
    }

    fn lex_operation(&mut self, span: Span) -> Result<Token> {
        let first = self.cursor.advance();
        let pair: String = [first, self.cursor.current()].iter().collect();

        if TWO_CHAR_OPS.contains(&pair.as_str()) {
            self.cursor.advance();
            let kind = if pair == ".." {
                TokenKind::ReservedWord
            } else {
                TokenKind::Operation
            };
            return Ok(Token::new(kind, pair, span));
        }

        let kind = match first {
            ';' | ':' | ',' => TokenKind::Delimiter,
            '-' | '+' | '*' | '/' | '[' | ']' | '.' | '^' | '@' | '(' | ')' | '>' | '<' | '=' => {
                TokenKind::Operation
            }
            other => return Err(CompileError::illegal_character(span, other)),
        };
        Ok(Token::new(kind, first.to_string(), span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source).unwrap();
        let mut out = vec![scanner.current().kind];
        while out.last() != Some(&TokenKind::Eof) {
            out.push(scanner.advance().unwrap().kind);
        }
        out
    }

    #[test]
    fn identifiers_and_reserved_words() {
        let mut scanner = Scanner::new("begin foo end").unwrap();
        assert_eq!(scanner.current().kind, TokenKind::ReservedWord);
        assert_eq!(scanner.current().lower, "begin");
        let foo = scanner.advance().unwrap();
        assert_eq!(foo.kind, TokenKind::Identifier);
        assert_eq!(foo.text, "foo");
        let end = scanner.advance().unwrap();
        assert_eq!(end.kind, TokenKind::ReservedWord);
        assert_eq!(end.lower, "end");
    }

    #[test]
    fn integer_and_real_literals() {
        let mut scanner = Scanner::new("42 3.14 2e10").unwrap();
        assert_eq!(scanner.current().kind, TokenKind::IntConst);
        assert_eq!(scanner.current().text, "42");
        let real = scanner.advance().unwrap();
        assert_eq!(real.kind, TokenKind::RealConst);
        assert_eq!(real.text, "3.14");
        let exp = scanner.advance().unwrap();
        assert_eq!(exp.kind, TokenKind::RealConst);
        assert_eq!(exp.text, "2e10");
    }

    #[test]
    fn range_dots_do_not_start_a_real_literal() {
        let toks = kinds("1..5");
        assert_eq!(
            toks,
            vec![
                TokenKind::IntConst,
                TokenKind::ReservedWord,
                TokenKind::IntConst,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn hex_literal_requires_a_digit() {
        let mut scanner = Scanner::new("$2A").unwrap();
        assert_eq!(scanner.current().kind, TokenKind::HexConst);
        assert_eq!(scanner.current().text, "2A");
        assert!(Scanner::new("$").is_err());
    }

    #[test]
    fn string_literal_concatenation() {
        let mut scanner = Scanner::new("'it''s'#32'ok'").unwrap();
        let tok = scanner.current();
        assert_eq!(tok.kind, TokenKind::StringConst);
        assert_eq!(tok.text, "it's ok");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Scanner::new("'abc").is_err());
        assert!(Scanner::new("'abc\n'").is_err());
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(Scanner::new("{ comment").is_err());
    }

    #[test]
    fn line_comment_runs_to_newline() {
        let mut scanner = Scanner::new("1 // trailing\n2").unwrap();
        assert_eq!(scanner.current().text, "1");
        let next = scanner.advance().unwrap();
        assert_eq!(next.text, "2");
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        let toks = kinds(":= >= <= <>");
        assert_eq!(toks.len(), 5); // 4 operators + Eof
        assert!(toks.iter().all(|k| *k == TokenKind::Operation || *k == TokenKind::Eof));
    }
}
