//! Type-specifier parsing: named types, `array[lo..hi] of T`, `record ...
//! end`, and the reserved-but-rejected `^T` pointer syntax.

use std::rc::Rc;

use pascalc_sem::{Scope, Symbol, SymbolKind, Type, TypeRef, KIND_TYPE};
use pascalc_util::{CompileError, Result};

use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef> {
        if self.at("array") {
            self.bump()?;
            self.expect_lexeme("[")?;
            let low = self.parse_int_literal()?;
            self.expect_lexeme("..")?;
            let high = self.parse_int_literal()?;
            self.expect_lexeme("]")?;
            self.expect_lexeme("of")?;
            let element = self.parse_type()?;
            Ok(Rc::new(Type::Array { element, low, high }))
        } else if self.at("record") {
            self.bump()?;
            let mut fields = Scope::new();
            while self.cur_is_identifier() {
                let names = self.parse_identifier_list()?;
                self.expect_lexeme(":")?;
                let ty = self.parse_type()?;
                self.expect_lexeme(";")?;
                for name in names {
                    let offset = fields.next_local_offset();
                    fields.insert(
                        name.span,
                        Symbol::new(name.text, SymbolKind::Local { ty: ty.clone(), offset }),
                    )?;
                }
            }
            self.expect_lexeme("end")?;
            Ok(Rc::new(Type::Record { fields }))
        } else if self.at("^") {
            let span = self.current_span();
            self.bump()?;
            self.parse_type()?;
            Err(CompileError::pointers_not_implemented(span, "^"))
        } else if self.cur_is_identifier() {
            let tok = self.bump()?;
            let sym = self.scopes.lookup_or_error(tok.span, &tok.text, KIND_TYPE)?;
            match &sym.kind {
                SymbolKind::Type(ty) => Ok(ty.clone()),
                _ => unreachable!("KIND_TYPE only matches SymbolKind::Type"),
            }
        } else {
            Err(CompileError::expected(
                self.current_span(),
                self.current_lexeme(),
                "a type",
            ))
        }
    }

    /// Array bounds are literal (optionally negative) integers, never a
    /// general expression.
    pub(crate) fn parse_int_literal(&mut self) -> Result<i32> {
        let negative = self.at("-");
        if negative {
            self.bump()?;
        }
        let span = self.current_span();
        if !self.at_int_const() {
            return Err(CompileError::non_integer_array_bound(span, self.current_lexeme()));
        }
        let tok = self.bump()?;
        let value: i32 = tok
            .text
            .parse()
            .map_err(|_| CompileError::non_integer_array_bound(span, tok.text.clone()))?;
        Ok(if negative { -value } else { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_type_carries_its_bounds_and_element_type() {
        let mut parser = Parser::new("array[1..5] of integer").unwrap();
        let ty = parser.parse_type().unwrap();
        match ty.as_ref() {
            Type::Array { low, high, element } => {
                assert_eq!(*low, 1);
                assert_eq!(*high, 5);
                assert!(element.is_integer());
            }
            other => panic!("expected an array type, got {other:?}"),
        }
    }

    #[test]
    fn array_bounds_may_be_negative() {
        let mut parser = Parser::new("array[-3..3] of integer").unwrap();
        let ty = parser.parse_type().unwrap();
        match ty.as_ref() {
            Type::Array { low, high, .. } => {
                assert_eq!(*low, -3);
                assert_eq!(*high, 3);
            }
            other => panic!("expected an array type, got {other:?}"),
        }
    }

    #[test]
    fn record_type_lays_out_fields_at_increasing_offsets() {
        let mut parser = Parser::new("record x,y:integer end").unwrap();
        let ty = parser.parse_type().unwrap();
        match ty.as_ref() {
            Type::Record { fields } => {
                let x = fields.get("x").unwrap();
                let y = fields.get("y").unwrap();
                match (&x.kind, &y.kind) {
                    (SymbolKind::Local { offset: ox, .. }, SymbolKind::Local { offset: oy, .. }) => {
                        assert!(oy > ox);
                    }
                    _ => panic!("record fields should be Local symbols"),
                }
            }
            other => panic!("expected a record type, got {other:?}"),
        }
    }

    #[test]
    fn pointer_types_are_rejected() {
        let mut parser = Parser::new("^integer").unwrap();
        let err = parser.parse_type().unwrap_err();
        assert!(err.to_string().to_lowercase().contains("pointer"));
    }
}
