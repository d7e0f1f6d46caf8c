//! Top-level declarations: `var` and `type` sections, and procedure/function
//! declarations.
//!
//! Routines do not support self-recursion or forward references: a
//! routine's own symbol is declared into the enclosing scope only after its
//! body has been fully parsed and its scope popped. `original_source`'s
//! grammar has no forward-declaration syntax either; this is the natural
//! consequence of that for a single-pass parser that can't yet know a
//! routine's signature while parsing its own body.
//!
//! Inside a function's body, though, its own name is aliased to the
//! phantom `result` slot (see `parse_routine_decl`), so `sq := n*n` inside
//! `function sq` sets the return value exactly like `result := n*n` would.

use std::rc::Rc;

use pascalc_sem::{RoutineSig, Scope, Symbol, SymbolKind, Type, TypeRef};
use pascalc_util::{Result, Span};

use crate::ast::{GlobalVar, Routine};
use crate::Parser;

impl<'a> Parser<'a> {
    fn parse_var_decl_group(&mut self) -> Result<(Vec<pascalc_lex::Token>, TypeRef)> {
        let names = self.parse_identifier_list()?;
        self.expect_lexeme(":")?;
        let ty = self.parse_type()?;
        self.expect_lexeme(";")?;
        Ok((names, ty))
    }

    pub(crate) fn parse_global_var_section(&mut self, globals: &mut Vec<GlobalVar>) -> Result<()> {
        self.bump()?; // 'var'
        while self.cur_is_identifier() {
            let (names, ty) = self.parse_var_decl_group()?;
            for name in names {
                let label = format!("var_{}", name.lower);
                self.scopes.declare(
                    name.span,
                    Symbol::new(
                        name.text,
                        SymbolKind::Global { ty: ty.clone(), label: label.clone() },
                    ),
                )?;
                globals.push(GlobalVar { label, ty: ty.clone() });
            }
        }
        Ok(())
    }

    pub(crate) fn parse_local_var_section(&mut self) -> Result<()> {
        self.bump()?; // 'var'
        while self.cur_is_identifier() {
            let (names, ty) = self.parse_var_decl_group()?;
            for name in names {
                let offset = self.scopes.current().next_local_offset();
                self.scopes.declare(
                    name.span,
                    Symbol::new(name.text, SymbolKind::Local { ty: ty.clone(), offset }),
                )?;
            }
        }
        Ok(())
    }

    pub(crate) fn parse_type_section(&mut self) -> Result<()> {
        self.bump()?; // 'type'
        while self.cur_is_identifier() {
            let name = self.expect_identifier()?;
            self.expect_lexeme("=")?;
            let target = self.parse_type()?;
            self.expect_lexeme(";")?;
            let alias = Rc::new(Type::Alias { name: name.text.clone(), target });
            self.scopes
                .declare(name.span, Symbol::new(name.text, SymbolKind::Type(alias)))?;
        }
        Ok(())
    }

    pub(crate) fn parse_routine_decl(&mut self) -> Result<Routine> {
        let is_function = self.at("function");
        self.bump()?; // 'procedure' | 'function'
        let name_tok = self.expect_identifier()?;
        let label = format!("proc_{}", name_tok.lower);

        let mut scope = Scope::new();
        let mut param_count = 0usize;
        if self.at("(") {
            self.bump()?;
            if !self.at(")") {
                loop {
                    let by_ref = self.at("var");
                    if by_ref {
                        self.bump()?;
                    }
                    let names = self.parse_identifier_list()?;
                    self.expect_lexeme(":")?;
                    let ty = self.parse_type()?;
                    for name in names {
                        let offset = scope.next_param_offset();
                        scope.insert(
                            name.span,
                            Symbol::new(
                                name.text,
                                SymbolKind::Param { ty: ty.clone(), by_ref, offset },
                            ),
                        )?;
                        param_count += 1;
                    }
                    if self.at(";") {
                        self.bump()?;
                    } else {
                        break;
                    }
                }
            }
            self.expect_lexeme(")")?;
        }

        let result_ty = if is_function {
            self.expect_lexeme(":")?;
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect_lexeme(";")?;

        if let Some(ty) = &result_ty {
            let offset = scope.next_param_offset();
            scope.insert(
                Span::DUMMY,
                Symbol::new("result", SymbolKind::Param { ty: ty.clone(), by_ref: false, offset }),
            )?;
            // a function's own name is also bound to the phantom result
            // slot, so `sq := n*n` inside `function sq` resolves the same
            // way `result := n*n` does.
            if name_tok.lower != "result" {
                scope.alias_param(Span::DUMMY, name_tok.text.clone(), ty.clone(), offset)?;
            }
        }

        self.scopes.push(scope);

        loop {
            if self.at("var") {
                self.parse_local_var_section()?;
            } else if self.at("type") {
                self.parse_type_section()?;
            } else {
                break;
            }
        }
        self.expect_lexeme("begin")?;
        let body = self.parse_block_body()?;
        self.expect_lexeme(";")?;

        let scope = self.scopes.pop();
        let sig = Rc::new(RoutineSig { label: label.clone(), scope, result: result_ty, param_count });
        let kind = if is_function {
            SymbolKind::Function(sig.clone())
        } else {
            SymbolKind::Procedure(sig.clone())
        };
        self.scopes.declare(name_tok.span, Symbol::new(name_tok.text.clone(), kind))?;

        Ok(Routine { name: name_tok.text, label, sig, body })
    }
}
