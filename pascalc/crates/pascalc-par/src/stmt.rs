//! Statement parsing: assignment, compound blocks, and the four control
//! structures (`for`, `while`, `repeat`/`until`, `if`/`then`/`else`).
//!
//! `for`/`while`/`repeat` conditions and the `for` loop variable must be
//! integer-typed; relational operators already produce an integer (booleans
//! are 0/1 integers, per the generator's `setcc`/`movzb` lowering), so no
//! promotion ever applies here.

use pascalc_util::{CompileError, Result};

use crate::ast::Stmt;
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt> {
        if self.at("begin") {
            self.bump()?;
            self.parse_block_body()
        } else if self.at("for") {
            self.parse_for()
        } else if self.at("while") {
            self.parse_while()
        } else if self.at("repeat") {
            self.parse_repeat()
        } else if self.at("if") {
            self.parse_if()
        } else {
            self.parse_assign_or_expr_stmt()
        }
    }

    /// Parses statements up to and including the matching `end`; assumes
    /// `begin` has already been consumed.
    pub(crate) fn parse_block_body(&mut self) -> Result<Stmt> {
        let mut stmts = Vec::new();
        if !self.at("end") {
            stmts.push(self.parse_stmt()?);
            while self.at(";") {
                self.bump()?;
                if self.at("end") {
                    break;
                }
                stmts.push(self.parse_stmt()?);
            }
        }
        self.expect_lexeme("end")?;
        Ok(Stmt::Block(stmts))
    }

    fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt> {
        let span = self.current_span();
        let expr = self.parse_expr()?;
        if self.at(":=") {
            self.bump()?;
            if !expr.is_lvalue() {
                return Err(CompileError::lvalue_expected(span, "expression"));
            }
            let rhs = self.parse_expr()?;
            let rhs = self.coerce_to(expr.ty(), rhs)?;
            Ok(Stmt::Assign { lhs: expr, rhs, span })
        } else {
            Ok(Stmt::ExprStmt(expr))
        }
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let span = self.current_span();
        self.bump()?; // 'for'
        let var_tok = self.expect_identifier()?;
        self.expect_lexeme(":=")?;
        let from = self.parse_expr()?;
        self.require_integer(&from)?;
        let downto = if self.at("downto") {
            self.bump()?;
            true
        } else {
            self.expect_lexeme("to")?;
            false
        };
        let to = self.parse_expr()?;
        self.require_integer(&to)?;
        self.expect_lexeme("do")?;

        let sym = self
            .scopes
            .lookup_or_error(var_tok.span, &var_tok.text, pascalc_sem::KIND_LVALUE)?;
        let var_ref = self.var_ref_of(sym);
        if !var_ref.ty().is_integer() {
            return Err(CompileError::integer_expression_expected(var_tok.span, var_tok.text.clone()));
        }

        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For { var: var_tok.text, var_ref, from, to, downto, body, span })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let span = self.current_span();
        self.bump()?; // 'while'
        let cond = self.parse_expr()?;
        self.require_integer(&cond)?;
        self.expect_lexeme("do")?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_repeat(&mut self) -> Result<Stmt> {
        let span = self.current_span();
        self.bump()?; // 'repeat'
        let mut stmts = Vec::new();
        if !self.at("until") {
            stmts.push(self.parse_stmt()?);
            while self.at(";") {
                self.bump()?;
                if self.at("until") {
                    break;
                }
                stmts.push(self.parse_stmt()?);
            }
        }
        self.expect_lexeme("until")?;
        let cond = self.parse_expr()?;
        self.require_integer(&cond)?;
        Ok(Stmt::RepeatUntil { body: Box::new(Stmt::Block(stmts)), cond, span })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let span = self.current_span();
        self.bump()?; // 'if'
        let cond = self.parse_expr()?;
        self.require_integer(&cond)?;
        self.expect_lexeme("then")?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.at("else") {
            self.bump()?;
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch, span })
    }
}
