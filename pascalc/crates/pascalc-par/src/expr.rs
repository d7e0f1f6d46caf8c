//! Expression parsing: the classic Pascal precedence chain
//! (relational < additive < multiplicative < unary < postfix < factor),
//! with type checking fused in at every construction site.
//!
//! Only one side of a binary or assignment pair is ever promoted, and only
//! int-to-real; anything else is an error on the spot.

use std::rc::Rc;

use pascalc_lex::{Token, TokenKind};
use pascalc_sem::{Symbol, SymbolKind, Type, TypeRef, KIND_CALLABLE, KIND_LVALUE};
use pascalc_util::{CompileError, Result, Span};

use crate::ast::{BinaryOp, Expr, RoutineRef, UnaryOp};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_relational()
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.relational_op() {
            let span = self.current_span();
            self.bump()?;
            let rhs = self.parse_additive()?;
            lhs = self.build_binary(op, lhs, rhs, span)?;
        }
        Ok(lhs)
    }

    fn relational_op(&self) -> Option<BinaryOp> {
        let tok = self.current();
        if !tok.is(TokenKind::Operation) {
            return None;
        }
        match tok.lower.as_str() {
            "=" => Some(BinaryOp::Eq),
            "<>" => Some(BinaryOp::Ne),
            "<" => Some(BinaryOp::Lt),
            ">" => Some(BinaryOp::Gt),
            "<=" => Some(BinaryOp::Le),
            ">=" => Some(BinaryOp::Ge),
            _ => None,
        }
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let tok = self.current();
            let op = if tok.is(TokenKind::Operation) {
                match tok.lower.as_str() {
                    "+" => Some(BinaryOp::Add),
                    "-" => Some(BinaryOp::Sub),
                    "or" => Some(BinaryOp::Or),
                    _ => None,
                }
            } else {
                None
            };
            let Some(op) = op else { break };
            let span = self.current_span();
            self.bump()?;
            let rhs = self.parse_multiplicative()?;
            lhs = self.build_binary(op, lhs, rhs, span)?;
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let tok = self.current();
            let op = if tok.is(TokenKind::Operation) {
                match tok.lower.as_str() {
                    "*" => Some(BinaryOp::Mul),
                    "/" => Some(BinaryOp::FDiv),
                    "div" => Some(BinaryOp::Div),
                    "mod" => Some(BinaryOp::Mod),
                    "and" => Some(BinaryOp::And),
                    "shl" => Some(BinaryOp::Shl),
                    "shr" => Some(BinaryOp::Shr),
                    "xor" => Some(BinaryOp::Xor),
                    _ => None,
                }
            } else {
                None
            };
            let Some(op) = op else { break };
            let span = self.current_span();
            self.bump()?;
            let rhs = self.parse_unary()?;
            lhs = self.build_binary(op, lhs, rhs, span)?;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let tok = self.current().clone();
        if tok.is(TokenKind::Operation) && matches!(tok.lower.as_str(), "-" | "+" | "not") {
            let span = tok.span;
            self.bump()?;
            let operand = self.parse_unary()?;
            let op = match tok.lower.as_str() {
                "-" => UnaryOp::Neg,
                "+" => UnaryOp::Plus,
                _ => UnaryOp::Not,
            };
            let ty = if op == UnaryOp::Not {
                self.require_integer(&operand)?;
                operand.ty().clone()
            } else {
                if !operand.ty().is_integer() && !operand.ty().is_real() {
                    return Err(CompileError::incompatible_types(
                        span,
                        tok.text,
                        operand.ty().describe(),
                        "a numeric type",
                    ));
                }
                operand.ty().clone()
            };
            return Ok(Expr::Unary { op, operand: Box::new(operand), ty, span });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_factor()?;
        if matches!(expr, Expr::Write { .. }) {
            return Ok(expr);
        }
        loop {
            if self.at("[") {
                let span = self.current_span();
                self.bump()?;
                let index_expr = self.parse_expr()?;
                self.expect_lexeme("]")?;
                self.require_integer(&index_expr)?;
                let base_ty = expr.ty().actual();
                let (element, low) = match base_ty.as_ref() {
                    Type::Array { element, low, .. } => (element.clone(), *low),
                    other => {
                        return Err(CompileError::illegal_qualifier(span, other.describe()));
                    }
                };
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index_expr),
                    low,
                    ty: element,
                    span,
                };
            } else if self.at(".") {
                let span = self.current_span();
                self.bump()?;
                let field_tok = self.expect_identifier()?;
                let base_ty = expr.ty().actual();
                let fields = match base_ty.as_ref() {
                    Type::Record { fields } => fields,
                    other => return Err(CompileError::illegal_qualifier(span, other.describe())),
                };
                let field_sym = fields
                    .get(&field_tok.lower)
                    .ok_or_else(|| CompileError::unknown_field(field_tok.span, field_tok.text.clone()))?;
                let (offset, ty) = match &field_sym.kind {
                    SymbolKind::Local { ty, offset } => (*offset, ty.clone()),
                    _ => unreachable!("record fields are always Local symbols"),
                };
                expr = Expr::Field { base: Box::new(expr), name: field_tok.text, offset, ty, span };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::IntConst => {
                self.bump()?;
                let value: i64 = tok
                    .text
                    .parse()
                    .map_err(|_| CompileError::unexpected_token(tok.span, tok.text.clone()))?;
                Ok(Expr::IntConst { value, ty: self.ty_integer.clone(), span: tok.span })
            }
            TokenKind::HexConst => {
                self.bump()?;
                let value = i64::from_str_radix(&tok.text, 16)
                    .map_err(|_| CompileError::unexpected_token(tok.span, tok.text.clone()))?;
                Ok(Expr::IntConst { value, ty: self.ty_integer.clone(), span: tok.span })
            }
            TokenKind::RealConst => {
                self.bump()?;
                let value: f64 = tok
                    .text
                    .parse()
                    .map_err(|_| CompileError::unexpected_token(tok.span, tok.text.clone()))?;
                Ok(Expr::RealConst { value, ty: self.ty_real.clone(), span: tok.span })
            }
            TokenKind::StringConst => {
                self.bump()?;
                Ok(Expr::StringConst { value: tok.text.clone(), ty: self.ty_untyped.clone(), span: tok.span })
            }
            TokenKind::Identifier => self.parse_identifier_factor(),
            _ if self.at("(") => {
                self.bump()?;
                let inner = self.parse_expr()?;
                self.expect_lexeme(")")?;
                Ok(inner)
            }
            _ => Err(CompileError::unexpected_token(tok.span, tok.text)),
        }
    }

    fn parse_identifier_factor(&mut self) -> Result<Expr> {
        let tok = self.bump()?;
        if tok.lower == "write" || tok.lower == "writeln" {
            return self.parse_write(tok);
        }
        let sym = self.scopes.lookup_or_error(tok.span, &tok.text, KIND_LVALUE | KIND_CALLABLE)?;
        if sym.is(KIND_CALLABLE) {
            let sig = match &sym.kind {
                SymbolKind::Procedure(sig) | SymbolKind::Function(sig) => sig.clone(),
                _ => unreachable!("KIND_CALLABLE only matches routine symbols"),
            };
            let label = sig.label.clone();
            return self.parse_call(tok, label, sig);
        }
        let var_ref = self.var_ref_of(sym);
        Ok(Expr::Var { name: tok.text, var: var_ref, span: tok.span })
    }

    fn parse_call(
        &mut self,
        name_tok: Token,
        label: String,
        sig: Rc<pascalc_sem::RoutineSig>,
    ) -> Result<Expr> {
        let mut args = Vec::new();
        if self.at("(") {
            self.bump()?;
            if !self.at(")") {
                loop {
                    args.push(self.parse_expr()?);
                    if self.at(",") {
                        self.bump()?;
                    } else {
                        break;
                    }
                }
            }
            self.expect_lexeme(")")?;
        }

        // declared params come first, in order, followed by the phantom
        // `result` slot and (for functions) its alias to the routine's own
        // name; `param_count` is exactly the former.
        let formals: Vec<&Symbol> = sig
            .scope
            .iter()
            .filter(|s| matches!(&s.kind, SymbolKind::Param { .. }))
            .take(sig.param_count)
            .collect();

        if args.len() < formals.len() {
            return Err(CompileError::too_few_params(name_tok.span, name_tok.text.clone()));
        }
        if args.len() > formals.len() {
            return Err(CompileError::too_many_params(name_tok.span, name_tok.text.clone()));
        }

        let mut checked_args = Vec::with_capacity(args.len());
        for (formal, actual) in formals.iter().zip(args.into_iter()) {
            let (formal_ty, by_ref) = match &formal.kind {
                SymbolKind::Param { ty, by_ref, .. } => (ty.clone(), *by_ref),
                _ => unreachable!(),
            };
            if by_ref && !actual.is_lvalue() {
                return Err(CompileError::lvalue_expected(actual.span(), "expression"));
            }
            checked_args.push(self.coerce_to(&formal_ty, actual)?);
        }

        let ty = sig.result.clone().unwrap_or_else(|| self.ty_untyped.clone());
        Ok(Expr::Call { routine: RoutineRef { label, sig }, args: checked_args, ty, span: name_tok.span })
    }

    fn parse_write(&mut self, name_tok: Token) -> Result<Expr> {
        let newline = name_tok.lower == "writeln";
        let mut args = Vec::new();
        if self.at("(") {
            self.bump()?;
            if !self.at(")") {
                loop {
                    args.push(self.parse_expr()?);
                    if self.at(",") {
                        self.bump()?;
                    } else {
                        break;
                    }
                }
            }
            self.expect_lexeme(")")?;
        }
        Ok(Expr::Write { args, newline, span: name_tok.span })
    }

    pub(crate) fn require_integer(&self, expr: &Expr) -> Result<()> {
        if expr.ty().is_integer() {
            Ok(())
        } else {
            Err(CompileError::integer_expression_expected(expr.span(), expr.ty().describe()))
        }
    }

    /// Coerces `expr` to `target`, inserting an `IntToReal` promotion when
    /// `target` is real and `expr` is integer; anything else that doesn't
    /// already match is an error.
    pub(crate) fn coerce_to(&self, target: &TypeRef, expr: Expr) -> Result<Expr> {
        if Type::same_actual_type(target, expr.ty()) {
            return Ok(expr);
        }
        if target.is_real() && expr.ty().is_integer() {
            let span = expr.span();
            return Ok(Expr::IntToReal { operand: Box::new(expr), ty: target.clone(), span });
        }
        Err(CompileError::incompatible_types(
            expr.span(),
            "assignment",
            target.describe(),
            expr.ty().describe(),
        ))
    }

    fn build_binary(&self, op: BinaryOp, lhs: Expr, rhs: Expr, span: Span) -> Result<Expr> {
        match op {
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                let (lhs, rhs) = self.unify_binary(lhs, rhs, span)?;
                Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), ty: self.ty_integer.clone(), span })
            }
            BinaryOp::FDiv => {
                let lhs = self.coerce_to(&self.ty_real.clone(), lhs)?;
                let rhs = self.coerce_to(&self.ty_real.clone(), rhs)?;
                Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), ty: self.ty_real.clone(), span })
            }
            BinaryOp::Div | BinaryOp::Mod | BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::Shl
            | BinaryOp::Shr => {
                self.require_integer(&lhs)?;
                self.require_integer(&rhs)?;
                Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), ty: self.ty_integer.clone(), span })
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                let (lhs, rhs) = self.unify_binary(lhs, rhs, span)?;
                let ty = lhs.ty().clone();
                Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), ty, span })
            }
        }
    }

    /// Promotes exactly one side from int to real when the two operand
    /// types differ; anything else is an error.
    fn unify_binary(&self, lhs: Expr, rhs: Expr, span: Span) -> Result<(Expr, Expr)> {
        if Type::same_actual_type(lhs.ty(), rhs.ty()) {
            return Ok((lhs, rhs));
        }
        if lhs.ty().is_integer() && rhs.ty().is_real() {
            let lspan = lhs.span();
            let lhs = Expr::IntToReal { operand: Box::new(lhs), ty: self.ty_real.clone(), span: lspan };
            return Ok((lhs, rhs));
        }
        if lhs.ty().is_real() && rhs.ty().is_integer() {
            let rspan = rhs.span();
            let rhs = Expr::IntToReal { operand: Box::new(rhs), ty: self.ty_real.clone(), span: rspan };
            return Ok((lhs, rhs));
        }
        Err(CompileError::incompatible_types(
            span,
            "expression",
            lhs.ty().describe(),
            rhs.ty().describe(),
        ))
    }
}
