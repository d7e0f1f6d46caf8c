//! Recursive-descent parser fused with type checking and scope tracking.
//!
//! There is no separate semantic pass: every AST node is built with its
//! type and l-value-ness already resolved, consulting
//! `pascalc_sem::ScopeStack` inline as declarations and references are
//! parsed, rather than producing an untyped tree for a later checker to
//! walk.

mod ast;
mod expr;
mod items;
mod stmt;
mod types;

pub use ast::{
    BinaryOp, Expr, GlobalVar, Program, Routine, RoutineRef, Stmt, UnaryOp, VarRef,
};

use pascalc_lex::{Scanner, Token, TokenKind};
use pascalc_sem::{ScopeStack, Scope, Symbol, SymbolKind, TypeRef};
use pascalc_util::{CompileError, Result, Span};

/// Parses a complete program from source text.
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source)?.parse_program().map(|(program, _)| program)
}

/// As [`parse`], but also hands back the top-level scope (globals, types
/// and routine names) for callers that need to print a symbol table —
/// `parse_program` pops and discards it once the program is fully parsed,
/// since nothing downstream of parsing consults it by name again.
pub fn parse_with_scope(source: &str) -> Result<(Program, Scope)> {
    Parser::new(source)?.parse_program()
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    scopes: ScopeStack,
    ty_integer: TypeRef,
    ty_real: TypeRef,
    ty_untyped: TypeRef,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self> {
        let scanner = Scanner::new(source)?;
        let scopes = ScopeStack::new();
        let ty_integer = Self::builtin_type(&scopes, "integer");
        let ty_real = Self::builtin_type(&scopes, "real");
        let ty_untyped = Self::builtin_type(&scopes, "untyped");
        Ok(Self {
            scanner,
            scopes,
            ty_integer,
            ty_real,
            ty_untyped,
        })
    }

    fn builtin_type(scopes: &ScopeStack, name: &str) -> TypeRef {
        match scopes.lookup(name).expect("seeded by ScopeStack::new").kind {
            SymbolKind::Type(ref ty) => ty.clone(),
            _ => unreachable!("builtin names always resolve to a Type symbol"),
        }
    }

    pub fn parse_program(&mut self) -> Result<(Program, Scope)> {
        self.expect_lexeme("program")?;
        self.expect_identifier()?;
        self.expect_lexeme(";")?;

        self.scopes.push(Scope::new());

        let mut globals = Vec::new();
        let mut routines = Vec::new();
        loop {
            if self.at("var") {
                self.parse_global_var_section(&mut globals)?;
            } else if self.at("type") {
                self.parse_type_section()?;
            } else if self.at("procedure") || self.at("function") {
                routines.push(self.parse_routine_decl()?);
            } else {
                break;
            }
        }

        self.expect_lexeme("begin")?;
        let main = self.parse_block_body()?;
        self.expect_lexeme(".")?;
        self.expect_eof()?;

        let global_scope = self.scopes.pop();
        Ok((Program { globals, routines, main }, global_scope))
    }

    fn current(&self) -> &Token {
        self.scanner.current()
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn current_lexeme(&self) -> String {
        self.current().text.clone()
    }

    fn cur_is_identifier(&self) -> bool {
        self.current().is(TokenKind::Identifier)
    }

    fn at_int_const(&self) -> bool {
        self.current().is(TokenKind::IntConst)
    }

    /// True if the current token's canonical spelling is `lexeme`, whatever
    /// its kind (keyword, operator or delimiter).
    fn at(&self, lexeme: &str) -> bool {
        self.current().is_lexeme(lexeme)
    }

    fn bump(&mut self) -> Result<Token> {
        let tok = self.current().clone();
        self.scanner.advance()?;
        Ok(tok)
    }

    fn expect_lexeme(&mut self, lexeme: &str) -> Result<Token> {
        if self.at(lexeme) {
            self.bump()
        } else {
            Err(CompileError::expected(
                self.current_span(),
                self.current_lexeme(),
                lexeme,
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<Token> {
        if self.cur_is_identifier() {
            self.bump()
        } else {
            Err(CompileError::expected(
                self.current_span(),
                self.current_lexeme(),
                "an identifier",
            ))
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        if self.current().is(TokenKind::Eof) {
            Ok(())
        } else {
            Err(CompileError::expected(
                self.current_span(),
                self.current_lexeme(),
                "end of file",
            ))
        }
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<Token>> {
        let mut out = vec![self.expect_identifier()?];
        while self.at(",") {
            self.bump()?;
            out.push(self.expect_identifier()?);
        }
        Ok(out)
    }

    /// Resolves an already-looked-up variable symbol into a storage snapshot.
    fn var_ref_of(&self, sym: &Symbol) -> VarRef {
        match &sym.kind {
            SymbolKind::Global { ty, label } => VarRef::Global {
                label: label.clone(),
                ty: ty.clone(),
            },
            SymbolKind::Local { ty, offset } => VarRef::Local {
                offset: *offset,
                ty: ty.clone(),
            },
            SymbolKind::Param { ty, by_ref, offset } => VarRef::Param {
                offset: *offset,
                by_ref: *by_ref,
                ty: ty.clone(),
            },
            _ => unreachable!("var_ref_of is only called on KIND_LVALUE symbols"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_program_has_no_globals_no_routines() {
        let program = parse("program p;\nbegin\nend.").unwrap();
        assert!(program.globals.is_empty());
        assert!(program.routines.is_empty());
    }

    #[test]
    fn var_section_declares_one_global_per_identifier() {
        let program = parse("program p;\nvar a,b,c:integer;\nbegin\nend.").unwrap();
        assert_eq!(program.globals.len(), 3);
        let labels: std::collections::HashSet<_> =
            program.globals.iter().map(|g| g.label.clone()).collect();
        assert_eq!(labels.len(), 3, "each global should get a distinct label");
    }

    #[test]
    fn parse_with_scope_hands_back_the_populated_top_level_scope() {
        let (program, scope) = parse_with_scope("program p;\nvar a:integer;\nbegin\nend.").unwrap();
        assert_eq!(program.globals.len(), 1);
        let a = scope.get("a").expect("global 'a' should be in the returned scope");
        assert!(matches!(a.kind, SymbolKind::Global { .. }));
    }

    #[test]
    fn duplicate_global_identifier_is_rejected() {
        let err = parse("program p;\nvar a,a:integer;\nbegin\nend.").unwrap_err();
        assert!(err.to_string().contains("duplicate identifier"));
    }

    #[test]
    fn undeclared_identifier_reports_not_found() {
        let err = parse("program p;\nbegin\n  a:=1;\nend.").unwrap_err();
        assert!(err.to_string().contains("identifier not found"));
    }

    #[test]
    fn missing_program_keyword_is_a_parse_error() {
        let err = parse("begin end.").unwrap_err();
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn procedure_declarations_are_collected_as_routines() {
        let program = parse(concat!(
            "program p;\n",
            "procedure greet;\n",
            "begin\n",
            "end;\n",
            "begin\n",
            "  greet;\n",
            "end."
        ))
        .unwrap();
        assert_eq!(program.routines.len(), 1);
        assert_eq!(program.routines[0].name, "greet");
    }

    #[test]
    fn routine_labels_are_distinct_from_each_other_and_from_globals() {
        let program = parse(concat!(
            "program p;\n",
            "var a:integer;\n",
            "procedure one;\n",
            "begin\n",
            "end;\n",
            "procedure two;\n",
            "begin\n",
            "end;\n",
            "begin\n",
            "end."
        ))
        .unwrap();
        let mut labels: Vec<&str> = program.routines.iter().map(|r| r.label.as_str()).collect();
        labels.push(program.globals[0].label.as_str());
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }
}
