//! Lexically-scoped symbol tables.
//!
//! A plain `Vec` stack of `IndexMap`s rather than a rib arena with
//! parent-chain links: scopes need to stay insertion-ordered (the generator
//! wants declaration order for stable routine emission) and track two
//! running byte totals, not form a graph of out-of-line definitions.

use indexmap::IndexMap;
use pascalc_util::{CompileError, Result, Span};

use crate::symbol::{KindMask, Symbol, SymbolKind};

/// One lexical scope: the top level, a routine body, or a record's field list.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: IndexMap<String, Symbol>,
    /// Running total of parameter bytes declared so far (includes the
    /// phantom `Result` slot once a function has been entered).
    pub params_size: u32,
    /// Running total of local-variable bytes declared so far.
    pub locals_size: u32,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `symbol`, rejecting a duplicate name in this scope and
    /// bumping `params_size`/`locals_size` when it is a parameter or local.
    pub fn insert(&mut self, span: Span, symbol: Symbol) -> Result<()> {
        if self.bindings.contains_key(&symbol.lower) {
            return Err(CompileError::duplicate_identifier(span, symbol.name));
        }
        match &symbol.kind {
            SymbolKind::Param { ty, .. } => self.params_size += ty.size(),
            SymbolKind::Local { ty, .. } => self.locals_size += ty.size(),
            _ => {}
        }
        self.bindings.insert(symbol.lower.clone(), symbol);
        Ok(())
    }

    /// Next parameter offset, growing positively from `+8`.
    pub fn next_param_offset(&self) -> u32 {
        8 + self.params_size
    }

    /// Next local offset, growing from `0`; the generator turns this into
    /// `%ebp - offset - 4`.
    pub fn next_local_offset(&self) -> u32 {
        self.locals_size
    }

    /// Binds `name` to a copy of an already-accounted-for parameter slot,
    /// without touching `params_size`/`locals_size` again. Used to make a
    /// function's own name resolve to its phantom `Result` slot inside its
    /// body, alongside the `result` binding itself.
    pub fn alias_param(&mut self, span: Span, name: impl Into<String>, ty: crate::types::TypeRef, offset: u32) -> Result<()> {
        let symbol = Symbol::new(name, SymbolKind::Param { ty, by_ref: false, offset });
        if self.bindings.contains_key(&symbol.lower) {
            return Err(CompileError::duplicate_identifier(span, symbol.name));
        }
        self.bindings.insert(symbol.lower.clone(), symbol);
        Ok(())
    }

    pub fn get(&self, lower: &str) -> Option<&Symbol> {
        self.bindings.get(lower)
    }

    /// Declaration order, as the generator needs it for stable emission.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.bindings.values()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A stack of scopes, innermost last. The bottom scope is immortal and
/// pre-seeded with the built-in types `Integer`, `Real` and `Untyped`.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut bottom = Scope::new();
        bottom
            .insert(
                Span::DUMMY,
                Symbol::new("Integer", SymbolKind::Type(std::rc::Rc::new(crate::types::Type::Integer))),
            )
            .expect("builtin names are distinct");
        bottom
            .insert(
                Span::DUMMY,
                Symbol::new("Real", SymbolKind::Type(std::rc::Rc::new(crate::types::Type::Real))),
            )
            .expect("builtin names are distinct");
        bottom
            .insert(
                Span::DUMMY,
                Symbol::new("untyped", SymbolKind::Type(std::rc::Rc::new(crate::types::Type::Untyped))),
            )
            .expect("builtin names are distinct");
        Self {
            scopes: vec![bottom],
        }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Scope {
        assert!(self.scopes.len() > 1, "the bottom scope is immortal");
        self.scopes.pop().expect("non-empty by invariant above")
    }

    pub fn current(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("stack is never empty")
    }

    /// Number of scopes currently on the stack, bottom scope included.
    /// `depth() == 2` means "top-level global scope"; anything deeper is
    /// inside a routine body.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares `symbol` in the innermost scope.
    pub fn declare(&mut self, span: Span, symbol: Symbol) -> Result<()> {
        self.current().insert(span, symbol)
    }

    /// Searches from innermost to outermost scope for `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let lower = name.to_lowercase();
        self.scopes.iter().rev().find_map(|scope| scope.get(&lower))
    }

    /// `lookup`, then assert the result's kind intersects `required`.
    pub fn lookup_or_error(&self, span: Span, name: &str, required: KindMask) -> Result<&Symbol> {
        match self.lookup(name) {
            Some(sym) if sym.is(required) => Ok(sym),
            Some(_) => Err(CompileError::kind_mismatch(span, name)),
            None => Err(CompileError::identifier_not_found(span, name)),
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use std::rc::Rc;

    #[test]
    fn builtin_types_are_visible_from_the_start() {
        let stack = ScopeStack::new();
        assert!(stack.lookup("integer").is_some());
        assert!(stack.lookup("Real").is_some()); // lookup is case-insensitive
        assert!(stack.lookup("missing").is_none());
    }

    #[test]
    fn duplicate_declaration_in_one_scope_is_an_error() {
        let mut stack = ScopeStack::new();
        let ty = Rc::new(Type::Integer);
        stack
            .declare(
                Span::DUMMY,
                Symbol::new("x", SymbolKind::Global { ty: ty.clone(), label: "x".into() }),
            )
            .unwrap();
        let err = stack
            .declare(
                Span::DUMMY,
                Symbol::new("x", SymbolKind::Global { ty, label: "x2".into() }),
            )
            .unwrap_err();
        assert!(err.to_string().contains("duplicate identifier"));
    }

    #[test]
    fn param_offsets_grow_from_eight() {
        let mut scope = Scope::new();
        let ty = Rc::new(Type::Integer);
        assert_eq!(scope.next_param_offset(), 8);
        scope
            .insert(
                Span::DUMMY,
                Symbol::new("a", SymbolKind::Param { ty: ty.clone(), by_ref: false, offset: 8 }),
            )
            .unwrap();
        assert_eq!(scope.next_param_offset(), 12);
    }
}
