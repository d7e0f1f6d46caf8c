//! pascalc-sem - the type lattice and the scope stack the parser consults
//! and extends while it builds the AST.
//!
//! There is no separate semantic-analysis pass: type checking is fused
//! into parsing, so this crate only supplies the data the parser needs at
//! each construction site (`ScopeStack::declare`/`lookup_or_error`,
//! `Type::same_actual_type`) rather than walking a tree itself.

mod scope;
mod symbol;
mod types;

pub use scope::{Scope, ScopeStack};
pub use symbol::{
    ConstValue, KindMask, RoutineSig, Symbol, SymbolKind, KIND_ALIAS, KIND_ARRAY, KIND_CALLABLE,
    KIND_CONST, KIND_FUNCT, KIND_GLOBAL, KIND_LOCAL, KIND_LVALUE, KIND_PARAM, KIND_POINTER,
    KIND_PROC, KIND_RECORD, KIND_SCALAR, KIND_TYPE, KIND_VAR,
};
pub use types::{Type, TypeRef};
