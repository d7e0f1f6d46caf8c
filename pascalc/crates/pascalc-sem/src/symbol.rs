//! Symbols: named declarations with a type, a kind, and a capability mask.
//!
//! The kind taxonomy is grounded in `original_source/sym_table.h`'s
//! `SymbolClass` bitmask (`SYM_TYPE*`, `SYM_VAR*`, `SYM_FUNCT`/`SYM_PROC`);
//! we keep the bitmask for capability tests but represent the payload as a
//! flat Rust enum rather than a C++ class hierarchy.

use std::rc::Rc;

use crate::scope::Scope;
use crate::types::TypeRef;

pub type KindMask = u32;

pub const KIND_TYPE: KindMask = 1 << 0;
pub const KIND_SCALAR: KindMask = 1 << 1;
pub const KIND_ARRAY: KindMask = 1 << 2;
pub const KIND_RECORD: KindMask = 1 << 3;
pub const KIND_ALIAS: KindMask = 1 << 4;
pub const KIND_POINTER: KindMask = 1 << 5;

pub const KIND_VAR: KindMask = 1 << 6;
pub const KIND_CONST: KindMask = 1 << 7;
pub const KIND_PARAM: KindMask = 1 << 8;
pub const KIND_GLOBAL: KindMask = 1 << 9;
pub const KIND_LOCAL: KindMask = 1 << 10;

pub const KIND_PROC: KindMask = 1 << 11;
pub const KIND_FUNCT: KindMask = 1 << 12;

/// Variable symbols that name an addressable storage location.
pub const KIND_LVALUE: KindMask = KIND_PARAM | KIND_GLOBAL | KIND_LOCAL;
/// Symbols that can appear in call position.
pub const KIND_CALLABLE: KindMask = KIND_PROC | KIND_FUNCT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Real(OrderedFloat),
}

/// `f64` doesn't implement `Eq`; constants are only ever compared for
/// equality in tests, never hashed or ordered at runtime.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);
impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for OrderedFloat {}

#[derive(Debug)]
pub enum SymbolKind {
    Type(TypeRef),
    Const {
        ty: TypeRef,
        value: ConstValue,
    },
    /// A formal parameter; `offset` grows positively from `+8`. A function's
    /// phantom `Result` slot is represented as a non-`by_ref` parameter
    /// named `result`, inserted last.
    Param {
        ty: TypeRef,
        by_ref: bool,
        offset: u32,
    },
    Global {
        ty: TypeRef,
        label: String,
    },
    /// `offset` grows from `0`; the generator reads it as `%ebp - offset - 4`.
    Local {
        ty: TypeRef,
        offset: u32,
    },
    Procedure(Rc<RoutineSig>),
    Function(Rc<RoutineSig>),
}

/// Shared shape of a procedure or function symbol: its label, inner scope
/// (parameters, the phantom result slot, and locals all live here) and,
/// for functions, the result type.
#[derive(Debug)]
pub struct RoutineSig {
    pub label: String,
    pub scope: Scope,
    pub result: Option<TypeRef>,
    /// Declared formal parameters, not counting the phantom `result` slot
    /// or its alias to the routine's own name.
    pub param_count: usize,
}

impl RoutineSig {
    /// Bytes the callee pops on return: declared parameters minus the
    /// phantom result slot, per spec's Open Question decision.
    pub fn callee_pop_bytes(&self) -> u32 {
        let result_size = self.result.as_ref().map(|t| t.size()).unwrap_or(0);
        self.scope.params_size.saturating_sub(result_size)
    }
}

#[derive(Debug)]
pub struct Symbol {
    /// Original spelling, as written in source.
    pub name: String,
    /// Canonical lookup key: lowercased, since Pascal identifiers are
    /// case-insensitive.
    pub lower: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        Self { name, lower, kind }
    }

    pub fn kind_mask(&self) -> KindMask {
        match &self.kind {
            SymbolKind::Type(ty) => {
                KIND_TYPE
                    | match ty.as_ref() {
                        crate::types::Type::Array { .. } => KIND_ARRAY,
                        crate::types::Type::Record { .. } => KIND_RECORD,
                        crate::types::Type::Alias { .. } => KIND_ALIAS,
                        crate::types::Type::Pointer { .. } => KIND_POINTER,
                        crate::types::Type::Integer | crate::types::Type::Real => KIND_SCALAR,
                        crate::types::Type::Untyped => 0,
                    }
            }
            SymbolKind::Const { .. } => KIND_VAR | KIND_CONST,
            SymbolKind::Param { .. } => KIND_VAR | KIND_PARAM,
            SymbolKind::Global { .. } => KIND_VAR | KIND_GLOBAL,
            SymbolKind::Local { .. } => KIND_VAR | KIND_LOCAL,
            SymbolKind::Procedure(_) => KIND_PROC,
            SymbolKind::Function(_) => KIND_FUNCT,
        }
    }

    pub fn is(&self, mask: KindMask) -> bool {
        self.kind_mask() & mask != 0
    }

    pub fn is_lvalue(&self) -> bool {
        self.is(KIND_LVALUE)
    }

    /// `None` for routines and type symbols; every variable symbol has one.
    pub fn ty(&self) -> Option<&TypeRef> {
        match &self.kind {
            SymbolKind::Type(ty) => Some(ty),
            SymbolKind::Const { ty, .. }
            | SymbolKind::Param { ty, .. }
            | SymbolKind::Global { ty, .. }
            | SymbolKind::Local { ty, .. } => Some(ty),
            SymbolKind::Procedure(_) | SymbolKind::Function(_) => None,
        }
    }

    pub fn size(&self) -> u32 {
        self.ty().map(|t| t.size()).unwrap_or(0)
    }
}
