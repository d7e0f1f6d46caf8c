//! The type lattice: scalars, arrays, records, aliases and the reserved
//! (unimplemented) pointer type.
//!
//! Grounded in `original_source/sym_table.h`'s `SymType`/`SymTypeScalar`/
//! `SymTypeInteger`/`SymTypeReal`/`SymTypeArray`/`SymTypeRecord`/
//! `SymTypeAlias`/`SymTypePointer` hierarchy, flattened from a class tree
//! into one enum.

use std::rc::Rc;

use crate::scope::Scope;

pub type TypeRef = Rc<Type>;

#[derive(Debug)]
pub enum Type {
    Integer,
    Real,
    /// The type of nothing: a procedure's "result", used nowhere else.
    Untyped,
    Array {
        element: TypeRef,
        low: i32,
        high: i32,
    },
    /// A record's fields live in their own throwaway scope, owned by the type.
    Record {
        fields: Scope,
    },
    Alias {
        name: String,
        target: TypeRef,
    },
    /// Parsed but rejected: see spec Open Questions on pointer types.
    Pointer {
        target: TypeRef,
    },
}

impl Type {
    /// Follows alias links to the type all structural checks compare by.
    pub fn actual(self: &TypeRef) -> TypeRef {
        match self.as_ref() {
            Type::Alias { target, .. } => target.actual(),
            _ => self.clone(),
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            Type::Integer | Type::Real => 4,
            Type::Untyped => 0,
            Type::Array { element, low, high } => {
                let len = (*high - *low + 1).max(0) as u32;
                len * element.size()
            }
            Type::Record { fields } => fields.locals_size,
            Type::Alias { target, .. } => target.size(),
            Type::Pointer { .. } => 4,
        }
    }

    pub fn is_integer(self: &TypeRef) -> bool {
        matches!(self.actual().as_ref(), Type::Integer)
    }

    pub fn is_real(self: &TypeRef) -> bool {
        matches!(self.actual().as_ref(), Type::Real)
    }

    pub fn is_array(self: &TypeRef) -> bool {
        matches!(self.actual().as_ref(), Type::Array { .. })
    }

    /// Identity comparison of actual types: every semantic check compares
    /// actual types by identity, never by structural equality.
    pub fn same_actual_type(a: &TypeRef, b: &TypeRef) -> bool {
        Rc::ptr_eq(&a.actual(), &b.actual())
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Type::Integer => "Integer",
            Type::Real => "Real",
            Type::Untyped => "untyped",
            Type::Array { .. } => "array",
            Type::Record { .. } => "record",
            Type::Alias { .. } => "alias",
            Type::Pointer { .. } => "pointer",
        }
    }
}
