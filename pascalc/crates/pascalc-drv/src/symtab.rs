//! Pretty-prints a [`Scope`] for the `-t`/`-b` flags.
//!
//! Not part of `pascalc-sem` itself: the symbol table's *structure* belongs
//! to the semantic model, but how it's rendered to a human is a driver
//! concern, the same split `pascalc-par::ast` draws between AST shape and
//! `Expr::pretty_print`/`Stmt::pretty_print`.

use pascalc_sem::{Scope, Symbol, SymbolKind, Type, TypeRef};

/// Prints every symbol in `scope`, each on its own line indented by nesting
/// depth; a procedure or function recurses into its own parameter/local
/// scope at `depth + 1`.
pub fn print_scope(scope: &Scope, depth: usize) {
    for symbol in scope.iter() {
        print_symbol(symbol, depth);
    }
}

fn print_symbol(symbol: &Symbol, depth: usize) {
    let pad = "  ".repeat(depth);
    match &symbol.kind {
        SymbolKind::Type(ty) => {
            println!("{pad}type {} = {}", symbol.name, describe_type(ty));
        }
        SymbolKind::Const { ty, value } => {
            println!("{pad}const {}: {} = {:?}", symbol.name, ty.describe(), value);
        }
        SymbolKind::Global { ty, label } => {
            println!("{pad}var {}: {} [{label}]", symbol.name, ty.describe());
        }
        SymbolKind::Local { ty, offset } => {
            println!("{pad}var {}: {} @-{offset}(%ebp)", symbol.name, ty.describe());
        }
        SymbolKind::Param { ty, by_ref, offset } => {
            let by_ref = if *by_ref { "var " } else { "" };
            println!("{pad}param {by_ref}{}: {} @+{offset}(%ebp)", symbol.name, ty.describe());
        }
        SymbolKind::Procedure(sig) => {
            println!("{pad}procedure {} [{}]", symbol.name, sig.label);
            print_scope(&sig.scope, depth + 1);
        }
        SymbolKind::Function(sig) => {
            let result = sig.result.as_ref().map(|t| t.describe()).unwrap_or("untyped");
            println!("{pad}function {} [{}] : {result}", symbol.name, sig.label);
            print_scope(&sig.scope, depth + 1);
        }
    }
}

/// Expands a type's internal structure on first appearance; an alias
/// prints both its own name and the target it resolves to.
fn describe_type(ty: &TypeRef) -> String {
    match ty.as_ref() {
        Type::Array { element, low, high } => {
            format!("array[{low}..{high}] of {}", describe_type(element))
        }
        Type::Record { fields } => {
            let members: Vec<String> = fields
                .iter()
                .map(|s| match &s.kind {
                    SymbolKind::Local { ty, .. } => format!("{}: {}", s.name, describe_type(ty)),
                    _ => s.name.clone(),
                })
                .collect();
            format!("record {{ {} }}", members.join("; "))
        }
        Type::Alias { name, target } => format!("{name} = {}", describe_type(target)),
        Type::Pointer { target } => format!("^{}", describe_type(target)),
        _ => ty.describe().to_string(),
    }
}
