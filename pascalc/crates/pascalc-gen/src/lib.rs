//! Code generator: lowers the typed AST straight to AT&T-syntax x86
//! assembly text, no IR validation of its own — it only serialises; every
//! invariant it relies on was already enforced while `pascalc-par` built
//! the tree.
//!
//! Split the way `original_source/generator.h`/`generator.cpp` split their
//! own `AsmCode` rendering layer from `syntax_node.cpp`'s per-node
//! generation: [`asm`] is the flat instruction/data model and printer,
//! [`gen`] is the node-by-node lowering that builds one.

mod asm;
mod gen;

pub use gen::generate;
