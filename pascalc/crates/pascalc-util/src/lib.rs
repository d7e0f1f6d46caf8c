//! pascalc-util - source spans and the compiler's single diagnostic type.
//!
//! Every stage of the pipeline (scanner, parser, generator, driver) returns
//! [`Result<T>`] and stops at the first error: there is no accumulation, no
//! recovery, and no warning level. See [`CompileError`] for the diagnostic
//! shape and its exact `Display` format.

mod error;
mod span;

pub use error::{CompileError, Result};
pub use span::Span;
