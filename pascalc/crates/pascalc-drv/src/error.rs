//! The driver's own error type.
//!
//! CLI usage mistakes (bad flag, missing file, too many arguments) are
//! plain one-line messages with no source position, printed bare — the way
//! `original_source/main.cpp` prints `CompilerException::what()` with no
//! further decoration. A diagnostic raised while actually compiling a file
//! is a [`pascalc_util::CompileError`] and keeps its `line:col ERROR at
//! '...': ...` format; the two are kept as separate variants rather than
//! forced through one `Display` impl so neither format leaks into the other.

use std::fmt;

#[derive(Debug)]
pub enum DriverError {
    Usage(String),
    Compile(pascalc_util::CompileError),
}

impl DriverError {
    pub fn usage(message: impl Into<String>) -> Self {
        DriverError::Usage(message.into())
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Usage(message) => write!(f, "{message}"),
            DriverError::Compile(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<pascalc_util::CompileError> for DriverError {
    fn from(e: pascalc_util::CompileError) -> Self {
        DriverError::Compile(e)
    }
}
