//! Shared diagnostic type for the parser and linker.

use std::fmt;

pub use protobuf::text::Loc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub location: Loc,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(location: Loc, message: impl Into<String>) -> Diagnostic {
        Diagnostic { location, severity: Severity::Error, message: message.into() }
    }

    pub fn warning(location: Loc, message: impl Into<String>) -> Diagnostic {
        Diagnostic { location, severity: Severity::Warning, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.location)
    }
}

/// Whether any diagnostic in `diags` is an error — codegen refuses to run
/// when this is true.
pub fn has_errors(diags: &[Diagnostic]) -> bool {
    diags.iter().any(|d| d.severity == Severity::Error)
}
