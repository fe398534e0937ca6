use std::fmt;

use serde::{Deserialize, Serialize};

/// The name in the switch's governing expression is not in scope.
pub const UNDEFINED_NAME: &str = "SB0103";
/// A value or pattern does not fit the type it is checked against.
pub const TYPE_MISMATCH: &str = "SB0029";
/// The output file could not be created or written.
pub const OUTPUT_WRITE_FAILED: &str = "SB2012";
/// Executable output without a `static Main`.
pub const NO_ENTRY_POINT: &str = "SB5001";
/// The switch does not handle every value of its input type.
pub const NON_EXHAUSTIVE: &str = "SB8509";
/// An arm can never be reached.
pub const SUBSUMED_PATTERN: &str = "SB8510";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    /// Zero-based arm index in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<usize>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            arm: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn at_arm(mut self, arm: usize) -> Self {
        self.arm = Some(arm);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{} {}: {}", severity, self.code, self.message)?;
        if let Some(arm) = self.arm {
            write!(f, " (arm {})", arm)?;
        }
        Ok(())
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
