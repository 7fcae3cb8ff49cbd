//! Unified error model: one structured error type, three kinds, classified
//! strictly by the stage that detected the failure.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parser,
    Compiler,
    Runtime,
}

impl ErrorKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorKind::Parser => "Parse error",
            ErrorKind::Compiler => "Compilation error",
            ErrorKind::Runtime => "Runtime error",
        }
    }
}

/// A structured engine error.
///
/// `line`/`column` are populated for parser errors; `details` carries
/// stage-specific extra context (for the parser, a snippet of the
/// unconsumed input).
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub details: Option<String>,
}

impl Error {
    pub fn parser(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind: ErrorKind::Parser,
            message: message.into(),
            line: Some(line),
            column: Some(column),
            details: None,
        }
    }

    pub fn compiler(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Compiler,
            message: message.into(),
            line: None,
            column: None,
            details: None,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.into(),
            line: None,
            column: None,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.prefix())?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " at line {}, column {}", line, column)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_location() {
        let err = Error::parser("unexpected character '#'", 1, 5);
        assert_eq!(
            err.to_string(),
            "Parse error at line 1, column 5: unexpected character '#'"
        );
    }

    #[test]
    fn test_display_without_location() {
        let err = Error::compiler("unknown function: foo");
        assert_eq!(err.to_string(), "Compilation error: unknown function: foo");
        let err = Error::runtime("variable not found: x");
        assert_eq!(err.to_string(), "Runtime error: variable not found: x");
    }
}
