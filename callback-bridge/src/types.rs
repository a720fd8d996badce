//! Core types for the callback bridge library
//!
//! This module defines the error taxonomy shared by every bridge operation and
//! the parsed form of an input event. Host-side values live in [`crate::host`].

use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used throughout the bridge
pub type Timestamp = DateTime<Utc>;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while registering, parsing or invoking
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Invalid callback: expected a function, got {0}")]
    InvalidCallback(String),

    #[error("Arity mismatch: expected {expected} integers, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Integer out of range at position {index}: {value}")]
    IntegerRangeError { index: usize, value: i64 },

    #[error("Callback '{callback}' failed: {message}")]
    CallbackExecutionError { callback: String, message: String },

    #[error("No callback registered")]
    NoCallbackRegistered,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown export: {0}")]
    UnknownExport(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// True for errors the ingestion loop records and moves past
    ///
    /// [`crate::Bridge::run`] uses this to decide whether an error yielded by
    /// the event source ends the run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BridgeError::Io(_))
    }
}

/// An ordered sequence of integers parsed from one raw input line
///
/// Built fresh for every input event and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    values: Vec<i64>,
}

impl ParsedInput {
    /// Wrap already-parsed values
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// The parsed integers, in input order
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check whether this input is complete for the given arity
    pub fn has_arity(&self, arity: usize) -> bool {
        self.values.len() == arity
    }
}

impl From<Vec<i64>> for ParsedInput {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for ParsedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_input_arity() {
        let input = ParsedInput::new(vec![10, 20, 30, 40]);
        assert!(input.has_arity(4));
        assert!(!input.has_arity(3));
        assert_eq!(input.len(), 4);
        assert!(!input.is_empty());
        assert!(ParsedInput::new(Vec::new()).is_empty());
    }

    #[test]
    fn test_parsed_input_display() {
        assert_eq!(format!("{}", ParsedInput::new(vec![1, -2, 3])), "[1, -2, 3]");
        assert_eq!(format!("{}", ParsedInput::new(Vec::new())), "[]");
    }

    #[test]
    fn test_error_messages() {
        let err = BridgeError::ArityMismatch { expected: 4, actual: 3 };
        assert_eq!(err.to_string(), "Arity mismatch: expected 4 integers, got 3");
        assert!(err.is_recoverable());

        let io = BridgeError::from(std::io::Error::new(std::io::ErrorKind::Other, "closed"));
        assert!(!io.is_recoverable());
    }
}
