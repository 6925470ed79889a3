// ABOUTME: Error types for the driver and the evaluator

use crate::scanner::Token;
use std::io;
use thiserror::Error;

/// Errors reading the script file, mapped to the driver's user-facing
/// messages.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File \"{0}\" is too big")]
    TooLarge(String),

    #[error("File \"{0}\" was not found")]
    NotFound(String),

    #[error("Access to \"{0}\" was denied")]
    AccessDenied(String),

    #[error("\"{0}\" is a directory, not a file")]
    IsADirectory(String),

    #[error("Could not read \"{path}\": {source}")]
    Io { path: String, source: io::Error },
}

impl SourceError {
    /// Maps an I/O failure on `path` to its user-facing category.
    pub fn from_io(path: &str, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => SourceError::AccessDenied(path.to_string()),
            io::ErrorKind::IsADirectory => SourceError::IsADirectory(path.to_string()),
            _ => SourceError::Io {
                path: path.to_string(),
                source: error,
            },
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable \"{0}\"")]
    UndefinedVariable(String),

    #[error("Operand of unary \"{operator}\" must be a number, got {actual}")]
    UnaryTypeMismatch {
        operator: &'static str,
        actual: &'static str,
    },

    #[error("{side} operand of \"{operator}\" must be a {expected}, got {actual}")]
    BinaryTypeMismatch {
        side: &'static str,
        operator: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Value of type {0} is not callable")]
    NotCallable(&'static str),

    #[error("Expected {expected} argument(s) to call function \"{name}\". {given} argument(s) given.")]
    ArityMismatch {
        name: String,
        expected: usize,
        given: usize,
    },
}

/// A runtime failure, located at the token that produced it. The first one
/// aborts evaluation of the whole program.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub token: Token,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, token: Token) -> Self {
        RuntimeError { kind, token }
    }

    pub fn undefined_variable(name: &str, token: Token) -> Self {
        RuntimeError::new(RuntimeErrorKind::UndefinedVariable(name.to_string()), token)
    }

    pub fn unary_mismatch(operator: &'static str, actual: &'static str, token: Token) -> Self {
        RuntimeError::new(RuntimeErrorKind::UnaryTypeMismatch { operator, actual }, token)
    }

    pub fn binary_mismatch(
        side: &'static str,
        operator: &'static str,
        expected: &'static str,
        actual: &'static str,
        token: Token,
    ) -> Self {
        RuntimeError::new(
            RuntimeErrorKind::BinaryTypeMismatch {
                side,
                operator,
                expected,
                actual,
            },
            token,
        )
    }

    pub fn not_callable(actual: &'static str, token: Token) -> Self {
        RuntimeError::new(RuntimeErrorKind::NotCallable(actual), token)
    }

    pub fn arity(name: &str, expected: usize, given: usize, token: Token) -> Self {
        RuntimeError::new(
            RuntimeErrorKind::ArityMismatch {
                name: name.to_string(),
                expected,
                given,
            },
            token,
        )
    }
}
