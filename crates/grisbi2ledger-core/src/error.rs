//! Error types for grisbi2ledger-core
//!
//! Every error here is fatal: the input cannot be converted and no output
//! is produced. Semantic problems that can be reported in bulk are
//! validation findings instead (see `validate`).

use grisbi2ledger_parser::ParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use std::io;

use crate::types::RecordKind;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input document could not be read
    ParseError,
    /// Required attribute missing on a record
    MissingAttribute,
    /// Attribute value could not be interpreted
    InvalidValue,
    /// Attribute value outside the supported subset
    NotSupported,
    /// Identity number used twice within a record kind
    DuplicateEntry,
    /// Reference to a record that was never loaded
    UnresolvedReference,
    /// Split child that is itself the mother of other records
    NestedSplit,
    /// Transaction without a date, even after inheriting its mother's
    MissingDate,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::MissingAttribute => write!(f, "MISSING_ATTRIBUTE"),
            ErrorCode::InvalidValue => write!(f, "INVALID_VALUE"),
            ErrorCode::NotSupported => write!(f, "NOT_SUPPORTED"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::UnresolvedReference => write!(f, "UNRESOLVED_REFERENCE"),
            ErrorCode::NestedSplit => write!(f, "NESTED_SPLIT"),
            ErrorCode::MissingDate => write!(f, "MISSING_DATE"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// The input is outside what can be converted
    Error,
    /// The environment failed, independent of the input
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for grisbi2ledger-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("{kind} record at byte {position} has no {attribute} attribute")]
    MissingAttribute {
        kind: RecordKind,
        position: usize,
        attribute: &'static str,
    },

    #[error("{kind} record at byte {position}: invalid {attribute} value {value:?} ({reason})")]
    InvalidValue {
        kind: RecordKind,
        position: usize,
        attribute: &'static str,
        value: String,
        reason: String,
    },

    #[error("{kind} record at byte {position}: unsupported {attribute} value {value:?} ({reason})")]
    NotSupported {
        kind: RecordKind,
        position: usize,
        attribute: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate {kind} number {number}")]
    DuplicateEntry { kind: RecordKind, number: String },

    #[error("{kind} {number} refers through {attribute} to {target} {target_number}, which does not exist")]
    UnresolvedReference {
        kind: RecordKind,
        number: String,
        attribute: &'static str,
        target: RecordKind,
        target_number: String,
    },

    #[error("Transaction {transaction} is part of split {mother}, which is itself part of a split")]
    NestedSplit { transaction: u32, mother: u32 },

    #[error("Transaction {transaction} has no date")]
    MissingDate { transaction: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ParseError(_) => ErrorCode::ParseError,
            CoreError::MissingAttribute { .. } => ErrorCode::MissingAttribute,
            CoreError::InvalidValue { .. } => ErrorCode::InvalidValue,
            CoreError::NotSupported { .. } => ErrorCode::NotSupported,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::UnresolvedReference { .. } => ErrorCode::UnresolvedReference,
            CoreError::NestedSplit { .. } => ErrorCode::NestedSplit,
            CoreError::MissingDate { .. } => ErrorCode::MissingDate,
            CoreError::IoError(_) => ErrorCode::IoError,
        }
    }

    /// Get the error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
