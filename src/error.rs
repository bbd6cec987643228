//! Custom error types for splitpot
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Ledger errors fall into three families:
//! recoverable validation errors that are shown to the user verbatim, the
//! fatal `SettlementInconsistency`, and the retryable
//! `ConcurrentSettlementConflict`.

use thiserror::Error;

/// The main error type for splitpot operations
#[derive(Error, Debug)]
pub enum SplitpotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Amount is not a positive whole number of cents
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A split was requested but nobody is active to share it
    #[error("No eligible members to split among")]
    NoEligibleMembers,

    /// Lifecycle operation attempted from a state that forbids it
    #[error("Cannot {action} {entity_type} in state '{from}'")]
    InvalidStateTransition {
        entity_type: &'static str,
        from: String,
        action: &'static str,
    },

    /// Mutation attempted on a settled period
    #[error("Period is settled and can no longer be changed: {0}")]
    PeriodImmutable(String),

    /// Balances did not sum to zero going into (or out of) settlement
    #[error("Ledger is inconsistent: balances are off by {residual} cents")]
    SettlementInconsistency { residual: i64 },

    /// Another settlement of the same period is already in flight
    #[error("Period is already being settled: {0}")]
    ConcurrentSettlementConflict(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SplitpotError {
    /// Create a "not found" error for members
    pub fn member_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Member",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for periods
    pub fn period_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Period",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Expected errors that are reported to the user as-is
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidAmount(_)
                | Self::NoEligibleMembers
                | Self::InvalidStateTransition { .. }
                | Self::PeriodImmutable(_)
                | Self::NotFound { .. }
                | Self::Duplicate { .. }
        )
    }

    /// Data-integrity faults; the operation must be aborted
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SettlementInconsistency { .. })
    }

    /// The caller may retry the operation later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentSettlementConflict(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SplitpotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SplitpotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for splitpot operations
pub type SplitpotResult<T> = Result<T, SplitpotError>;
