//! # Error Types
//!
//! `Rejection` covers every reason a transaction is invalid. Everything else
//! is an internal fault of this replica and must never be reported as an
//! invalid transaction.

use thiserror::Error;

/// Reasons a transaction is rejected. Never retried, never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Missing timestamp, undecodable payload, missing or empty sub-field.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Address-shaped field with the wrong length, charset or namespace.
    #[error("{field} is not a valid 70-char hex state address: {address:?}")]
    MalformedAddress {
        field: &'static str,
        address: String,
    },

    /// Signer lacks the role required by the action.
    #[error("unauthorized signer: {0}")]
    Unauthorized(String),

    /// Well-formed address with no record behind it.
    #[error("{kind} does not exist: {address}")]
    DanglingReference { kind: &'static str, address: String },

    /// Well-formed address pointing to a different kind of record.
    #[error("address {address} is not a {expected}")]
    WrongKind {
        expected: &'static str,
        address: String,
    },

    /// Action-specific rule violated.
    #[error("{0}")]
    InvariantViolation(String),
}

impl Rejection {
    pub fn malformed(message: impl Into<String>) -> Self {
        Rejection::MalformedPayload(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Rejection::Unauthorized(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Rejection::InvariantViolation(message.into())
    }
}

/// Failures of the state store port.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("state read failed: {0}")]
    ReadFailed(String),

    #[error("state write failed: {0}")]
    WriteFailed(String),

    #[error("address outside the SawChain namespace: {0}")]
    OutsideNamespace(String),
}

/// Result of applying a transaction.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Reject this transaction. Do not apply, do not retry.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] Rejection),

    /// The state store failed underneath the engine.
    #[error("state store failure: {0}")]
    Store(#[from] StoreError),

    /// A stored record could not be decoded.
    #[error("corrupted record at {address}: {reason}")]
    Corrupted { address: String, reason: String },

    #[error("record encoding failed: {0}")]
    Encoding(String),
}

impl ProcessorError {
    /// True for rejections, false for faults of this replica.
    #[must_use]
    pub fn is_invalid_transaction(&self) -> bool {
        matches!(self, ProcessorError::InvalidTransaction(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ProcessorError::InvalidTransaction(rejection) => Some(rejection),
            _ => None,
        }
    }
}
