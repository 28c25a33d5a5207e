//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree and record-path rules.
/// These are independent of storage concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid node: {reason}")]
    InvalidNode { reason: String },

    #[error("record path is missing a tag: {spec}")]
    MissingTag { spec: String },

    #[error("{field} is not representable as XML text: {reason}")]
    Encoding { field: String, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
