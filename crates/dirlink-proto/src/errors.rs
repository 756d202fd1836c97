//! Error types for extended operation values.

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while validating extended operation values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The OID string is empty.
    #[error("object identifier is empty")]
    EmptyOid,

    /// The OID has fewer than two arcs.
    #[error("object identifier '{0}' must have at least two arcs")]
    TooFewArcs(String),

    /// An arc is empty, non-numeric, or has a leading zero.
    #[error("object identifier '{oid}' has an invalid arc '{arc}'")]
    InvalidArc {
        /// The offending OID.
        oid: String,
        /// The arc that failed validation.
        arc: String,
    },
}
