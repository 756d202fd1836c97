//! Registry error types.

use dirlink_proto::Oid;
use thiserror::Error;

/// Errors raised while registering extended operation handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The handler declared no OIDs, so nothing would ever reach it.
    #[error("handler '{0}' does not declare any supported request OIDs")]
    NoSupportedOids(String),

    /// Another handler already answers this OID.
    #[error("OID {oid} is already handled by '{existing}', cannot register '{handler}'")]
    DuplicateOid {
        /// The contested OID.
        oid: Oid,
        /// Name of the handler already registered for it.
        existing: String,
        /// Name of the handler being registered.
        handler: String,
    },
}
