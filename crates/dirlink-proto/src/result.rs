//! Extended result values.
//!
//! [`ResultCode`] mirrors the numeric result codes of the directory protocol.
//! The codes a client or simulated server commonly produces have named
//! variants; any other value is kept as [`ResultCode::Unrecognized`] so that
//! every code a server can send survives a round trip.

use serde::{Deserialize, Serialize};

use crate::oid::Oid;

// Generates the enum, the `u16` conversions in both directions, and
// `as_u16()`. Named codes always win over `Unrecognized`.
macro_rules! result_codes {
    ($($(#[$doc:meta])* $name:ident = $value:literal,)+) => {
        /// Outcome code carried by every result.
        ///
        /// Serialized as its bare number.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "u16", into = "u16")]
        pub enum ResultCode {
            $($(#[$doc])* $name,)+
            /// A code without a named variant.
            ///
            /// Never holds a value that has one; build codes through
            /// [`ResultCode::from`] to keep that true.
            Unrecognized(u16),
        }

        impl ResultCode {
            /// Numeric value of the code.
            pub const fn as_u16(self) -> u16 {
                match self {
                    $(Self::$name => $value,)+
                    Self::Unrecognized(value) => value,
                }
            }
        }

        impl From<u16> for ResultCode {
            fn from(value: u16) -> Self {
                match value {
                    $($value => Self::$name,)+
                    other => Self::Unrecognized(other),
                }
            }
        }
    };
}

result_codes! {
    /// The operation completed successfully.
    Success = 0,
    /// The server hit an internal ordering or state problem.
    OperationsError = 1,
    /// The request violated the protocol.
    ProtocolError = 2,
    /// A time limit was exceeded.
    TimeLimitExceeded = 3,
    /// A size limit was exceeded.
    SizeLimitExceeded = 4,
    /// The requested authentication method is not supported.
    AuthMethodNotSupported = 7,
    /// The server requires stronger authentication.
    StrongerAuthRequired = 8,
    /// The request must be sent to another server.
    Referral = 10,
    /// An administrative limit was exceeded.
    AdminLimitExceeded = 11,
    /// A critical control is not supported.
    UnavailableCriticalExtension = 12,
    /// The operation requires a confidential connection.
    ConfidentialityRequired = 13,
    /// The requested entry does not exist.
    NoSuchObject = 32,
    /// The supplied DN is malformed.
    InvalidDnSyntax = 34,
    /// The supplied credentials were rejected.
    InvalidCredentials = 49,
    /// The client lacks the rights to perform the operation.
    InsufficientAccessRights = 50,
    /// The server is too busy to answer.
    Busy = 51,
    /// The server is unavailable.
    Unavailable = 52,
    /// The server refuses to perform the operation.
    UnwillingToPerform = 53,
    /// The entry being added already exists.
    EntryAlreadyExists = 68,
    /// Any other failure.
    Other = 80,
}

impl ResultCode {
    /// Whether this code signals success.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<ResultCode> for u16 {
    fn from(code: ResultCode) -> Self {
        code.as_u16()
    }
}

/// A server's answer to an extended request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedResult {
    /// Outcome code.
    pub result_code: ResultCode,

    /// DN of the closest matching entry, when relevant.
    pub matched_dn: Option<String>,

    /// Human-readable diagnostic text.
    pub diagnostic_message: Option<String>,

    /// OID identifying the response type, if any.
    pub response_oid: Option<Oid>,

    /// Operation-specific response value, if any.
    pub value: Option<Vec<u8>>,
}

impl ExtendedResult {
    /// A bare successful result.
    pub fn success() -> Self {
        Self::with_code(ResultCode::Success)
    }

    /// A failed result carrying a diagnostic message.
    pub fn failure(result_code: ResultCode, diagnostic: impl Into<String>) -> Self {
        Self::with_code(result_code).with_diagnostic_message(diagnostic)
    }

    /// A result with the given code and no other fields.
    pub fn with_code(result_code: ResultCode) -> Self {
        Self {
            result_code,
            matched_dn: None,
            diagnostic_message: None,
            response_oid: None,
            value: None,
        }
    }

    /// Set the diagnostic message.
    #[must_use]
    pub fn with_diagnostic_message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic_message = Some(message.into());
        self
    }

    /// Set the matched DN.
    #[must_use]
    pub fn with_matched_dn(mut self, dn: impl Into<String>) -> Self {
        self.matched_dn = Some(dn.into());
        self
    }

    /// Set the response OID.
    #[must_use]
    pub fn with_response_oid(mut self, oid: Oid) -> Self {
        self.response_oid = Some(oid);
        self
    }

    /// Set the encoded response value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Whether the result code signals success.
    pub fn is_success(&self) -> bool {
        self.result_code.is_success()
    }
}
