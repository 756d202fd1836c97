//! Object identifiers naming extended operations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// A dotted-decimal object identifier such as `1.3.6.1.4.1.30221.2.6.1`.
///
/// Validated on construction: at least two arcs, every arc a decimal number
/// with no leading zero (a lone `0` is allowed).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Parse and validate an OID.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(ProtocolError::EmptyOid);
        }

        let mut arcs = 0usize;
        for arc in value.split('.') {
            let numeric = !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit());
            let leading_zero = arc.len() > 1 && arc.starts_with('0');
            if !numeric || leading_zero {
                return Err(ProtocolError::InvalidArc { oid: value.clone(), arc: arc.to_string() });
            }
            arcs += 1;
        }

        if arcs < 2 {
            return Err(ProtocolError::TooFewArcs(value));
        }

        Ok(Self(value))
    }

    /// Wrap a compile-time constant such as those in [`well_known`].
    ///
    /// The value is trusted; validity is only asserted in debug builds.
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(Self::new(value).is_ok(), "invalid static OID {value}");
        Self(value.to_string())
    }

    /// The OID in dotted-decimal form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Oid {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Oid {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

/// OIDs of extended operations known to this workspace.
pub mod well_known {
    /// Password policy state extended request.
    pub const PASSWORD_POLICY_STATE: &str = "1.3.6.1.4.1.30221.2.6.1";

    /// "Who am I?" extended request (RFC 4532).
    pub const WHO_AM_I: &str = "1.3.6.1.4.1.4203.1.11.3";

    /// StartTLS extended request (RFC 4511).
    pub const START_TLS: &str = "1.3.6.1.4.1.1466.20037";

    /// Password modify extended request (RFC 3062).
    pub const PASSWORD_MODIFY: &str = "1.3.6.1.4.1.4203.1.11.1";
}
