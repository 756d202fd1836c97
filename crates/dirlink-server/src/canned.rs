//! A handler that answers every request with the same result.

use std::collections::BTreeSet;

use dirlink_proto::{ExtendedRequest, ExtendedResult, MessageId, Oid, well_known};

use crate::handler::{ExtendedOperationHandler, RequestContext};

/// Name reported by [`CannedResponseHandler::password_policy_state`].
pub const PASSWORD_POLICY_STATE_NAME: &str = "Password Policy State";

/// Extended operation handler that returns a fixed result.
///
/// The result is captured at construction and returned for every request,
/// whatever its context, message ID or value. It may be a failure result;
/// that is how tests make a simulated server reject an operation.
#[derive(Debug, Clone)]
pub struct CannedResponseHandler {
    name: String,
    oid: Oid,
    result: ExtendedResult,
}

impl CannedResponseHandler {
    /// Answer requests for `oid` with `result`, reporting `name`.
    pub fn new(name: impl Into<String>, oid: Oid, result: ExtendedResult) -> Self {
        Self { name: name.into(), oid, result }
    }

    /// Fake support for the password policy state extended operation.
    pub fn password_policy_state(result: ExtendedResult) -> Self {
        Self::new(
            PASSWORD_POLICY_STATE_NAME,
            Oid::from_static(well_known::PASSWORD_POLICY_STATE),
            result,
        )
    }

    /// The result returned for every request.
    pub fn result(&self) -> &ExtendedResult {
        &self.result
    }
}

impl ExtendedOperationHandler for CannedResponseHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_request_oids(&self) -> BTreeSet<Oid> {
        BTreeSet::from([self.oid.clone()])
    }

    fn handle(
        &self,
        _context: &RequestContext,
        _message_id: MessageId,
        _request: &ExtendedRequest,
    ) -> ExtendedResult {
        self.result.clone()
    }
}
