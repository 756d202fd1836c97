//! Routing of extended requests to registered handlers.

use std::{collections::BTreeMap, sync::Arc};

use dirlink_proto::{ExtendedRequest, ExtendedResult, MessageId, Oid, ResultCode};
use tracing::debug;

use crate::{
    error::RegistryError,
    handler::{ExtendedOperationHandler, RequestContext},
};

/// Maps request OIDs to the handlers that answer them.
///
/// Populated during server setup, then only read. Dispatch takes `&self`, so
/// a registry behind an `Arc` serves any number of connections at once.
#[derive(Default)]
pub struct ExtendedOperationRegistry {
    handlers: Vec<Arc<dyn ExtendedOperationHandler>>,
    routes: BTreeMap<Oid, Arc<dyn ExtendedOperationHandler>>,
}

impl ExtendedOperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every OID it declares.
    ///
    /// Either all of its OIDs are registered or none are.
    pub fn register(
        &mut self,
        handler: impl ExtendedOperationHandler + 'static,
    ) -> Result<(), RegistryError> {
        self.register_shared(Arc::new(handler))
    }

    /// Register a handler that is also referenced elsewhere.
    pub fn register_shared(
        &mut self,
        handler: Arc<dyn ExtendedOperationHandler>,
    ) -> Result<(), RegistryError> {
        let oids = handler.supported_request_oids();
        if oids.is_empty() {
            return Err(RegistryError::NoSupportedOids(handler.name().to_string()));
        }

        if let Some((oid, existing)) =
            oids.iter().find_map(|oid| self.routes.get(oid).map(|existing| (oid, existing)))
        {
            return Err(RegistryError::DuplicateOid {
                oid: oid.clone(),
                existing: existing.name().to_string(),
                handler: handler.name().to_string(),
            });
        }

        for oid in oids {
            debug!(%oid, handler = handler.name(), "registered extended operation handler");
            self.routes.insert(oid, Arc::clone(&handler));
        }
        self.handlers.push(handler);

        Ok(())
    }

    /// Answer `request` with the handler registered for its OID.
    ///
    /// Requests for unregistered OIDs get an `UnwillingToPerform` result.
    pub fn dispatch(
        &self,
        context: &RequestContext,
        message_id: MessageId,
        request: &ExtendedRequest,
    ) -> ExtendedResult {
        match self.routes.get(&request.oid) {
            Some(handler) => {
                debug!(
                    oid = %request.oid,
                    %message_id,
                    handler = handler.name(),
                    "routing extended request"
                );
                handler.handle(context, message_id, request)
            },
            None => {
                debug!(oid = %request.oid, %message_id, "no handler for extended request");
                ExtendedResult::failure(
                    ResultCode::UnwillingToPerform,
                    format!("unsupported extended request OID {}", request.oid),
                )
            },
        }
    }

    /// Whether some handler answers `oid`.
    pub fn supports(&self, oid: &Oid) -> bool {
        self.routes.contains_key(oid)
    }

    /// Every routed OID, in ascending order.
    pub fn supported_oids(&self) -> Vec<Oid> {
        self.routes.keys().cloned().collect()
    }

    /// Names of registered handlers, in registration order.
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }
}
