use crate::error::RpcCallerError;
use crate::pending_call::RpcPendingCall;
use crate::pending_requests::{RpcPendingRequest, RpcPendingRequests};
use futures::channel::oneshot;
use hostrpc::rpc::{
    RpcEnvelope, RpcPayload, RpcRequest, RpcRequestId, RpcTransport, RpcValue,
};
use hostrpc::utils::elapsed_millis;
use std::sync::Arc;

/// Defines a generic capability for making RPC calls.
///
/// Any struct that can provide a pending-request table, an id sequence, and
/// a transport for outbound requests (e.g., a service node acting as a
/// caller) implements the three getters and gains request issuance and
/// response correlation.
pub trait RpcServiceCallerInterface: Send + Sync {
    // --- METHODS TO BE IMPLEMENTED BY THE STRUCT ---

    /// The table of requests awaiting a response. Must be the same table for
    /// the lifetime of the caller.
    fn get_pending_requests(&self) -> Arc<RpcPendingRequests>;

    /// The transport outbound requests are sent through, if this caller is
    /// configured to issue requests at all.
    fn get_request_transport(&self) -> Option<Arc<dyn RpcTransport>>;

    /// Allocates the id for the next outbound request.
    fn next_request_id(&self) -> RpcRequestId;

    // --- METHODS PROVIDED AUTOMATICALLY BY THE TRAIT ---

    /// Issues `method_name` on the remote host `host_name`.
    ///
    /// The pending record is inserted before the envelope is handed to the
    /// transport, so even a transport that answers synchronously finds it.
    /// A synchronous send failure removes the record again and is returned
    /// here; otherwise the returned future settles when the response
    /// arrives.
    fn send_request(
        &self,
        host_name: &str,
        method_name: &str,
        args: Vec<RpcValue>,
    ) -> Result<RpcPendingCall, RpcCallerError> {
        if host_name.is_empty() {
            return Err(RpcCallerError::InvalidRequest(
                "host name must not be empty".into(),
            ));
        }
        if method_name.is_empty() {
            return Err(RpcCallerError::InvalidRequest(
                "method name must not be empty".into(),
            ));
        }

        let transport = self
            .get_request_transport()
            .ok_or(RpcCallerError::NoTransport)?;
        let pending_requests = self.get_pending_requests();

        let id = self.next_request_id();
        let (responder, receiver) = oneshot::channel();

        let record = RpcPendingRequest::new(id, host_name, method_name, args.clone(), responder);
        if let Some(stale) = pending_requests.insert(record) {
            tracing::warn!(
                id,
                host = %stale.host_name,
                method = %stale.method_name,
                "request id reused while still pending; aborting the older call"
            );
            stale.reject(RpcCallerError::Aborted);
        }

        let envelope = RpcEnvelope::request(
            id,
            RpcRequest {
                host_name: host_name.to_string(),
                method_name: method_name.to_string(),
                args,
            },
        );

        tracing::debug!(id, host = host_name, method = method_name, "sending rpc request");

        if let Err(err) = transport.send(envelope) {
            pending_requests.discard(id);
            tracing::debug!(id, error = %err, "rpc request send failed");
            return Err(RpcCallerError::Transport(err));
        }

        Ok(RpcPendingCall::new(
            id,
            receiver,
            Arc::downgrade(&pending_requests),
        ))
    }

    /// Completes the pending call a response envelope belongs to.
    ///
    /// Returns `true` if a pending call was completed. A response whose id
    /// is not pending (late, duplicate, or never issued) is logged and
    /// dropped; it is never an error for the caller.
    fn handle_response(&self, envelope: RpcEnvelope) -> bool {
        let (id, payload) = envelope.into_parts();

        let response = match payload {
            RpcPayload::Response(response) => response,
            RpcPayload::Request(_) => {
                tracing::warn!(id, "request envelope passed to the response path; ignoring");
                return false;
            }
        };

        let Some(request) = self.get_pending_requests().take(id) else {
            tracing::warn!(id, "received response for unknown or already-completed request");
            return false;
        };

        tracing::debug!(
            id,
            host = %request.host_name,
            method = %request.method_name,
            elapsed_ms = elapsed_millis(request.sent_at),
            is_error = response.is_error(),
            "received rpc response"
        );

        request.complete(response);
        true
    }
}
