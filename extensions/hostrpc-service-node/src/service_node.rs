use crate::config::{RpcServiceNodeConfig, RpcSpawnFn};
use crate::error::RpcServiceNodeError;
use futures::FutureExt;
use hostrpc::rpc::{
    RpcEnvelope, RpcEnvelopeKind, RpcMessageHandler, RpcRequestId, RpcTransport,
};
use hostrpc::utils::RpcIdGenerator;
use hostrpc_service_caller::error::RpcCallerError;
use hostrpc_service_caller::{
    RpcPendingRequestInfo, RpcPendingRequests, RpcProxy, RpcServiceCallerInterface,
};
use hostrpc_service_endpoint::{
    RpcHost, RpcHostRegistry, RpcServiceEndpointError, RpcServiceEndpointInterface,
};
use std::sync::{Arc, Weak};

/// Which envelope kinds an inbound callback accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RpcInboundRoute {
    Requests,
    Responses,
    Both,
}

impl RpcInboundRoute {
    fn accepts(self, kind: RpcEnvelopeKind) -> bool {
        matches!(
            (self, kind),
            (RpcInboundRoute::Both, _)
                | (RpcInboundRoute::Requests, RpcEnvelopeKind::Request)
                | (RpcInboundRoute::Responses, RpcEnvelopeKind::Response)
        )
    }
}

struct RpcServiceNodeState {
    request_ids: RpcIdGenerator,
    pending_requests: Arc<RpcPendingRequests>,
    host_registry: Arc<RpcHostRegistry>,
    caller_transport: Option<Arc<dyn RpcTransport>>,
    host_transport: Option<Arc<dyn RpcTransport>>,
    spawner: Option<RpcSpawnFn>,
}

impl RpcServiceCallerInterface for RpcServiceNodeState {
    fn get_pending_requests(&self) -> Arc<RpcPendingRequests> {
        Arc::clone(&self.pending_requests)
    }

    fn get_request_transport(&self) -> Option<Arc<dyn RpcTransport>> {
        self.caller_transport.clone()
    }

    fn next_request_id(&self) -> RpcRequestId {
        self.request_ids.next_id()
    }
}

#[async_trait::async_trait]
impl RpcServiceEndpointInterface for RpcServiceNodeState {
    fn get_host_registry(&self) -> Arc<RpcHostRegistry> {
        Arc::clone(&self.host_registry)
    }

    fn get_response_transport(&self) -> Option<Arc<dyn RpcTransport>> {
        self.host_transport.clone()
    }
}

impl RpcServiceNodeState {
    /// Entry point for envelopes arriving through a transport callback.
    fn route(self: &Arc<Self>, envelope: RpcEnvelope, route: RpcInboundRoute) {
        let kind = envelope.kind();

        if !route.accepts(kind) {
            tracing::warn!(
                id = envelope.id(),
                ?kind,
                "ignoring envelope not expected on this transport"
            );
            return;
        }

        match kind {
            RpcEnvelopeKind::Response => {
                self.handle_response(envelope);
            }
            RpcEnvelopeKind::Request => self.spawn_request(envelope),
        }
    }

    fn spawn_request(self: &Arc<Self>, envelope: RpcEnvelope) {
        let Some(spawner) = &self.spawner else {
            // Unreachable through `RpcServiceNode::new`, which refuses a host
            // transport without a spawner.
            tracing::error!(id = envelope.id(), "no spawner configured; dropping request");
            return;
        };

        let state = Arc::clone(self);
        spawner(
            async move {
                let id = envelope.id();
                if let Err(err) = state.handle_request(envelope).await {
                    tracing::error!(id, error = %err, "failed to send rpc response");
                }
            }
            .boxed(),
        );
    }
}

fn inbound_handler(state: Weak<RpcServiceNodeState>, route: RpcInboundRoute) -> RpcMessageHandler {
    Box::new(move |envelope| match state.upgrade() {
        Some(state) => state.route(envelope, route),
        None => tracing::trace!(
            id = envelope.id(),
            "rpc service dropped; ignoring inbound envelope"
        ),
    })
}

/// One RPC service instance.
///
/// Owns exactly one id sequence, one pending-request table, and one host
/// registry; none of them are shared with other instances. Cloning the node
/// clones a handle to the same instance.
#[derive(Clone)]
pub struct RpcServiceNode {
    state: Arc<RpcServiceNodeState>,
}

impl RpcServiceNode {
    /// Builds the node and registers its inbound callbacks with the
    /// configured transports.
    ///
    /// When the caller and host transports are the same object, a single
    /// callback routing both kinds is registered; otherwise each transport's
    /// callback only accepts its own direction.
    pub fn new(config: RpcServiceNodeConfig) -> Result<Self, RpcServiceNodeError> {
        let spawner = config.resolve_spawner();
        if config.host_transport.is_some() && spawner.is_none() {
            return Err(RpcServiceNodeError::MissingSpawner);
        }

        let state = Arc::new(RpcServiceNodeState {
            request_ids: RpcIdGenerator::new(),
            pending_requests: Arc::new(RpcPendingRequests::new()),
            host_registry: Arc::new(RpcHostRegistry::new(config.duplicate_host_policy)),
            caller_transport: config.caller_transport,
            host_transport: config.host_transport,
            spawner,
        });

        match (&state.caller_transport, &state.host_transport) {
            (Some(caller), Some(host)) if Arc::ptr_eq(caller, host) => {
                caller.on_message(inbound_handler(Arc::downgrade(&state), RpcInboundRoute::Both));
            }
            (caller, host) => {
                if let Some(caller) = caller {
                    caller.on_message(inbound_handler(
                        Arc::downgrade(&state),
                        RpcInboundRoute::Responses,
                    ));
                }
                if let Some(host) = host {
                    host.on_message(inbound_handler(
                        Arc::downgrade(&state),
                        RpcInboundRoute::Requests,
                    ));
                }
            }
        }

        Ok(Self { state })
    }

    /// Makes `host` callable by remote peers under `host_name`.
    pub fn register_host<H>(
        &self,
        host_name: impl Into<String>,
        host: H,
    ) -> Result<(), RpcServiceEndpointError>
    where
        H: RpcHost + 'static,
    {
        self.state.host_registry.register(host_name, Arc::new(host))
    }

    /// Returns a proxy whose calls are issued through this node.
    pub fn create_proxy(&self, host_name: &str) -> RpcProxy {
        let caller: Weak<RpcServiceNodeState> = Arc::downgrade(&self.state);
        RpcProxy::new(host_name, caller)
    }

    /// Routes an inbound envelope and waits until it has been handled.
    ///
    /// For transports that drive their own receive loop instead of using
    /// `RpcTransport::on_message`. Requests are answered before this
    /// returns.
    pub async fn handle_message(&self, envelope: RpcEnvelope) -> Result<(), RpcServiceEndpointError> {
        match envelope.kind() {
            RpcEnvelopeKind::Response => {
                self.state.handle_response(envelope);
                Ok(())
            }
            RpcEnvelopeKind::Request => self.state.handle_request(envelope).await,
        }
    }

    pub fn host_registry(&self) -> Arc<RpcHostRegistry> {
        self.state.get_host_registry()
    }

    pub fn pending_request_count(&self) -> usize {
        self.state.pending_requests.len()
    }

    /// Diagnostic view of the requests still awaiting a response.
    pub fn pending_requests(&self) -> Vec<RpcPendingRequestInfo> {
        self.state.pending_requests.snapshot()
    }

    /// Rejects every outstanding call with `RpcCallerError::Aborted`.
    ///
    /// Meant for when the caller transport goes away and no response can
    /// arrive any more. Returns how many calls were rejected.
    pub fn abort_pending_requests(&self) -> usize {
        let count = self
            .state
            .pending_requests
            .reject_all(|| RpcCallerError::Aborted);
        if count > 0 {
            tracing::debug!(count, "aborted pending requests");
        }
        count
    }
}

impl RpcServiceCallerInterface for RpcServiceNode {
    fn get_pending_requests(&self) -> Arc<RpcPendingRequests> {
        self.state.get_pending_requests()
    }

    fn get_request_transport(&self) -> Option<Arc<dyn RpcTransport>> {
        self.state.get_request_transport()
    }

    fn next_request_id(&self) -> RpcRequestId {
        self.state.next_request_id()
    }
}

#[async_trait::async_trait]
impl RpcServiceEndpointInterface for RpcServiceNode {
    fn get_host_registry(&self) -> Arc<RpcHostRegistry> {
        self.state.get_host_registry()
    }

    fn get_response_transport(&self) -> Option<Arc<dyn RpcTransport>> {
        self.state.get_response_transport()
    }
}
