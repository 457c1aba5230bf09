use futures::future::BoxFuture;
use hostrpc::rpc::RpcTransport;
use hostrpc_service_endpoint::RpcDuplicateHostPolicy;
use std::fmt;
use std::sync::Arc;

/// Runs a detached future to completion on whatever executor the
/// application uses.
pub type RpcSpawnFn = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// Settings for one `RpcServiceNode`.
///
/// A node plays the caller role when it has a `caller_transport` (requests
/// out, responses in) and the host role when it has a `host_transport`
/// (requests in, responses out). Passing the same transport for both makes
/// it a peer that does both over one channel.
#[derive(Clone, Default)]
pub struct RpcServiceNodeConfig {
    pub caller_transport: Option<Arc<dyn RpcTransport>>,
    pub host_transport: Option<Arc<dyn RpcTransport>>,
    pub duplicate_host_policy: RpcDuplicateHostPolicy,
    pub spawner: Option<RpcSpawnFn>,
}

impl RpcServiceNodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends requests and receives responses over `transport`.
    pub fn with_caller_transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.caller_transport = Some(transport);
        self
    }

    /// Receives requests and sends responses over `transport`.
    pub fn with_host_transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.host_transport = Some(transport);
        self
    }

    /// Plays both roles over a single bidirectional `transport`.
    pub fn with_transport(self, transport: Arc<dyn RpcTransport>) -> Self {
        self.with_caller_transport(Arc::clone(&transport))
            .with_host_transport(transport)
    }

    pub fn with_duplicate_host_policy(mut self, policy: RpcDuplicateHostPolicy) -> Self {
        self.duplicate_host_policy = policy;
        self
    }

    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        self.spawner = Some(Arc::new(spawner));
        self
    }

    /// The configured spawner, falling back to `tokio::spawn` when the
    /// `tokio_support` feature is enabled.
    pub(crate) fn resolve_spawner(&self) -> Option<RpcSpawnFn> {
        if let Some(spawner) = &self.spawner {
            return Some(Arc::clone(spawner));
        }

        #[cfg(feature = "tokio_support")]
        let fallback: Option<RpcSpawnFn> = Some(Arc::new(|fut| {
            tokio::spawn(fut);
        }));

        #[cfg(not(feature = "tokio_support"))]
        let fallback: Option<RpcSpawnFn> = None;

        fallback
    }
}

impl fmt::Debug for RpcServiceNodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcServiceNodeConfig")
            .field("caller_transport", &self.caller_transport.is_some())
            .field("host_transport", &self.host_transport.is_some())
            .field("duplicate_host_policy", &self.duplicate_host_policy)
            .field("spawner", &self.spawner.is_some())
            .finish()
    }
}
