use crate::caller_interface::RpcServiceCallerInterface;
use crate::error::RpcCallerError;
use crate::pending_call::RpcPendingCall;
use hostrpc::rpc::RpcValue;
use std::fmt;
use std::sync::{Arc, Weak};

/// A local stand-in for a remote host.
///
/// The proxy only remembers the host name and a weak link to the caller that
/// services it; every call goes through `RpcServiceCallerInterface::send_request`.
/// Once the owning service is dropped, calls fail with `RpcCallerError::Aborted`.
#[derive(Clone)]
pub struct RpcProxy {
    host_name: Arc<str>,
    caller: Weak<dyn RpcServiceCallerInterface>,
}

impl RpcProxy {
    pub fn new(host_name: impl Into<Arc<str>>, caller: Weak<dyn RpcServiceCallerInterface>) -> Self {
        Self {
            host_name: host_name.into(),
            caller,
        }
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Whether the owning service is still alive.
    pub fn is_connected(&self) -> bool {
        self.caller.strong_count() > 0
    }

    /// Issues `method_name` on the proxied host and returns the pending call.
    pub fn call(
        &self,
        method_name: &str,
        args: Vec<RpcValue>,
    ) -> Result<RpcPendingCall, RpcCallerError> {
        let caller = self.caller.upgrade().ok_or(RpcCallerError::Aborted)?;
        caller.send_request(&self.host_name, method_name, args)
    }

    /// Issues `method_name` on the proxied host and waits for the result.
    pub async fn invoke(
        &self,
        method_name: &str,
        args: Vec<RpcValue>,
    ) -> Result<RpcValue, RpcCallerError> {
        self.call(method_name, args)?.await
    }
}

impl fmt::Debug for RpcProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcProxy")
            .field("host_name", &self.host_name)
            .field("is_connected", &self.is_connected())
            .finish()
    }
}
