use crate::error::RpcServiceEndpointError;
use crate::host_registry::RpcHostRegistry;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use hostrpc::rpc::{
    RpcEnvelope, RpcPayload, RpcRequest, RpcRequestId, RpcResponse, RpcTransport, RpcValue,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub type RpcExecuteFuture = BoxFuture<'static, Result<RpcValue, RpcServiceEndpointError>>;

#[async_trait::async_trait]
pub trait RpcServiceEndpointInterface: Send + Sync {
    fn get_host_registry(&self) -> Arc<RpcHostRegistry>;

    /// The transport responses are sent through, if this endpoint serves
    /// requests at all.
    fn get_response_transport(&self) -> Option<Arc<dyn RpcTransport>>;

    /// Resolves `host_name`/`method_name` and invokes the method with `args`
    /// applied positionally.
    ///
    /// The outcome is always a future: lookups that fail produce an
    /// already-failed one, synchronous host methods an already-completed one,
    /// and asynchronous host methods are awaited unchanged. A panic inside
    /// the host is reported as `HostMethodFailure`.
    fn execute_host_method(
        &self,
        host_name: &str,
        method_name: &str,
        args: Vec<RpcValue>,
    ) -> RpcExecuteFuture {
        let Some(host) = self.get_host_registry().get(host_name) else {
            return future::ready(Err(RpcServiceEndpointError::UnknownHost {
                host_name: host_name.to_string(),
            }))
            .boxed();
        };

        let invoked = panic::catch_unwind(AssertUnwindSafe(|| host.invoke(method_name, args)));
        let host_future = match invoked {
            Ok(Some(host_future)) => host_future,
            Ok(None) => {
                return future::ready(Err(RpcServiceEndpointError::UnknownMethod {
                    host_name: host_name.to_string(),
                    method_name: method_name.to_string(),
                }))
                .boxed();
            }
            Err(payload) => {
                return future::ready(Err(panicked(host_name, method_name, payload))).boxed();
            }
        };

        let host_name = host_name.to_string();
        let method_name = method_name.to_string();

        async move {
            match AssertUnwindSafe(host_future).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(err.into()),
                Err(payload) => Err(panicked(&host_name, &method_name, payload)),
            }
        }
        .boxed()
    }

    /// Services one request envelope and sends exactly one response with the
    /// same id, whether the call succeeded or not.
    ///
    /// Only a failure to send the response is returned as an error; host-side
    /// failures travel back to the caller inside the response.
    async fn handle_request(&self, envelope: RpcEnvelope) -> Result<(), RpcServiceEndpointError> {
        let (id, payload) = envelope.into_parts();

        let RpcRequest {
            host_name,
            method_name,
            args,
        } = match payload {
            RpcPayload::Request(request) => request,
            RpcPayload::Response(_) => {
                tracing::warn!(id, "response envelope passed to the request path; ignoring");
                return Ok(());
            }
        };

        tracing::debug!(
            id,
            host = %host_name,
            method = %method_name,
            arg_count = args.len(),
            "received rpc request"
        );

        let response = match self.execute_host_method(&host_name, &method_name, args).await {
            Ok(return_value) => RpcResponse::success(return_value),
            Err(err) => {
                tracing::debug!(
                    id,
                    host = %host_name,
                    method = %method_name,
                    error = %err,
                    "rpc request failed"
                );
                RpcResponse::failure(err.to_remote_error())
            }
        };

        self.send_response(id, response)
    }

    fn send_response(
        &self,
        id: RpcRequestId,
        response: RpcResponse,
    ) -> Result<(), RpcServiceEndpointError> {
        let transport = self
            .get_response_transport()
            .ok_or(RpcServiceEndpointError::NoTransport)?;

        tracing::debug!(id, is_error = response.is_error(), "sending rpc response");

        transport.send(RpcEnvelope::response(id, response))?;
        Ok(())
    }
}

fn panicked(
    host_name: &str,
    method_name: &str,
    payload: Box<dyn Any + Send>,
) -> RpcServiceEndpointError {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!(host = host_name, method = method_name, %reason, "host method panicked");

    RpcServiceEndpointError::HostMethodFailure(format!(
        "method \"{}\" on host \"{}\" panicked: {}",
        method_name, host_name, reason
    ))
}
