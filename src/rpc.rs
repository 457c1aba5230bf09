mod rpc_envelope;
mod rpc_error_kind;
mod rpc_transport;
mod rpc_value;

pub use rpc_envelope::{
    RpcEnvelope, RpcEnvelopeKind, RpcPayload, RpcRemoteError, RpcRequest, RpcRequestId,
    RpcResponse,
};
pub use rpc_error_kind::RpcErrorKind;
pub use rpc_transport::{RpcMessageHandler, RpcTransport, RpcTransportError};
pub use rpc_value::{FromRpcValue, RpcValue, RpcValueError, take_arg};
