use hostrpc::rpc::{RpcErrorKind, RpcRemoteError, RpcTransportError, RpcValueError};
use std::fmt;

/// Represents errors that can occur during an RPC call from the perspective of the caller.
#[derive(Debug)]
pub enum RpcCallerError {
    /// The host or method name was empty.
    InvalidRequest(String),
    /// The service has no transport configured for outbound requests.
    NoTransport,
    /// The transport rejected the request synchronously.
    Transport(RpcTransportError),
    /// The remote side answered with an error.
    Remote(RpcRemoteError),
    /// Typed arguments or the typed return value failed to convert.
    Serialization(RpcValueError),
    /// The deadline elapsed before a response arrived.
    Timeout,
    /// The call was cancelled through its `RpcCancelHandle`.
    Cancelled,
    /// The owning service went away before a result could be determined.
    Aborted,
}

impl RpcCallerError {
    /// The remote error kind, if the failure came from the remote side.
    pub fn remote_kind(&self) -> Option<RpcErrorKind> {
        match self {
            RpcCallerError::Remote(err) => Some(err.kind),
            _ => None,
        }
    }
}

impl fmt::Display for RpcCallerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcCallerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            RpcCallerError::NoTransport => write!(f, "No request transport configured"),
            RpcCallerError::Transport(e) => write!(f, "Transport error: {}", e),
            RpcCallerError::Remote(e) => write!(f, "Remote error: {}", e),
            RpcCallerError::Serialization(e) => write!(f, "Serialization error: {}", e),
            RpcCallerError::Timeout => write!(f, "RPC call timed out"),
            RpcCallerError::Cancelled => write!(f, "RPC call cancelled"),
            RpcCallerError::Aborted => write!(f, "RPC call aborted"),
        }
    }
}

impl std::error::Error for RpcCallerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcCallerError::Transport(e) => Some(e),
            RpcCallerError::Remote(e) => Some(e),
            RpcCallerError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RpcTransportError> for RpcCallerError {
    fn from(e: RpcTransportError) -> Self {
        RpcCallerError::Transport(e)
    }
}

impl From<RpcRemoteError> for RpcCallerError {
    fn from(e: RpcRemoteError) -> Self {
        RpcCallerError::Remote(e)
    }
}

impl From<RpcValueError> for RpcCallerError {
    fn from(e: RpcValueError) -> Self {
        RpcCallerError::Serialization(e)
    }
}
