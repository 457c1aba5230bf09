use crate::rpc::RpcEnvelope;
use std::fmt;
use std::io;

/// Callback a transport invokes once per inbound envelope.
pub type RpcMessageHandler = Box<dyn Fn(RpcEnvelope) + Send + Sync>;

/// The channel an RPC service talks through.
///
/// Implementations only move envelopes; correlating requests with responses
/// is entirely the service's job. Any technology works (in-process channels,
/// worker threads, sockets, pipes) as long as it can send an envelope and
/// call back when one arrives.
pub trait RpcTransport: Send + Sync {
    /// Hands an outbound envelope to the transport.
    ///
    /// Fire-and-forget: `Ok` means the transport accepted the envelope, not
    /// that the peer received it. A synchronous failure is reported to
    /// whoever issued the send.
    fn send(&self, envelope: RpcEnvelope) -> Result<(), RpcTransportError>;

    /// Registers the callback invoked for every inbound envelope, in the
    /// order the transport delivers them.
    fn on_message(&self, handler: RpcMessageHandler);
}

/// Synchronous failure reported by `RpcTransport::send`.
#[derive(Debug)]
pub enum RpcTransportError {
    /// The channel is closed and will not accept further envelopes.
    Closed,
    /// An I/O error occurred while handing off the envelope.
    Io(io::Error),
    /// Any other transport-specific failure.
    Other(String),
}

impl fmt::Display for RpcTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcTransportError::Closed => write!(f, "transport is closed"),
            RpcTransportError::Io(e) => write!(f, "transport I/O error: {}", e),
            RpcTransportError::Other(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for RpcTransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcTransportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RpcTransportError {
    fn from(e: io::Error) -> Self {
        RpcTransportError::Io(e)
    }
}
