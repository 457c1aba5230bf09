use hostrpc::rpc::{RpcErrorKind, RpcRemoteError, RpcTransportError, RpcValueError};
use std::fmt;

/// Failure reported by a host method.
///
/// Hosts return this from their methods; the endpoint turns it into a
/// `HostMethodFailure` (or `SerializationError`) response.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcHostError {
    kind: RpcErrorKind,
    message: String,
}

impl RpcHostError {
    /// The method ran and failed.
    pub fn failure(message: impl fmt::Display) -> Self {
        Self {
            kind: RpcErrorKind::HostMethodFailure,
            message: message.to_string(),
        }
    }

    /// Arguments or the return value could not be converted.
    pub fn serialization(message: impl fmt::Display) -> Self {
        Self {
            kind: RpcErrorKind::SerializationError,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> RpcErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RpcHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RpcHostError {}

impl From<RpcValueError> for RpcHostError {
    fn from(err: RpcValueError) -> Self {
        RpcHostError::serialization(err)
    }
}

impl From<String> for RpcHostError {
    fn from(message: String) -> Self {
        RpcHostError::failure(message)
    }
}

impl From<&str> for RpcHostError {
    fn from(message: &str) -> Self {
        RpcHostError::failure(message)
    }
}

#[derive(Debug)]
pub enum RpcServiceEndpointError {
    /// No host is registered under the requested name.
    UnknownHost { host_name: String },
    /// The host does not expose the requested method.
    UnknownMethod {
        host_name: String,
        method_name: String,
    },
    /// The host method returned an error or panicked.
    HostMethodFailure(String),
    /// Arguments or the return value could not be converted.
    Serialization(String),
    /// A host is already registered under this name and duplicates are rejected.
    DuplicateHost(String),
    /// The endpoint has no transport to send responses through.
    NoTransport,
    /// The transport rejected a response synchronously.
    Transport(RpcTransportError),
}

impl RpcServiceEndpointError {
    /// The wire-level kind for errors that are reported back to the caller.
    pub fn kind(&self) -> Option<RpcErrorKind> {
        match self {
            RpcServiceEndpointError::UnknownHost { .. } => Some(RpcErrorKind::UnknownHost),
            RpcServiceEndpointError::UnknownMethod { .. } => Some(RpcErrorKind::UnknownMethod),
            RpcServiceEndpointError::HostMethodFailure(_) => Some(RpcErrorKind::HostMethodFailure),
            RpcServiceEndpointError::Serialization(_) => Some(RpcErrorKind::SerializationError),
            _ => None,
        }
    }

    /// Converts the error into what travels back in the response envelope.
    ///
    /// The kind is carried separately, so the message leaves it out.
    pub fn to_remote_error(&self) -> RpcRemoteError {
        let kind = self.kind().unwrap_or(RpcErrorKind::HostMethodFailure);
        let message = match self {
            RpcServiceEndpointError::UnknownHost { host_name } => {
                format!("no host registered as \"{}\"", host_name)
            }
            RpcServiceEndpointError::UnknownMethod {
                host_name,
                method_name,
            } => format!("host \"{}\" has no method \"{}\"", host_name, method_name),
            other => other.to_string(),
        };
        RpcRemoteError::new(kind, message)
    }
}

impl fmt::Display for RpcServiceEndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcServiceEndpointError::UnknownHost { host_name } => {
                write!(f, "unknown host \"{}\"", host_name)
            }
            RpcServiceEndpointError::UnknownMethod {
                host_name,
                method_name,
            } => write!(
                f,
                "unknown method \"{}\" on host \"{}\"",
                method_name, host_name
            ),
            RpcServiceEndpointError::HostMethodFailure(msg) => write!(f, "{}", msg),
            RpcServiceEndpointError::Serialization(msg) => write!(f, "{}", msg),
            RpcServiceEndpointError::DuplicateHost(host_name) => {
                write!(f, "a host named \"{}\" is already registered", host_name)
            }
            RpcServiceEndpointError::NoTransport => write!(f, "no response transport configured"),
            RpcServiceEndpointError::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl std::error::Error for RpcServiceEndpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcServiceEndpointError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RpcHostError> for RpcServiceEndpointError {
    fn from(err: RpcHostError) -> Self {
        match err.kind {
            RpcErrorKind::SerializationError => RpcServiceEndpointError::Serialization(err.message),
            _ => RpcServiceEndpointError::HostMethodFailure(err.message),
        }
    }
}

impl From<RpcTransportError> for RpcServiceEndpointError {
    fn from(err: RpcTransportError) -> Self {
        RpcServiceEndpointError::Transport(err)
    }
}
