use crate::rpc::{RpcErrorKind, RpcValue};
use std::fmt;

/// Correlation id of a request and its response.
pub type RpcRequestId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcEnvelopeKind {
    Request,
    Response,
}

/// Invocation of `method_name` on the host registered as `host_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub host_name: String,
    pub method_name: String,
    /// Positional arguments, applied in order.
    pub args: Vec<RpcValue>,
}

/// Structured failure carried back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRemoteError {
    pub kind: RpcErrorKind,
    pub message: String,
}

impl RpcRemoteError {
    pub fn new(kind: RpcErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RpcRemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RpcRemoteError {}

/// Outcome of a request. `return_value` is only meaningful when `error` is
/// `None`; failed responses carry `RpcValue::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub return_value: RpcValue,
    pub error: Option<RpcRemoteError>,
}

impl RpcResponse {
    pub fn success(return_value: impl Into<RpcValue>) -> Self {
        Self {
            return_value: return_value.into(),
            error: None,
        }
    }

    pub fn failure(error: RpcRemoteError) -> Self {
        Self {
            return_value: RpcValue::Null,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Splits the response into the value the caller should observe.
    pub fn into_result(self) -> Result<RpcValue, RpcRemoteError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.return_value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcPayload {
    Request(RpcRequest),
    Response(RpcResponse),
}

/// The unit exchanged over a transport.
///
/// An envelope is immutable once built: the id and payload can be read or
/// the envelope consumed, but never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcEnvelope {
    id: RpcRequestId,
    payload: RpcPayload,
}

impl RpcEnvelope {
    pub fn request(id: RpcRequestId, request: RpcRequest) -> Self {
        Self {
            id,
            payload: RpcPayload::Request(request),
        }
    }

    pub fn response(id: RpcRequestId, response: RpcResponse) -> Self {
        Self {
            id,
            payload: RpcPayload::Response(response),
        }
    }

    pub fn id(&self) -> RpcRequestId {
        self.id
    }

    pub fn kind(&self) -> RpcEnvelopeKind {
        match self.payload {
            RpcPayload::Request(_) => RpcEnvelopeKind::Request,
            RpcPayload::Response(_) => RpcEnvelopeKind::Response,
        }
    }

    pub fn payload(&self) -> &RpcPayload {
        &self.payload
    }

    pub fn as_request(&self) -> Option<&RpcRequest> {
        match &self.payload {
            RpcPayload::Request(request) => Some(request),
            RpcPayload::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&RpcResponse> {
        match &self.payload {
            RpcPayload::Response(response) => Some(response),
            RpcPayload::Request(_) => None,
        }
    }

    pub fn into_payload(self) -> RpcPayload {
        self.payload
    }

    pub fn into_parts(self) -> (RpcRequestId, RpcPayload) {
        (self.id, self.payload)
    }
}
