use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Failure classes a host can report back to a caller.
///
/// The kind travels in the response envelope next to a human-readable
/// message so callers can branch on it instead of parsing strings.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum RpcErrorKind {
    /// The request named a host that is not registered.
    UnknownHost = 0,
    /// The host exists but exposes no method with the requested name.
    UnknownMethod = 1,
    /// The method ran and failed (returned an error or panicked).
    HostMethodFailure = 2,
    /// Arguments or return value could not be converted.
    SerializationError = 3,
}

impl fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RpcErrorKind::UnknownHost => "unknown host",
            RpcErrorKind::UnknownMethod => "unknown method",
            RpcErrorKind::HostMethodFailure => "host method failure",
            RpcErrorKind::SerializationError => "serialization error",
        };
        f.write_str(label)
    }
}
