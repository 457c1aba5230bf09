use std::fmt;

/// Errors raised while building an `RpcServiceNode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcServiceNodeError {
    /// A host transport was configured but there is no spawner to drive
    /// inbound requests.
    MissingSpawner,
}

impl fmt::Display for RpcServiceNodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcServiceNodeError::MissingSpawner => write!(
                f,
                "a host transport requires a spawner (configure one or enable `tokio_support`)"
            ),
        }
    }
}

impl std::error::Error for RpcServiceNodeError {}
