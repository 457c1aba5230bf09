mod endpoint_interface;
pub use endpoint_interface::*;

pub mod error;
pub use error::{RpcHostError, RpcServiceEndpointError};

mod host;
pub use host::*;

mod host_registry;
pub use host_registry::*;
