mod config;
pub use config::*;

pub mod error;
pub use error::RpcServiceNodeError;

mod service_node;
pub use service_node::*;
