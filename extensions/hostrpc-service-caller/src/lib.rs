mod caller_interface;
pub use caller_interface::*;

pub mod error;

mod pending_call;
pub use pending_call::*;

mod pending_requests;
pub use pending_requests::*;

mod proxy;
pub use proxy::*;

pub mod typed;
