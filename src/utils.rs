mod now;
mod rpc_id_generator;

pub use now::{elapsed_millis, now};
pub use rpc_id_generator::RpcIdGenerator;
