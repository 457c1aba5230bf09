/// Id handed out for the first request issued by a fresh caller.
///
/// Every `RpcIdGenerator` starts counting here; ids are instance-scoped and
/// never shared between services.
pub const RPC_INITIAL_REQUEST_ID: u32 = 0;
