use crate::constants::RPC_INITIAL_REQUEST_ID;
use crate::rpc::RpcRequestId;
use std::sync::atomic::{AtomicU32, Ordering};

/// A simple per-service counter which is initialized at `RPC_INITIAL_REQUEST_ID`.
///
/// Each outbound request takes the next value. The counter wraps on `u32`
/// overflow, which is the only way an id can be handed out twice.
#[derive(Debug)]
pub struct RpcIdGenerator {
    next_id: AtomicU32,
}

impl Default for RpcIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(RPC_INITIAL_REQUEST_ID)
    }

    /// Creates a generator whose first id is `first_id`.
    pub fn starting_at(first_id: RpcRequestId) -> Self {
        Self {
            next_id: AtomicU32::new(first_id),
        }
    }

    #[inline]
    pub fn next_id(&self) -> RpcRequestId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the id the next call to `next_id` will produce.
    #[inline]
    pub fn peek(&self) -> RpcRequestId {
        self.next_id.load(Ordering::Relaxed)
    }
}
