use crate::error::RpcCallerError;
use chrono::{DateTime, Utc};
use futures::channel::oneshot;
use hostrpc::rpc::{RpcRequestId, RpcResponse, RpcValue};
use hostrpc::utils::now;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What an awaited `RpcPendingCall` yields.
pub type RpcCallResult = Result<RpcValue, RpcCallerError>;

/// Bookkeeping for one request that is waiting on its response.
///
/// The host, method, and argument copies are kept for diagnostics only; the
/// record is correlated purely by `id`.
pub struct RpcPendingRequest {
    pub id: RpcRequestId,
    pub host_name: String,
    pub method_name: String,
    pub args: Vec<RpcValue>,
    pub sent_at: DateTime<Utc>,
    responder: oneshot::Sender<RpcCallResult>,
}

impl RpcPendingRequest {
    pub(crate) fn new(
        id: RpcRequestId,
        host_name: &str,
        method_name: &str,
        args: Vec<RpcValue>,
        responder: oneshot::Sender<RpcCallResult>,
    ) -> Self {
        Self {
            id,
            host_name: host_name.to_string(),
            method_name: method_name.to_string(),
            args,
            sent_at: now(),
            responder,
        }
    }

    /// Resolves or rejects the waiting call from a response.
    ///
    /// Consumes the record, so a request can only ever be completed once.
    pub fn complete(self, response: RpcResponse) {
        let result = response.into_result().map_err(RpcCallerError::Remote);
        // The receiver may already be gone if the caller stopped waiting.
        let _ = self.responder.send(result);
    }

    /// Rejects the waiting call with a local error.
    pub fn reject(self, err: RpcCallerError) {
        let _ = self.responder.send(Err(err));
    }

    pub fn info(&self) -> RpcPendingRequestInfo {
        RpcPendingRequestInfo {
            id: self.id,
            host_name: self.host_name.clone(),
            method_name: self.method_name.clone(),
            arg_count: self.args.len(),
            sent_at: self.sent_at,
        }
    }
}

/// Snapshot of a pending request, for observability.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcPendingRequestInfo {
    pub id: RpcRequestId,
    pub host_name: String,
    pub method_name: String,
    pub arg_count: usize,
    pub sent_at: DateTime<Utc>,
}

/// The table of requests awaiting a response, keyed by request id.
///
/// Owned by exactly one caller. Every operation takes the lock for the
/// duration of a single map access, so it is never held across an `.await`
/// or a transport call.
#[derive(Default)]
pub struct RpcPendingRequests {
    requests: Mutex<HashMap<RpcRequestId, RpcPendingRequest>>,
}

impl RpcPendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RpcRequestId, RpcPendingRequest>> {
        // A panic while holding the lock cannot leave the map half-updated,
        // so a poisoned lock is still usable.
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a record, returning any record previously stored under the
    /// same id (only possible after the id counter wraps).
    pub fn insert(&self, request: RpcPendingRequest) -> Option<RpcPendingRequest> {
        self.lock().insert(request.id, request)
    }

    /// Removes and returns the record for `id`.
    pub fn take(&self, id: RpcRequestId) -> Option<RpcPendingRequest> {
        self.lock().remove(&id)
    }

    /// Removes the record for `id` and rejects its call with `err`.
    ///
    /// Returns `false` if the request was no longer pending.
    pub fn reject(&self, id: RpcRequestId, err: RpcCallerError) -> bool {
        match self.take(id) {
            Some(request) => {
                request.reject(err);
                true
            }
            None => false,
        }
    }

    /// Removes the record for `id` without notifying anyone.
    pub fn discard(&self, id: RpcRequestId) -> bool {
        self.take(id).is_some()
    }

    pub fn contains(&self, id: RpcRequestId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Diagnostic view of everything currently pending, ordered by id.
    pub fn snapshot(&self) -> Vec<RpcPendingRequestInfo> {
        let mut infos: Vec<_> = self.lock().values().map(RpcPendingRequest::info).collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Rejects every pending call with the error produced by `make_err`.
    pub fn reject_all<F>(&self, mut make_err: F) -> usize
    where
        F: FnMut() -> RpcCallerError,
    {
        let drained: Vec<_> = self.lock().drain().map(|(_, request)| request).collect();
        let count = drained.len();
        for request in drained {
            request.reject(make_err());
        }
        count
    }
}
