use crate::error::RpcCallerError;
use crate::pending_requests::{RpcCallResult, RpcPendingRequests};
use futures::FutureExt;
use futures::channel::oneshot;
use hostrpc::rpc::{RpcRequestId, RpcValue};
use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

/// The future returned for an issued request.
///
/// It completes only through the response path (or through cancellation and
/// deadlines). Dropping it before it settles removes the pending record, so
/// an abandoned call never lingers in the table.
#[must_use = "the call result is only observable by awaiting the future"]
pub struct RpcPendingCall {
    id: RpcRequestId,
    receiver: oneshot::Receiver<RpcCallResult>,
    pending_requests: Weak<RpcPendingRequests>,
    is_settled: bool,
}

impl RpcPendingCall {
    pub(crate) fn new(
        id: RpcRequestId,
        receiver: oneshot::Receiver<RpcCallResult>,
        pending_requests: Weak<RpcPendingRequests>,
    ) -> Self {
        Self {
            id,
            receiver,
            pending_requests,
            is_settled: false,
        }
    }

    pub fn id(&self) -> RpcRequestId {
        self.id
    }

    /// A handle that can cancel this call from elsewhere.
    pub fn cancel_handle(&self) -> RpcCancelHandle {
        RpcCancelHandle {
            id: self.id,
            pending_requests: self.pending_requests.clone(),
        }
    }

    /// Races the call against `deadline`.
    ///
    /// If `deadline` completes first, the pending record is removed and the
    /// call fails with `RpcCallerError::Timeout`. Works with any runtime's
    /// timer future.
    pub async fn with_deadline<D>(self, deadline: D) -> RpcCallResult
    where
        D: Future<Output = ()>,
    {
        let id = self.id;
        let call = self.fuse();
        let deadline = deadline.fuse();
        futures::pin_mut!(call, deadline);

        futures::select_biased! {
            result = call => result,
            () = deadline => {
                // Dropping `call` at the end of this scope discards the record.
                tracing::debug!(id, "rpc call deadline elapsed");
                Err(RpcCallerError::Timeout)
            }
        }
    }

    /// Fails the call with `RpcCallerError::Timeout` if no response arrives
    /// within `timeout`.
    #[cfg(feature = "tokio_support")]
    pub async fn with_timeout(self, timeout: std::time::Duration) -> RpcCallResult {
        self.with_deadline(tokio::time::sleep(timeout)).await
    }
}

impl Future for RpcPendingCall {
    type Output = Result<RpcValue, RpcCallerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => {
                this.is_settled = true;
                Poll::Ready(result)
            }
            // The sender was dropped without a result: the table went away.
            Poll::Ready(Err(oneshot::Canceled)) => {
                this.is_settled = true;
                Poll::Ready(Err(RpcCallerError::Aborted))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RpcPendingCall {
    fn drop(&mut self) {
        if self.is_settled {
            return;
        }

        // A result may already be sitting in the channel; in that case the
        // record is gone and there is nothing to discard.
        if let Ok(Some(_)) = self.receiver.try_recv() {
            return;
        }

        if let Some(pending_requests) = self.pending_requests.upgrade() {
            if pending_requests.discard(self.id) {
                tracing::trace!(id = self.id, "discarded pending rpc call");
            }
        }
    }
}

/// Cancels a pending call from outside the future that awaits it.
#[derive(Clone, Debug)]
pub struct RpcCancelHandle {
    id: RpcRequestId,
    pending_requests: Weak<RpcPendingRequests>,
}

impl RpcCancelHandle {
    pub fn id(&self) -> RpcRequestId {
        self.id
    }

    /// Removes the pending record and rejects the call with
    /// `RpcCallerError::Cancelled`.
    ///
    /// Returns `false` if the call had already settled.
    pub fn cancel(&self) -> bool {
        let Some(pending_requests) = self.pending_requests.upgrade() else {
            return false;
        };

        let cancelled = pending_requests.reject(self.id, RpcCallerError::Cancelled);
        if cancelled {
            tracing::debug!(id = self.id, "cancelled rpc call");
        }
        cancelled
    }
}
