#![allow(dead_code)] // Each test binary uses a different subset of these helpers.

use futures::future::BoxFuture;
use hostrpc::rpc::{RpcEnvelope, RpcMessageHandler, RpcTransport, RpcTransportError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

type SharedHandler = Arc<dyn Fn(RpcEnvelope) + Send + Sync>;

/// Drives inbound requests on the test's tokio runtime.
pub fn tokio_spawner(fut: BoxFuture<'static, ()>) {
    tokio::spawn(fut);
}

/// One end of an in-memory channel that delivers synchronously to its peer.
#[derive(Default)]
pub struct LoopbackTransport {
    handler: Mutex<Option<SharedHandler>>,
    peer: Mutex<Weak<LoopbackTransport>>,
}

/// Two connected loopback ends.
pub fn loopback_pair() -> (Arc<LoopbackTransport>, Arc<LoopbackTransport>) {
    let a = Arc::new(LoopbackTransport::default());
    let b = Arc::new(LoopbackTransport::default());
    *a.peer.lock().unwrap() = Arc::downgrade(&b);
    *b.peer.lock().unwrap() = Arc::downgrade(&a);
    (a, b)
}

impl RpcTransport for LoopbackTransport {
    fn send(&self, envelope: RpcEnvelope) -> Result<(), RpcTransportError> {
        let peer = self
            .peer
            .lock()
            .unwrap()
            .upgrade()
            .ok_or(RpcTransportError::Closed)?;

        // Clone the handler out so the lock is not held while it runs.
        let handler = peer
            .handler
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RpcTransportError::Other("peer has no handler".into()))?;

        handler(envelope);
        Ok(())
    }

    fn on_message(&self, handler: RpcMessageHandler) {
        *self.handler.lock().unwrap() = Some(Arc::from(handler));
    }
}

/// Records every outbound envelope and lets the test inject inbound ones.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<RpcEnvelope>>,
    handler: Mutex<Option<SharedHandler>>,
    is_failing: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<RpcEnvelope> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, is_failing: bool) {
        self.is_failing.store(is_failing, Ordering::SeqCst);
    }

    pub fn has_handler(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }

    /// Feeds `envelope` to the registered inbound callback.
    pub fn deliver(&self, envelope: RpcEnvelope) {
        let handler = self
            .handler
            .lock()
            .unwrap()
            .clone()
            .expect("no inbound handler registered");
        handler(envelope);
    }
}

impl RpcTransport for RecordingTransport {
    fn send(&self, envelope: RpcEnvelope) -> Result<(), RpcTransportError> {
        if self.is_failing.load(Ordering::SeqCst) {
            return Err(RpcTransportError::Closed);
        }
        self.sent.lock().unwrap().push(envelope);
        Ok(())
    }

    fn on_message(&self, handler: RpcMessageHandler) {
        *self.handler.lock().unwrap() = Some(Arc::from(handler));
    }
}
