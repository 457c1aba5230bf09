use hostrpc::rpc::{RpcEnvelope, RpcMessageHandler, RpcTransport, RpcTransportError};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type SharedHandler = Arc<dyn Fn(RpcEnvelope) + Send + Sync>;

/// One end of an in-process message channel, standing in for the boundary
/// between a main context and a worker.
///
/// Delivery is asynchronous: `send` only queues the envelope, and a pump task
/// hands it to the peer's registered callback.
pub struct ChannelTransport {
    tx: UnboundedSender<RpcEnvelope>,
    handler: Arc<Mutex<Option<SharedHandler>>>,
}

impl ChannelTransport {
    /// Creates two connected ends.
    ///
    /// Must be called from within a tokio runtime; each end spawns the task
    /// that drains its inbound queue.
    pub fn pair() -> (Arc<Self>, Arc<Self>) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();

        // Each end sends into the other's queue.
        (Self::spawn_end(b_tx, a_rx, "main"), Self::spawn_end(a_tx, b_rx, "worker"))
    }

    fn spawn_end(
        tx: UnboundedSender<RpcEnvelope>,
        mut rx: UnboundedReceiver<RpcEnvelope>,
        label: &'static str,
    ) -> Arc<Self> {
        let handler: Arc<Mutex<Option<SharedHandler>>> = Arc::new(Mutex::new(None));

        let inbound = Arc::clone(&handler);
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let handler = inbound
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();

                match handler {
                    Some(handler) => handler(envelope),
                    None => tracing::warn!(
                        end = label,
                        id = envelope.id(),
                        "no message handler registered; dropping envelope"
                    ),
                }
            }
            tracing::debug!(end = label, "channel closed");
        });

        Arc::new(Self { tx, handler })
    }
}

impl RpcTransport for ChannelTransport {
    fn send(&self, envelope: RpcEnvelope) -> Result<(), RpcTransportError> {
        self.tx
            .send(envelope)
            .map_err(|_| RpcTransportError::Closed)
    }

    fn on_message(&self, handler: RpcMessageHandler) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::from(handler));
    }
}
