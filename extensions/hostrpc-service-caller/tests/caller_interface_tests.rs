use example_hostrpc_service_definition::typed::{Add, ProcessData};
use hostrpc::rpc::{
    RpcEnvelope, RpcErrorKind, RpcMessageHandler, RpcRemoteError, RpcRequest, RpcRequestId,
    RpcResponse, RpcTransport, RpcTransportError, RpcValue, RpcValueError,
};
use hostrpc::utils::RpcIdGenerator;
use hostrpc_service_caller::error::RpcCallerError;
use hostrpc_service_caller::typed::RpcCallTyped;
use hostrpc_service_caller::{RpcPendingRequests, RpcProxy, RpcServiceCallerInterface};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Records outbound envelopes, optionally failing every send.
#[derive(Default)]
struct MockTransport {
    sent: Mutex<Vec<RpcEnvelope>>,
    should_fail: bool,
    // Whether the pending table already held the request when it was sent.
    seen_pending: Mutex<Vec<bool>>,
    pending_requests: Mutex<Weak<RpcPendingRequests>>,
}

impl RpcTransport for MockTransport {
    fn send(&self, envelope: RpcEnvelope) -> Result<(), RpcTransportError> {
        if let Some(pending) = self.pending_requests.lock().unwrap().upgrade() {
            self.seen_pending.lock().unwrap().push(pending.contains(envelope.id()));
        }
        if self.should_fail {
            return Err(RpcTransportError::Other("link down".into()));
        }
        self.sent.lock().unwrap().push(envelope);
        Ok(())
    }

    fn on_message(&self, _handler: RpcMessageHandler) {}
}

struct MockCaller {
    ids: RpcIdGenerator,
    pending_requests: Arc<RpcPendingRequests>,
    transport: Option<Arc<MockTransport>>,
    fixed_id: Option<RpcRequestId>,
}

impl MockCaller {
    fn new(transport: Option<Arc<MockTransport>>) -> Self {
        let pending_requests = Arc::new(RpcPendingRequests::new());
        if let Some(transport) = &transport {
            *transport.pending_requests.lock().unwrap() = Arc::downgrade(&pending_requests);
        }
        Self {
            ids: RpcIdGenerator::new(),
            pending_requests,
            transport,
            fixed_id: None,
        }
    }

    fn connected() -> (Self, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::default());
        (Self::new(Some(Arc::clone(&transport))), transport)
    }

    fn respond(&self, id: RpcRequestId, response: RpcResponse) -> bool {
        self.handle_response(RpcEnvelope::response(id, response))
    }
}

impl RpcServiceCallerInterface for MockCaller {
    fn get_pending_requests(&self) -> Arc<RpcPendingRequests> {
        Arc::clone(&self.pending_requests)
    }

    fn get_request_transport(&self) -> Option<Arc<dyn RpcTransport>> {
        self.transport
            .clone()
            .map(|transport| transport as Arc<dyn RpcTransport>)
    }

    fn next_request_id(&self) -> RpcRequestId {
        self.fixed_id.unwrap_or_else(|| self.ids.next_id())
    }
}

#[tokio::test]
async fn test_record_exists_before_transport_sees_request() {
    let (caller, transport) = MockCaller::connected();

    let call = caller
        .send_request("Calc", "add", vec![RpcValue::Int(1), RpcValue::Int(2)])
        .unwrap();

    assert_eq!(*transport.seen_pending.lock().unwrap(), vec![true]);
    assert!(caller.pending_requests.contains(call.id()));

    let sent = transport.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].as_request(),
        Some(&RpcRequest {
            host_name: "Calc".into(),
            method_name: "add".into(),
            args: vec![RpcValue::Int(1), RpcValue::Int(2)],
        })
    );
}

#[tokio::test]
async fn test_send_failure_removes_record() {
    let transport = Arc::new(MockTransport {
        should_fail: true,
        ..Default::default()
    });
    let caller = MockCaller::new(Some(Arc::clone(&transport)));

    let result = caller.send_request("Calc", "add", vec![]);

    match result {
        Err(RpcCallerError::Transport(err)) => assert!(err.to_string().contains("link down")),
        other => panic!("unexpected result: {:?}", other.map(|call| call.id())),
    }
    // The record was present while sending, then removed.
    assert_eq!(*transport.seen_pending.lock().unwrap(), vec![true]);
    assert!(caller.pending_requests.is_empty());
}

#[tokio::test]
async fn test_empty_names_are_rejected_before_sending() {
    let (caller, transport) = MockCaller::connected();

    assert!(matches!(
        caller.send_request("", "add", vec![]),
        Err(RpcCallerError::InvalidRequest(_))
    ));
    assert!(matches!(
        caller.send_request("Calc", "", vec![]),
        Err(RpcCallerError::InvalidRequest(_))
    ));

    assert!(transport.sent.lock().unwrap().is_empty());
    assert!(caller.pending_requests.is_empty());
}

#[tokio::test]
async fn test_missing_transport_is_reported() {
    let caller = MockCaller::new(None);

    assert!(matches!(
        caller.send_request("Calc", "add", vec![]),
        Err(RpcCallerError::NoTransport)
    ));
}

#[tokio::test]
async fn test_response_completes_exactly_once() {
    let (caller, _transport) = MockCaller::connected();

    let call = caller.send_request("Calc", "add", vec![]).unwrap();
    let id = call.id();

    assert!(caller.respond(id, RpcResponse::success("first")));
    assert!(!caller.respond(id, RpcResponse::success("second")));

    assert_eq!(call.await.unwrap(), RpcValue::from("first"));
}

#[tokio::test]
async fn test_remote_failure_maps_to_remote_error() {
    let (caller, _transport) = MockCaller::connected();

    let call = caller.send_request("Calc", "div", vec![]).unwrap();
    caller.respond(
        call.id(),
        RpcResponse::failure(RpcRemoteError::new(
            RpcErrorKind::UnknownMethod,
            "host \"Calc\" has no method \"div\"",
        )),
    );

    let err = call.await.unwrap_err();
    assert_eq!(err.remote_kind(), Some(RpcErrorKind::UnknownMethod));
    assert!(err.to_string().contains("div"));
}

#[tokio::test]
async fn test_request_envelope_on_response_path_is_ignored() {
    let (caller, _transport) = MockCaller::connected();
    let call = caller.send_request("Calc", "add", vec![]).unwrap();

    let stray = RpcEnvelope::request(
        call.id(),
        RpcRequest {
            host_name: "Calc".into(),
            method_name: "add".into(),
            args: vec![],
        },
    );

    assert!(!caller.handle_response(stray));
    assert!(caller.pending_requests.contains(call.id()));
}

#[tokio::test]
async fn test_reused_id_aborts_older_call() {
    let (mut caller, _transport) = MockCaller::connected();
    caller.fixed_id = Some(7);

    let older = caller.send_request("Calc", "add", vec![]).unwrap();
    let newer = caller.send_request("Calc", "sub", vec![]).unwrap();

    assert!(matches!(older.await, Err(RpcCallerError::Aborted)));

    assert!(caller.respond(7, RpcResponse::success(1i64)));
    assert_eq!(newer.await.unwrap(), RpcValue::Int(1));
}

#[tokio::test]
async fn test_deadline_does_not_fire_when_response_arrives_first() {
    let (caller, _transport) = MockCaller::connected();

    let call = caller.send_request("Calc", "add", vec![]).unwrap();
    caller.respond(call.id(), RpcResponse::success(3i64));

    let result = call
        .with_deadline(tokio::time::sleep(Duration::from_secs(5)))
        .await;

    assert_eq!(result.unwrap(), RpcValue::Int(3));
}

#[tokio::test]
async fn test_deadline_elapses_and_discards_record() {
    let (caller, _transport) = MockCaller::connected();

    let call = caller.send_request("Calc", "add", vec![]).unwrap();
    let id = call.id();

    let result = call
        .with_deadline(tokio::time::sleep(Duration::from_millis(5)))
        .await;

    assert!(matches!(result, Err(RpcCallerError::Timeout)));
    assert!(!caller.pending_requests.contains(id));
}

#[tokio::test]
async fn test_cancel_after_settle_is_a_no_op() {
    let (caller, _transport) = MockCaller::connected();

    let call = caller.send_request("Calc", "add", vec![]).unwrap();
    let handle = call.cancel_handle();
    assert_eq!(handle.id(), call.id());

    caller.respond(call.id(), RpcResponse::success(true));
    assert!(!handle.cancel());
    assert_eq!(call.await.unwrap(), RpcValue::Bool(true));
}

#[tokio::test]
async fn test_cancel_handle_outliving_caller_returns_false() {
    let (caller, _transport) = MockCaller::connected();

    let call = caller.send_request("Calc", "add", vec![]).unwrap();
    let handle = call.cancel_handle();

    drop(caller);

    assert!(!handle.cancel());
    assert!(matches!(call.await, Err(RpcCallerError::Aborted)));
}

#[tokio::test]
async fn test_dropped_call_leaves_no_record() {
    let (caller, _transport) = MockCaller::connected();

    let first = caller.send_request("Calc", "add", vec![]).unwrap();
    let second = caller.send_request("Calc", "add", vec![]).unwrap();
    drop(first);

    let snapshot = caller.pending_requests.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, second.id());
}

#[tokio::test]
async fn test_reject_all_settles_every_call() {
    let (caller, _transport) = MockCaller::connected();

    let calls: Vec<_> = (0..3)
        .map(|_| caller.send_request("Calc", "add", vec![]).unwrap())
        .collect();

    let rejected = caller.pending_requests.reject_all(|| RpcCallerError::Aborted);
    assert_eq!(rejected, 3);

    for call in calls {
        assert!(matches!(call.await, Err(RpcCallerError::Aborted)));
    }
    assert!(caller.pending_requests.is_empty());
}

#[tokio::test]
async fn test_snapshot_is_ordered_by_id() {
    let (caller, _transport) = MockCaller::connected();

    let _calls: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|method| {
            caller
                .send_request("Calc", method, vec![RpcValue::Null])
                .unwrap()
        })
        .collect();

    let snapshot = caller.pending_requests.snapshot();
    let ids: Vec<_> = snapshot.iter().map(|info| info.id).collect();
    let methods: Vec<_> = snapshot.iter().map(|info| info.method_name.as_str()).collect();

    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(methods, vec!["a", "b", "c"]);
    assert!(snapshot.iter().all(|info| info.arg_count == 1));
}

#[tokio::test]
async fn test_typed_call_encodes_args_and_decodes_return() {
    let caller = Arc::new(MockCaller::connected().0);
    let transport = caller.transport.clone().unwrap();

    let pending = {
        let caller = Arc::clone(&caller);
        tokio::spawn(async move { Add::call(&*caller, (2, 3)).await })
    };

    // Wait for the request to go out, then answer it.
    let id = loop {
        if let Some(envelope) = transport.sent.lock().unwrap().first() {
            break envelope.id();
        }
        tokio::task::yield_now().await;
    };
    let request = transport.sent.lock().unwrap()[0].as_request().cloned().unwrap();
    assert_eq!(request.host_name, "Calc");
    assert_eq!(request.args, vec![RpcValue::Int(2), RpcValue::Int(3)]);

    caller.respond(id, RpcResponse::success(5i64));
    assert_eq!(pending.await.unwrap().unwrap(), 5);
}

#[tokio::test]
async fn test_typed_call_reports_undecodable_return() {
    let caller = Arc::new(MockCaller::connected().0);
    let transport = caller.transport.clone().unwrap();

    let pending = {
        let caller = Arc::clone(&caller);
        tokio::spawn(async move { ProcessData::call(&*caller, vec![1.0]).await })
    };

    let id = loop {
        if let Some(envelope) = transport.sent.lock().unwrap().first() {
            break envelope.id();
        }
        tokio::task::yield_now().await;
    };
    caller.respond(id, RpcResponse::success("fourteen"));

    match pending.await.unwrap() {
        Err(RpcCallerError::Serialization(RpcValueError::TypeMismatch { expected, found })) => {
            assert_eq!(expected, "float");
            assert_eq!(found, "string");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_proxy_issues_calls_through_its_caller() {
    let (caller, transport) = MockCaller::connected();
    let caller: Arc<dyn RpcServiceCallerInterface> = Arc::new(caller);

    let proxy = RpcProxy::new("Calc", Arc::downgrade(&caller));
    assert_eq!(proxy.host_name(), "Calc");
    assert!(proxy.is_connected());

    let call = proxy.call("add", vec![RpcValue::Int(1)]).unwrap();
    let sent = transport.sent.lock().unwrap().clone();
    assert_eq!(sent[0].as_request().map(|r| r.host_name.as_str()), Some("Calc"));

    caller.handle_response(RpcEnvelope::response(call.id(), RpcResponse::success(1i64)));
    assert_eq!(call.await.unwrap(), RpcValue::Int(1));
}

#[tokio::test]
async fn test_proxy_outliving_caller_is_aborted() {
    let (caller, _transport) = MockCaller::connected();
    let caller: Arc<dyn RpcServiceCallerInterface> = Arc::new(caller);
    let proxy = RpcProxy::new("Calc", Arc::downgrade(&caller));

    drop(caller);

    assert!(!proxy.is_connected());
    assert!(matches!(
        proxy.invoke("add", vec![]).await,
        Err(RpcCallerError::Aborted)
    ));
}
