//! Dispatcher tests — request routing, response correlation, id generation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cdp_protocol::{
    ErrorCode, Event, HandlerResult, Message, ProtocolError, Request, Response,
};
use cdp_server::{DispatchError, Dispatcher, DispatcherConfig, Domain, IdGenerator, method_fn};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::timeout;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Echo {
    calls: AtomicUsize,
}

impl Echo {
    fn hidden(&self) -> HandlerResult {
        Ok(json!({ "hidden": true }))
    }
}

impl Domain for Echo {
    fn methods(&self) -> &'static [&'static str] {
        &["echo", "nothing", "fail", "failWithCode", "slow", "panic"]
    }

    async fn call(&self, method: &str, params: Value) -> HandlerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method {
            "echo" => Ok(params),
            "nothing" => Ok(Value::Null),
            "fail" => Err(ProtocolError::new("plain failure")),
            "failWithCode" => Err(ProtocolError::with_code(ErrorCode::Custom(-32042), "coded")),
            "slow" => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(json!({ "slow": true }))
            }
            "panic" => panic!("handler blew up"),
            "hidden" => self.hidden(),
            _ => Err(ProtocolError::method_not_found(method)),
        }
    }
}

fn dispatcher() -> (Dispatcher, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher::new(tx), rx)
}

async fn next_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
    let frame = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timeout waiting for frame")
        .expect("Channel closed");
    serde_json::from_str(&frame).unwrap()
}

fn request(id: i64, method: &str, params: Value) -> Message {
    Message::Request(Request::new(id, method, params))
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound requests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn runtime_enable_answers_empty_result() {
    let (mut d, mut rx) = dispatcher();
    d.register_fn("Runtime", "enable", |_| async { Ok(Value::Null) });

    d.handle_message(request(1, "Runtime.enable", json!({}))).await;
    assert_eq!(next_frame(&mut rx).await, json!({ "id": 1, "result": {} }));
}

#[tokio::test]
async fn unknown_domain_answers_error() {
    let (d, mut rx) = dispatcher();

    d.handle_message(request(2, "Bogus.thing", json!({}))).await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["id"], 2);
    assert!(frame.get("result").is_none());
    assert!(!frame["error"]["message"].as_str().unwrap().is_empty());
    assert_eq!(frame["error"]["code"], -32601);
}

#[tokio::test]
async fn unknown_method_in_known_domain_answers_error() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));

    d.handle_message(request(3, "Echo.missing", json!({}))).await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["id"], 3);
    assert_eq!(frame["error"]["code"], -32601);

    d.handle_message(request(4, "nodot", json!({}))).await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["id"], 4);
    assert!(frame["error"]["message"].is_string());
}

#[tokio::test]
async fn diagnostics_do_not_change_error_response() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let d = Dispatcher::with_config(tx, DispatcherConfig { diagnostics: true });

    d.handle_message(request(5, "Bogus.thing", json!({ "a": 1 }))).await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["id"], 5);
    assert!(frame["error"]["message"].as_str().unwrap().contains("Bogus.thing"));
}

#[tokio::test]
async fn handler_result_is_echoed_with_request_id() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));

    d.handle_message(request(42, "Echo.echo", json!({ "x": [1, 2] }))).await;
    assert_eq!(next_frame(&mut rx).await, json!({ "id": 42, "result": { "x": [1, 2] } }));

    d.handle_message(request(43, "Echo.nothing", json!({}))).await;
    assert_eq!(next_frame(&mut rx).await, json!({ "id": 43, "result": {} }));
}

#[tokio::test]
async fn handler_error_without_code_has_message_only() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));

    d.handle_message(request(7, "Echo.fail", json!({}))).await;
    assert_eq!(
        next_frame(&mut rx).await,
        json!({ "id": 7, "error": { "message": "plain failure" } })
    );
}

#[tokio::test]
async fn handler_error_with_code_keeps_code() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));

    d.handle_message(request(8, "Echo.failWithCode", json!({}))).await;
    assert_eq!(
        next_frame(&mut rx).await,
        json!({ "id": 8, "error": { "message": "coded", "code": -32042 } })
    );
}

#[tokio::test]
async fn methods_off_the_allow_list_are_unreachable() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));

    d.handle_message(request(9, "Echo.hidden", json!({}))).await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["error"]["code"], -32601);
}

#[tokio::test]
async fn panicking_handler_answers_internal_error() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));

    d.handle_message(request(10, "Echo.panic", json!({}))).await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["id"], 10);
    assert_eq!(frame["error"]["code"], -32603);

    // The dispatcher keeps serving afterwards.
    d.handle_message(request(11, "Echo.nothing", json!({}))).await;
    assert_eq!(next_frame(&mut rx).await, json!({ "id": 11, "result": {} }));
}

#[tokio::test]
async fn repeat_registration_merges_methods() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));
    d.register_methods(
        "Echo",
        [("extra", method_fn(|_| async { Ok(json!({ "extra": 1 })) }))],
    );

    assert_eq!(
        d.registry().methods_of("Echo"),
        vec!["echo", "extra", "fail", "failWithCode", "nothing", "panic", "slow"]
    );

    d.handle_message(request(12, "Echo.extra", json!({}))).await;
    assert_eq!(next_frame(&mut rx).await["result"]["extra"], 1);
    d.handle_message(request(13, "Echo.echo", json!({ "still": "here" }))).await;
    assert_eq!(next_frame(&mut rx).await["result"]["still"], "here");
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound events
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn inbound_event_is_dispatched_without_response() {
    let (mut d, mut rx) = dispatcher();
    let echo = Arc::new(Echo::default());
    d.register("Echo", echo.clone());

    d.handle_message(Message::Event(Event::new("Echo.echo", json!({})))).await;
    d.handle_message(Message::Event(Event::new("Echo.fail", json!({})))).await;
    d.handle_message(Message::Event(Event::new("Bogus.thing", json!({})))).await;

    assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
    assert!(rx.try_recv().is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn slow_handler_does_not_block_later_requests() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));
    let d = Arc::new(d);

    let slow = d.receive(request(1, "Echo.slow", json!({})));
    let fast = d.receive(request(2, "Echo.echo", json!({})));

    assert_eq!(next_frame(&mut rx).await["id"], 2);
    assert_eq!(next_frame(&mut rx).await["id"], 1);
    slow.await.unwrap();
    fast.await.unwrap();
}

#[tokio::test]
async fn every_concurrent_request_gets_exactly_one_response() {
    let (mut d, mut rx) = dispatcher();
    d.register("Echo", Arc::new(Echo::default()));
    let d = Arc::new(d);

    let handles: Vec<_> = (1..=50)
        .map(|id| d.receive(request(id, "Echo.echo", json!({ "n": id }))))
        .collect();
    for h in handles {
        h.await.unwrap();
    }

    let mut ids = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        let frame: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(frame["id"], frame["result"]["n"]);
        ids.push(frame["id"].as_i64().unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=50).collect::<Vec<_>>());
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound requests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn id_generator_counts_down_from_minus_one() {
    let ids = IdGenerator::new();
    let issued: Vec<i64> = (0..5).map(|_| ids.next_id()).collect();
    assert_eq!(issued, vec![-1, -2, -3, -4, -5]);
}

#[tokio::test]
async fn kth_outbound_request_has_id_minus_k() {
    let (d, mut rx) = dispatcher();

    let mut pending = Vec::new();
    for k in 1..=3 {
        let p = d.send_request("Remote.call", json!({ "k": k })).unwrap();
        assert_eq!(p.id(), -k);
        let frame = next_frame(&mut rx).await;
        assert_eq!(frame["id"], -k);
        assert_eq!(frame["method"], "Remote.call");
        assert_eq!(frame["params"]["k"], k);
        pending.push(p);
    }
    assert_eq!(d.peer().pending_requests(), 3);
}

#[tokio::test]
async fn response_resolves_pending_request() {
    let (d, mut rx) = dispatcher();

    let pending = d.send_request("Remote.call", json!({})).unwrap();
    let id = next_frame(&mut rx).await["id"].as_i64().unwrap();

    d.handle_message(Message::Response(Response::success(id, json!({ "answer": 42 }))))
        .await;
    assert_eq!(pending.await.unwrap(), json!({ "answer": 42 }));
    assert_eq!(d.peer().pending_requests(), 0);
    // A response never produces outbound traffic.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn error_response_resolves_pending_request_with_error() {
    let (d, _rx) = dispatcher();

    let pending = d.send_request("Remote.call", json!({})).unwrap();
    let id = pending.id();
    d.handle_message(Message::Response(Response::error(id, ProtocolError::new("refused"))))
        .await;

    match pending.await {
        Err(DispatchError::Remote(err)) => assert_eq!(err.message, "refused"),
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(d.peer().pending_requests(), 0);
}

#[tokio::test]
async fn unmatched_response_is_ignored() {
    let (d, mut rx) = dispatcher();

    d.handle_message(Message::Response(Response::success(-99, json!({})))).await;
    d.handle_message(Message::Response(Response::success(5, json!({})))).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn peer_events_reach_the_channel() {
    let (d, mut rx) = dispatcher();
    d.peer().send_event("Runtime.executionContextCreated", json!({ "context": { "id": 1 } })).unwrap();

    assert_eq!(
        next_frame(&mut rx).await,
        json!({ "method": "Runtime.executionContextCreated", "params": { "context": { "id": 1 } } })
    );
}

#[tokio::test]
async fn closed_channel_reports_errors_and_leaves_no_pending_entry() {
    let (d, rx) = dispatcher();
    drop(rx);

    assert!(d.peer().is_closed());
    assert!(matches!(
        d.send_event("Runtime.consoleAPICalled", json!({})),
        Err(DispatchError::ChannelClosed)
    ));
    assert!(matches!(
        d.send_request("Remote.call", json!({})),
        Err(DispatchError::ChannelClosed)
    ));
    assert_eq!(d.peer().pending_requests(), 0);
}
