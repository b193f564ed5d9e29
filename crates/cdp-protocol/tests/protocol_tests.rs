//! Protocol layer tests — message shapes, errors, method splitting, runtime payloads.

use cdp_protocol::*;
use serde_json::json;

// ─────────────────────────────────────────────────────────────────────
// Message decoding
// ─────────────────────────────────────────────────────────────────────

#[test]
fn decode_request() {
    let wire = r#"{"id":1,"method":"Runtime.enable","params":{}}"#;
    let msg = Message::decode(wire).unwrap();
    match msg {
        Message::Request(req) => {
            assert_eq!(req.id, 1);
            assert_eq!(req.method, "Runtime.enable");
            assert_eq!(req.params, json!({}));
        }
        other => panic!("expected request, got {other:?}"),
    }
}

#[test]
fn decode_request_without_params() {
    let msg = Message::decode(r#"{"id":7,"method":"Profiler.enable"}"#).unwrap();
    assert_eq!(msg.id(), Some(7));
    assert_eq!(msg.method(), Some("Profiler.enable"));
    if let Message::Request(req) = msg {
        assert_eq!(req.params, json!({}));
    } else {
        panic!("expected request");
    }
}

#[test]
fn decode_event() {
    let msg = Message::decode(r#"{"method":"Runtime.enable","params":{"a":1}}"#).unwrap();
    assert!(matches!(msg, Message::Event(_)));
    assert_eq!(msg.id(), None);
}

#[test]
fn decode_success_response() {
    let msg = Message::decode(r#"{"id":-1,"result":{"ok":true}}"#).unwrap();
    match msg {
        Message::Response(resp) => {
            assert_eq!(resp.id, -1);
            assert_eq!(resp.into_result().unwrap(), json!({"ok": true}));
        }
        other => panic!("expected response, got {other:?}"),
    }
}

#[test]
fn decode_error_response() {
    let msg =
        Message::decode(r#"{"id":-3,"error":{"message":"nope","code":-32000}}"#).unwrap();
    let Message::Response(resp) = msg else {
        panic!("expected response");
    };
    assert!(resp.is_error());
    let err = resp.into_result().unwrap_err();
    assert_eq!(err.message, "nope");
    assert_eq!(err.code, Some(-32000));
}

#[test]
fn decode_rejects_unknown_shape() {
    assert!(matches!(
        Message::decode(r#"{"id":1}"#),
        Err(DecodeError::UnknownShape)
    ));
    assert!(matches!(
        Message::decode(r#"[1,2,3]"#),
        Err(DecodeError::UnknownShape)
    ));
}

#[test]
fn decode_rejects_non_integer_ids_instead_of_treating_them_as_events() {
    for wire in [
        r#"{"id":"7","method":"Runtime.enable","params":{}}"#,
        r#"{"id":1.0,"method":"A.b"}"#,
        r#"{"id":null,"method":"A.b"}"#,
    ] {
        assert!(
            matches!(Message::decode(wire), Err(DecodeError::UnknownShape)),
            "{wire}"
        );
    }

    let event = Message::decode(r#"{"method":"Runtime.consoleAPICalled","params":{}}"#).unwrap();
    assert!(matches!(event, Message::Event(_)));
}

#[test]
fn decode_rejects_invalid_json() {
    assert!(matches!(Message::decode("{not json"), Err(DecodeError::Json(_))));
}

// ─────────────────────────────────────────────────────────────────────
// Message encoding
// ─────────────────────────────────────────────────────────────────────

#[test]
fn success_response_with_null_result_is_empty_object() {
    let resp = Response::success(1, serde_json::Value::Null);
    let wire = serde_json::to_value(Message::from(resp)).unwrap();
    assert_eq!(wire, json!({"id": 1, "result": {}}));
}

#[test]
fn error_response_without_code_omits_it() {
    let resp = Response::error(2, ProtocolError::new("boom"));
    let wire = serde_json::to_value(&resp).unwrap();
    assert_eq!(wire, json!({"id": 2, "error": {"message": "boom"}}));
}

#[test]
fn error_response_with_code() {
    let resp = Response::error(3, ProtocolError::method_not_found("Bogus.thing"));
    let wire = serde_json::to_value(&resp).unwrap();
    assert_eq!(wire["id"], 3);
    assert_eq!(wire["error"]["code"], -32601);
    assert!(wire["error"]["message"].as_str().unwrap().contains("Bogus.thing"));
}

#[test]
fn event_encoding_has_no_id() {
    let frame = Message::from(Event::new("Runtime.executionContextCreated", json!({})))
        .encode()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert!(parsed.get("id").is_none());
    assert_eq!(parsed["method"], "Runtime.executionContextCreated");
}

// ─────────────────────────────────────────────────────────────────────
// Errors and method names
// ─────────────────────────────────────────────────────────────────────

#[test]
fn error_codes_round_trip_known_values() {
    for code in [
        ErrorCode::ParseError,
        ErrorCode::InvalidRequest,
        ErrorCode::MethodNotFound,
        ErrorCode::InvalidParams,
        ErrorCode::InternalError,
        ErrorCode::ServerError,
    ] {
        assert_eq!(ErrorCode::from_code(code.code()), code);
    }
    assert_eq!(ErrorCode::from_code(-1), ErrorCode::Custom(-1));
}

#[test]
fn error_display() {
    let err = ProtocolError::server_error("down");
    assert_eq!(err.to_string(), "CDP Error [-32000]: down");
    assert_eq!(ProtocolError::new("plain").to_string(), "CDP Error: plain");
    assert_eq!(err.error_code(), Some(ErrorCode::ServerError));
}

#[test]
fn split_method_on_first_dot() {
    assert_eq!(split_method("Runtime.enable"), Some(("Runtime", "enable")));
    assert_eq!(split_method("A.b.c"), Some(("A", "b.c")));
    assert_eq!(split_method("nodot"), None);
    assert_eq!(split_method(Methods::PROFILER_ENABLE), Some(("Profiler", "enable")));
}

// ─────────────────────────────────────────────────────────────────────
// Runtime payloads
// ─────────────────────────────────────────────────────────────────────

#[test]
fn console_api_type_wire_names() {
    let names: Vec<serde_json::Value> = ConsoleApiType::ALL
        .iter()
        .map(|t| serde_json::to_value(t).unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            json!("log"),
            json!("warning"),
            json!("error"),
            json!("info"),
            json!("dir"),
            json!("table"),
            json!("startGroup"),
            json!("startGroupCollapsed"),
            json!("endGroup"),
            json!("debug"),
            json!("clear"),
        ]
    );
    assert!(ConsoleApiType::Error.captures_stack());
    assert!(ConsoleApiType::Warning.captures_stack());
    assert!(!ConsoleApiType::Log.captures_stack());
}

#[test]
fn remote_object_skips_absent_members() {
    let obj = RemoteObject::of_type(RemoteObjectType::Undefined);
    assert_eq!(serde_json::to_value(&obj).unwrap(), json!({"type": "undefined"}));
}

#[test]
fn console_params_wire_shape() {
    let params = ConsoleApiCalledParams {
        kind: ConsoleApiType::StartGroupCollapsed,
        args: vec![],
        execution_context_id: 1,
        timestamp: 1.5,
        stack_trace: StackTrace {
            call_frames: vec![CallFrame {
                function_name: "main".into(),
                line_number: 3,
                column_number: 9,
                url: "file:///src/main.rs".into(),
            }],
        },
    };
    let wire = serde_json::to_value(&params).unwrap();
    assert_eq!(wire["type"], "startGroupCollapsed");
    assert_eq!(wire["executionContextId"], 1);
    assert_eq!(wire["stackTrace"]["callFrames"][0]["functionName"], "main");
    assert_eq!(wire["stackTrace"]["callFrames"][0]["lineNumber"], 3);
    assert_eq!(wire["stackTrace"]["callFrames"][0]["columnNumber"], 9);
}
