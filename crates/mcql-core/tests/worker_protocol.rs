//! Request/response flow between an editor-side client and the worker.

use mcql_core::protocol::{decode_request, encode_response};
use mcql_core::{
    handle_json_message, handle_message, Clock, LintClient, Linter, SystemClock, WorkerRequest,
    WorkerResponse,
};

struct FrozenClock;

impl Clock for FrozenClock {
    fn now_ms(&self) -> f64 {
        1_700_000_000_000.0
    }
}

#[test]
fn lint_request_round_trips() {
    let response = handle_message(
        &Linter::default(),
        WorkerRequest::Lint {
            request_id: "r1".to_string(),
            sql: "SELECT 1".to_string(),
        },
        &SystemClock,
    );
    match response {
        WorkerResponse::LintResult {
            request_id,
            diagnostics,
            duration_ms,
        } => {
            assert_eq!(request_id, "r1");
            assert!(diagnostics.is_empty());
            assert!(duration_ms >= 0.0);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn superseded_responses_are_ignored() {
    let linter = Linter::default();
    let mut client = LintClient::new();

    let stale = client.lint_request("SELECT * FROM Contacts LIMIT 1", &FrozenClock);
    let current = client.lint_request("SELECT TOP 1 * FROM Contacts", &FrozenClock);

    // Responses arrive in reverse order.
    let current_response = handle_message(&linter, current, &FrozenClock);
    let stale_response = handle_message(&linter, stale, &FrozenClock);

    let accepted = client.accept(current_response).expect("current response");
    let WorkerResponse::LintResult { diagnostics, .. } = accepted else {
        panic!("expected lint-result");
    };
    assert!(diagnostics.is_empty());

    assert!(client.accept(stale_response).is_none());
    assert!(client.pending().is_none());
    assert_eq!(client.accept(WorkerResponse::Ready), Some(WorkerResponse::Ready));
}

#[test]
fn json_surface_matches_wire_shape() {
    let linter = Linter::default();
    let ready = handle_json_message(&linter, r#"{"type":"init"}"#, &FrozenClock);
    assert_eq!(ready, r#"{"type":"ready"}"#);

    let json = handle_json_message(
        &linter,
        r#"{"type":"lint","requestId":"r7","sql":"SELECT * FROM Contacts LIMIT 10"}"#,
        &FrozenClock,
    );
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "lint-result");
    assert_eq!(value["requestId"], "r7");
    assert_eq!(value["duration"], 0.0);
    let diagnostic = &value["diagnostics"][0];
    assert_eq!(diagnostic["severity"], "error");
    assert_eq!(diagnostic["startIndex"], 23);
    assert_eq!(diagnostic["endIndex"], 31);
    assert!(diagnostic.get("code").is_none());
}

#[test]
fn decode_and_encode_are_symmetric_for_requests() {
    let request = decode_request(r#"{"type":"lint","requestId":"a","sql":"SELECT 1"}"#).unwrap();
    assert_eq!(
        request,
        WorkerRequest::Lint {
            request_id: "a".to_string(),
            sql: "SELECT 1".to_string(),
        }
    );
    let encoded = encode_response(&WorkerResponse::error(None, "boom")).unwrap();
    assert_eq!(encoded, r#"{"type":"error","message":"boom"}"#);
}
