//! Lint worker protocol.
//!
//! The editor never lints on its UI thread. It posts [`WorkerRequest`]s to a
//! background worker (a Web Worker running the WebAssembly build, or the CLI
//! `worker` mode) and receives [`WorkerResponse`]s in whatever order they
//! complete. The worker side is [`handle_message`]; the caller side keeps a
//! [`LintClient`] to correlate responses and drop stale ones.
//!
//! Offsets in outgoing diagnostics are UTF-16 code units.

mod client;

pub use client::LintClient;

use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::encoding::diagnostics_to_utf16;
use crate::error::ProtocolError;
use crate::linter::Linter;
use crate::parser::warm_up;
use crate::types::{WorkerRequest, WorkerResponse};

/// Millisecond time source used for lint durations and request ids.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by the system time.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1000.0
    }
}

/// Handles one worker request.
///
/// `init` warms the parser and always answers `ready`, even when warm-up
/// fails. A panic while linting is reported as an `error` response carrying
/// the request id.
pub fn handle_message(linter: &Linter, request: WorkerRequest, clock: &dyn Clock) -> WorkerResponse {
    match request {
        WorkerRequest::Init => {
            if let Err(_err) = warm_up() {
                #[cfg(feature = "tracing")]
                warn!(error = %_err, "parser warm-up failed");
            }
            WorkerResponse::Ready
        }
        WorkerRequest::Lint { request_id, sql } => {
            let started = clock.now_ms();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut diagnostics = linter.lint(&sql);
                diagnostics_to_utf16(&sql, &mut diagnostics);
                diagnostics
            }));
            match outcome {
                Ok(diagnostics) => {
                    let duration_ms = (clock.now_ms() - started).max(0.0);
                    #[cfg(feature = "tracing")]
                    debug!(%request_id, count = diagnostics.len(), duration_ms, "lint handled");
                    WorkerResponse::LintResult {
                        request_id,
                        diagnostics,
                        duration_ms,
                    }
                }
                Err(payload) => {
                    WorkerResponse::error(Some(request_id), panic_message(payload.as_ref()))
                }
            }
        }
    }
}

/// Decodes a request, distinguishing unknown types and missing fields from
/// malformed JSON.
pub fn decode_request(json: &str) -> Result<WorkerRequest, ProtocolError> {
    let value: Value = serde_json::from_str(json)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingField("type"))?;

    match kind {
        "init" => Ok(WorkerRequest::Init),
        "lint" => {
            for field in ["requestId", "sql"] {
                if !value.get(field).is_some_and(Value::is_string) {
                    return Err(ProtocolError::MissingField(field));
                }
            }
            Ok(serde_json::from_value(value)?)
        }
        other => Err(ProtocolError::UnknownType(other.to_string())),
    }
}

pub fn encode_response(response: &WorkerResponse) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(response)?)
}

/// JSON-in/JSON-out form of [`handle_message`].
///
/// Undecodable input yields an `error` response with whatever `requestId`
/// could be salvaged from the message.
pub fn handle_json_message(linter: &Linter, json: &str, clock: &dyn Clock) -> String {
    let response = match decode_request(json) {
        Ok(request) => handle_message(linter, request, clock),
        Err(err) => {
            #[cfg(feature = "tracing")]
            debug!(error = %err, "rejected worker message");
            WorkerResponse::error(request_id_hint(json), err.to_string())
        }
    };

    encode_response(&response).unwrap_or_else(|err| {
        let fallback = WorkerResponse::error(response.request_id().map(str::to_string), err.to_string());
        serde_json::to_string(&fallback)
            .unwrap_or_else(|_| r#"{"type":"error","message":"failed to encode response"}"#.to_string())
    })
}

/// Best-effort `requestId` from a message that failed to decode.
pub fn request_id_hint(json: &str) -> Option<String> {
    let value: Value = serde_json::from_str(json).ok()?;
    match value.get("requestId")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("lint failed: {detail}")
}
