//! Caller-side request correlation.

use super::Clock;
use crate::types::{WorkerRequest, WorkerResponse};

/// Issues request ids and filters out responses to superseded requests.
///
/// Only the most recent `lint` request is outstanding. A response carrying
/// any other id is stale and is dropped; there is no explicit cancel message.
#[derive(Debug, Default)]
pub struct LintClient {
    counter: u64,
    latest: Option<String>,
}

impl LintClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `lint` request for `sql`, superseding any outstanding one.
    pub fn lint_request(&mut self, sql: impl Into<String>, clock: &dyn Clock) -> WorkerRequest {
        let request_id = self.next_request_id(clock);
        self.latest = Some(request_id.clone());
        WorkerRequest::Lint {
            request_id,
            sql: sql.into(),
        }
    }

    /// `<timestamp-ms>-<counter in base 36>`.
    fn next_request_id(&mut self, clock: &dyn Clock) -> String {
        self.counter += 1;
        format!("{}-{}", clock.now_ms().max(0.0) as u64, to_base36(self.counter))
    }

    /// Id of the request still awaiting a response.
    pub fn pending(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    /// Returns the response if the caller should act on it.
    ///
    /// `ready` and uncorrelated errors always pass. A response for the
    /// pending request passes and clears it; anything else is stale.
    pub fn accept(&mut self, response: WorkerResponse) -> Option<WorkerResponse> {
        let Some(id) = response.request_id() else {
            return Some(response);
        };
        if self.latest.as_deref() != Some(id) {
            return None;
        }
        self.latest = None;
        Some(response)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| b as char).collect()
}
