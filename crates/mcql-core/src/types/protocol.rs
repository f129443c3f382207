//! Message envelope for the off-thread lint worker.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Diagnostic;

/// Message sent from the editor to the lint worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerRequest {
    /// Pre-warm the parser. Always answered with `ready`.
    Init,
    /// Lint `sql`; the response echoes `request_id`.
    Lint {
        #[serde(rename = "requestId")]
        request_id: String,
        sql: String,
    },
}

/// Message sent from the lint worker back to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerResponse {
    Ready,
    LintResult {
        #[serde(rename = "requestId")]
        request_id: String,
        /// Offsets are UTF-16 code units into the submitted SQL.
        diagnostics: Vec<Diagnostic>,
        /// Wall-clock lint time in milliseconds.
        #[serde(rename = "duration")]
        duration_ms: f64,
    },
    Error {
        #[serde(
            rename = "requestId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        request_id: Option<String>,
        message: String,
    },
}

impl WorkerResponse {
    /// Correlation id carried by the response, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Ready => None,
            Self::LintResult { request_id, .. } => Some(request_id),
            Self::Error { request_id, .. } => request_id.as_deref(),
        }
    }

    pub fn error(request_id: Option<String>, message: impl Into<String>) -> Self {
        Self::Error {
            request_id,
            message: message.into(),
        }
    }
}
