//! Linting and inline autocomplete engine for the T-SQL subset accepted by
//! Marketing Cloud query activities.
//!
//! The engine is a set of pure functions over the query text. Editors call
//! [`lint`] (usually through the [`protocol`] worker) for diagnostics and the
//! [`completion`] functions for cursor context and ghost-text suggestions.
//! Offsets are UTF-8 byte offsets throughout; [`encoding`] converts to UTF-16
//! at the wire boundary.

pub mod completion;
pub mod encoding;
pub mod error;
pub mod linter;
pub mod metadata;
pub mod parser;
pub mod protocol;
pub mod scanner;
pub mod targets;
pub mod types;

// Re-export main types and functions
pub use completion::{cursor_context, inline_suggestion, should_trigger};
pub use error::{ParseError, ProtocolError};
pub use linter::config::LintConfig;
pub use linter::{lint, Linter};
pub use metadata::{FieldMetadata, TableMetadata};
pub use parser::{parse, ParseOutcome};
pub use protocol::{handle_json_message, handle_message, Clock, LintClient};
pub use scanner::{scan, split_statements};
pub use targets::{extract_targets, FromJoinTarget};

pub use types::{
    diagnostic_codes, CursorContext, Diagnostic, InlineSuggestion, Severity, Span, TableInScope,
    WorkerRequest, WorkerResponse,
};

#[cfg(not(target_arch = "wasm32"))]
pub use protocol::SystemClock;
