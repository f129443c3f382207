//! Serializable data model shared by the engine and its callers.
//!
//! Field names follow the camelCase wire shape consumed by the editor host.

mod common;
mod completion;
mod protocol;

pub use common::{diagnostic_codes, Diagnostic, Severity, Span};
pub use completion::{CursorContext, InlineSuggestion, TableInScope};
pub use protocol::{WorkerRequest, WorkerResponse};
