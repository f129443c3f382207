//! JSON schema of the types that cross the worker and configuration boundary.

use mcql_core::{CursorContext, LintConfig, TableMetadata, WorkerRequest, WorkerResponse};
use schemars::generate::SchemaSettings;
use serde_json::{json, Value};

/// Draft-07 schemas keyed by type name.
pub fn api_schema() -> Value {
    let generator = SchemaSettings::draft07().into_generator();
    json!({
        "WorkerRequest": generator.clone().into_root_schema_for::<WorkerRequest>(),
        "WorkerResponse": generator.clone().into_root_schema_for::<WorkerResponse>(),
        "LintConfig": generator.clone().into_root_schema_for::<LintConfig>(),
        "TableMetadata": generator.clone().into_root_schema_for::<Vec<TableMetadata>>(),
        "CursorContext": generator.into_root_schema_for::<CursorContext>(),
    })
}

pub fn format_schema(compact: bool) -> String {
    let schema = api_schema();
    if compact {
        serde_json::to_string(&schema).unwrap_or_default()
    } else {
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}
