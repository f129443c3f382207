use std::cell::RefCell;

use mcql_core::encoding::{diagnostics_to_utf16, utf16_to_utf8_offset_clamped};
use mcql_core::protocol::{handle_json_message, Clock};
use mcql_core::{cursor_context, LintConfig, Linter, TableMetadata};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

thread_local! {
    static LINTER: RefCell<Linter> = RefCell::new(Linter::default());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Date, js_name = now)]
    fn date_now() -> f64;
}

/// `Date.now()` in the browser, the system clock elsewhere.
struct HostClock;

impl Clock for HostClock {
    fn now_ms(&self) -> f64 {
        #[cfg(target_arch = "wasm32")]
        {
            date_now()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            mcql_core::SystemClock.now_ms()
        }
    }
}

/// Settings applied to every subsequent call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    #[serde(default)]
    config: Option<LintConfig>,
    #[serde(default)]
    metadata: Option<Vec<TableMetadata>>,
}

/// Installs the panic hook and, with the `tracing` feature, the console
/// subscriber. Called once by the worker bootstrap.
#[wasm_bindgen]
pub fn initialize() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "tracing")]
    tracing_wasm::set_as_global_default();
}

/// Replaces the lint configuration and/or table metadata.
///
/// Accepts `{"config": LintConfig?, "metadata": [TableMetadata]?}`; omitted
/// keys keep their current value.
#[wasm_bindgen]
pub fn configure(settings_json: &str) -> Result<(), JsValue> {
    let settings: Settings = serde_json::from_str(settings_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid settings: {e}")))?;

    LINTER.with(|cell| {
        let mut linter = cell.borrow_mut();
        let metadata = settings
            .metadata
            .unwrap_or_else(|| linter.metadata().to_vec());
        let config = settings.config.unwrap_or_else(|| linter.config().clone());
        *linter = Linter::new(config).with_metadata(metadata);
    });
    Ok(())
}

/// Worker entry point: one JSON request in, one JSON response out.
/// This function never throws - failures come back as `error` responses.
#[wasm_bindgen]
pub fn handle_worker_message(message_json: &str) -> String {
    LINTER.with(|cell| handle_json_message(&cell.borrow(), message_json, &HostClock))
}

/// Lints `sql` on the calling thread, returning the diagnostics array as
/// JSON with UTF-16 offsets.
#[wasm_bindgen]
pub fn lint_sql_json(sql: &str) -> String {
    let mut diagnostics = LINTER.with(|cell| cell.borrow().lint(sql));
    diagnostics_to_utf16(sql, &mut diagnostics);
    serde_json::to_string(&diagnostics).unwrap_or_else(|_| "[]".to_string())
}

/// Cursor context for a UTF-16 cursor offset, as JSON.
#[wasm_bindgen]
pub fn cursor_context_json(sql: &str, cursor_offset: usize) -> String {
    let cursor = utf16_to_utf8_offset_clamped(sql, cursor_offset);
    let context = cursor_context(sql, cursor);
    serde_json::to_string(&context)
        .unwrap_or_else(|_| r#"{"error":"Failed to serialize cursor context"}"#.to_string())
}

/// Ghost text for a UTF-16 cursor offset: `{"text": ...}` or `null`.
#[wasm_bindgen]
pub fn inline_suggestion_json(sql: &str, cursor_offset: usize) -> String {
    let cursor = utf16_to_utf8_offset_clamped(sql, cursor_offset);
    let suggestion = LINTER.with(|cell| {
        mcql_core::inline_suggestion(sql, cursor, cell.borrow().metadata())
    });
    serde_json::to_string(&suggestion).unwrap_or_else(|_| "null".to_string())
}

/// Whether the character just typed should open the completion dropdown.
#[wasm_bindgen]
pub fn should_trigger(trigger: Option<String>, current_word: &str) -> bool {
    let trigger = trigger.and_then(|t| t.chars().next());
    mcql_core::should_trigger(trigger, current_word)
}

/// Get version information
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
