use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A table reference visible at the cursor, with its alias when one is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableInScope {
    pub name: String,
    pub alias: Option<String>,
}

/// Semantic context at a cursor position, computed fresh per keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CursorContext {
    /// Last SQL keyword before the word under the cursor, lowercased.
    pub last_keyword: Option<String>,
    /// Partial word immediately before the cursor.
    pub current_word: String,
    pub tables_in_scope: Vec<TableInScope>,
    /// Table alias typed before a `.` that precedes the current word.
    pub alias_before_dot: Option<String>,
    pub is_after_from_join: bool,
}

/// Ghost text to append at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InlineSuggestion {
    pub text: String,
}

impl InlineSuggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
