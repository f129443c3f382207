//! Configuration for the SQL linter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default cap on diagnostic message length, in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 160;

/// Configuration for the SQL linter.
///
/// Controls which diagnostic codes are reported. By default, every code is
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    /// Master toggle for linting (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Diagnostic codes to suppress (e.g., ["ORDER_BY_WITHOUT_TOP"]).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rules: Vec<String>,

    /// Syntax error messages longer than this many characters are truncated
    /// with an ellipsis (default: 160).
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_rules: Vec::new(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}

impl LintConfig {
    /// Returns true if diagnostics with `code` should be reported.
    pub fn is_rule_enabled(&self, code: &str) -> bool {
        self.enabled
            && !self
                .disabled_rules
                .iter()
                .any(|r| r.eq_ignore_ascii_case(code))
    }
}
