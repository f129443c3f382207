//! Data Extension metadata supplied by the host application.
//!
//! The engine never fetches metadata itself. Callers pass whatever they have
//! cached; an empty list simply disables the metadata-aware refinements.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A Data Extension (table) known to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

/// A column of a Data Extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            customer_key: None,
            folder_id: None,
            fields: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields
            .into_iter()
            .map(|name| FieldMetadata {
                name: name.into(),
                field_type: None,
            })
            .collect();
        self
    }

    /// True when `reference` names this table, ignoring case, surrounding
    /// brackets and runs of whitespace.
    pub fn matches_reference(&self, reference: &str) -> bool {
        let reference = reference
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');
        words_equal(&self.name, reference)
    }
}

/// Finds the table `reference` refers to.
pub fn find_table<'a>(tables: &'a [TableMetadata], reference: &str) -> Option<&'a TableMetadata> {
    tables.iter().find(|t| t.matches_reference(reference))
}

fn words_equal(a: &str, b: &str) -> bool {
    let mut left = a.split_whitespace();
    let mut right = b.split_whitespace();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(y) => continue,
            _ => return false,
        }
    }
}
