//! Fuzz target for cursor context and inline suggestions.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mcql_core::{cursor_context, inline_suggestion, TableMetadata};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    cursor: u16,
    table: String,
    fields: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    let cursor = usize::from(input.cursor);
    let metadata = vec![TableMetadata::new(input.table).with_fields(input.fields)];
    let _ = cursor_context(&input.sql, cursor);
    let _ = inline_suggestion(&input.sql, cursor, &metadata);
});
