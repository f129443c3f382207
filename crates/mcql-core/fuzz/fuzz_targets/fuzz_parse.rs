//! Fuzz target for the parser adapter.
//!
//! `parse()` must report failures as values, and any reported location must
//! map back into the input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mcql_core::{parse, ParseOutcome};

fuzz_target!(|sql: &str| {
    if let ParseOutcome::Failure {
        location: Some(offset),
        ..
    } = parse(sql)
    {
        assert!(offset <= sql.len());
    }
});
