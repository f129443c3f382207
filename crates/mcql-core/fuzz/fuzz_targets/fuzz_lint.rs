//! Fuzz target for the linter.
//!
//! `lint()` must return well-formed spans for any input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mcql_core::lint;

fuzz_target!(|sql: &str| {
    for diagnostic in lint(sql) {
        assert!(diagnostic.start_index < diagnostic.end_index);
        assert!(diagnostic.end_index <= sql.len());
    }
});
