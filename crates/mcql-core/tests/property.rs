use mcql_core::{
    cursor_context, extract_targets, inline_suggestion, lint, scan, split_statements,
    TableMetadata,
};
use proptest::prelude::*;

fn sql_fragment() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("SELECT ".to_string()),
            Just("FROM ".to_string()),
            Just("JOIN ".to_string()),
            Just("WHERE ".to_string()),
            Just("LIMIT 5 ".to_string()),
            Just("WITH x AS (".to_string()),
            Just("ENT.".to_string()),
            Just("[My Table] ".to_string()),
            Just("'it''s' ".to_string()),
            Just("-- note\n".to_string()),
            Just("/* c */".to_string()),
            Just("(".to_string()),
            Just(")".to_string()),
            Just(", ".to_string()),
            Just("; ".to_string()),
            Just("NOW() ".to_string()),
            Just("日本 ".to_string()),
            "[a-zA-Z_]{1,8} ",
        ],
        0..16,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn lint_spans_are_valid(sql in sql_fragment()) {
        for diagnostic in lint(&sql) {
            prop_assert!(diagnostic.start_index < diagnostic.end_index, "{diagnostic:?}");
            prop_assert!(diagnostic.end_index <= sql.len());
            prop_assert!(sql.is_char_boundary(diagnostic.start_index));
            prop_assert!(sql.is_char_boundary(diagnostic.end_index));
        }
    }

    #[test]
    fn lint_never_panics_on_arbitrary_text(sql in "\\PC{0,80}") {
        let _ = lint(&sql);
    }

    #[test]
    fn scanner_tokens_stay_in_bounds(sql in "\\PC{0,80}") {
        let mut previous_end = 0;
        for token in scan(&sql) {
            prop_assert!(token.start >= previous_end);
            prop_assert!(token.start < token.end);
            prop_assert!(token.end <= sql.len());
            previous_end = token.end;
        }
        for range in split_statements(&sql) {
            prop_assert!(range.end <= sql.len());
        }
        for target in extract_targets(&sql) {
            prop_assert!(target.span().end <= sql.len());
        }
    }

    #[test]
    fn cursor_functions_accept_any_offset(sql in sql_fragment(), cursor in 0usize..200) {
        let metadata = vec![TableMetadata::new("My Table").with_fields(["Id", "Email"])];
        let context = cursor_context(&sql, cursor);
        prop_assert!(context.current_word.len() <= sql.len());
        let _ = inline_suggestion(&sql, cursor, &metadata);
    }

    #[test]
    fn lint_is_deterministic(sql in sql_fragment()) {
        prop_assert_eq!(lint(&sql), lint(&sql));
    }
}
