//! End-to-end lint behavior on complete queries.

use insta::assert_json_snapshot;
use mcql_core::{
    diagnostic_codes, lint, LintConfig, Linter, Severity, TableMetadata,
};
use rstest::rstest;

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t  \r\n")]
fn blank_input_has_no_diagnostics(#[case] sql: &str) {
    assert!(lint(sql).is_empty());
}

#[rstest]
#[case("INSERT", "INSERT INTO Contacts (Id) VALUES (1)")]
#[case("UPDATE", "UPDATE Contacts SET Name = 'x' WHERE Id = 1")]
#[case("DELETE", "DELETE FROM Contacts WHERE Id = 1")]
#[case("CREATE", "CREATE TABLE Contacts (Id INT)")]
#[case("ALTER", "ALTER TABLE Contacts ADD Age INT")]
#[case("DROP", "DROP TABLE Contacts")]
#[case("TRUNCATE", "TRUNCATE TABLE Contacts")]
#[case(
    "MERGE",
    "MERGE INTO Contacts AS t USING Staging AS s ON t.Id = s.Id WHEN MATCHED THEN DELETE"
)]
fn disallowed_statement_covers_whole_statement(#[case] keyword: &str, #[case] sql: &str) {
    let diagnostics = lint(sql);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!((diagnostic.start_index, diagnostic.end_index), (0, sql.len()));
    assert!(diagnostic.message.contains(keyword), "{}", diagnostic.message);
}

#[test]
fn limit_is_reported_at_the_keyword() {
    let sql = "SELECT * FROM Contacts LIMIT 10";
    let diagnostics = lint(sql);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].start_index, sql.find("LIMIT").unwrap());
    assert!(diagnostics[0].message.contains("LIMIT"));
    assert!(diagnostics[0].message.contains("TOP"));
    assert_json_snapshot!(diagnostics, @r###"
    [
      {
        "message": "LIMIT is not supported. Use SELECT TOP n instead, or ORDER BY ... OFFSET n ROWS FETCH NEXT m ROWS ONLY.",
        "severity": "error",
        "startIndex": 23,
        "endIndex": 31
      }
    ]
    "###);
}

#[rstest]
#[case("SELECT TOP 10 * FROM Contacts")]
#[case("SELECT Id FROM Contacts ORDER BY Id OFFSET 10 ROWS FETCH NEXT 20 ROWS ONLY")]
#[case("SELECT TOP 5 Id FROM Contacts ORDER BY Id DESC")]
#[case("SELECT c.Id, o.Total FROM [Contacts] c INNER JOIN [Orders] o ON c.Id = o.ContactId")]
#[case("SELECT Id FROM ENT.[Shared Contacts] WHERE Email IS NOT NULL")]
#[case("SELECT COUNT(*) AS Total, Region FROM Sales GROUP BY Region HAVING COUNT(*) > 1")]
#[case("SELECT * FROM (SELECT Id FROM Contacts) AS sub")]
fn supported_queries_are_clean(#[case] sql: &str) {
    assert_eq!(lint(sql), vec![]);
}

#[test]
fn cte_is_reported_from_the_start() {
    let diagnostics = lint("WITH CTE AS (SELECT 1 AS ID) SELECT * FROM CTE");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].start_index, 0);
    assert!(diagnostics[0].message.contains("Common Table Expression"));
}

#[test]
fn unbracketed_name_gets_bracket_suggestion() {
    let diagnostics = lint("SELECT * FROM My Data Extension");
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(
        diagnostics[0].message.contains("[My Data Extension]"),
        "{}",
        diagnostics[0].message
    );
}

#[test]
fn two_word_name_needs_metadata() {
    let sql = "SELECT * FROM Sales Summary )";
    let metadata = vec![TableMetadata::new("Sales Summary")];

    let without = lint(sql);
    assert_eq!(without.len(), 1);
    assert_ne!(without[0].code, diagnostic_codes::MISSING_BRACKETS);

    let with = Linter::default().with_metadata(metadata).lint(sql);
    assert_eq!(with.len(), 1);
    assert!(with[0].message.contains("[Sales Summary]"));
}

#[rstest]
#[case("SELECT STRING_AGG(Name, ',') FROM Contacts", "STRING_AGG")]
#[case("SELECT Id FROM Contacts WHERE LEN(Name) > NOW()", "NOW")]
#[case("SELECT IFNULL(Name, '') AS Name FROM Contacts", "IFNULL")]
#[case("SELECT SUBSTRING(NOW(), 1, 4) FROM Contacts", "NOW")]
#[case("SELECT TRIM(NOW()) FROM Contacts", "NOW")]
#[case("SELECT EXTRACT(YEAR FROM NOW()) FROM Contacts", "NOW")]
#[case("SELECT ROW_NUMBER() OVER (ORDER BY NOW()) AS n FROM Contacts", "NOW")]
#[case("SELECT Id FROM Contacts WHERE Id = ANY (SELECT LENGTH(Name) FROM Orders)", "LENGTH")]
fn unsupported_functions_are_named(#[case] sql: &str, #[case] name: &str) {
    let diagnostics = lint(sql);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    let start = sql.find(name).unwrap();
    assert_eq!(diagnostics[0].span().start, start);
    assert_eq!(diagnostics[0].span().end, start + name.len());
    assert!(diagnostics[0].message.contains(name));
}

#[test]
fn order_by_without_row_limit_is_a_warning() {
    let diagnostics = lint("SELECT Id FROM Contacts ORDER BY Id");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);

    let config = LintConfig {
        disabled_rules: vec!["ORDER_BY_WITHOUT_TOP".to_string()],
        ..LintConfig::default()
    };
    assert!(Linter::new(config)
        .lint("SELECT Id FROM Contacts ORDER BY Id")
        .is_empty());
}

#[test]
fn disabled_linter_reports_nothing() {
    let linter = Linter::new(LintConfig {
        enabled: false,
        ..LintConfig::default()
    });
    assert!(linter.lint("DELETE FROM Contacts").is_empty());
}

#[test]
fn syntax_errors_have_readable_messages() {
    let diagnostics = lint("SELECT Id FROM Contacts WHERE");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert!(diagnostics[0].message.starts_with("Syntax error: "));
    assert!(!diagnostics[0].message.contains("sql parser error"));
}

#[rstest]
#[case("SELECT * FROM Contacts LIMIT 10")]
#[case("SELECT * FROM My Data Extension")]
#[case("WITH x AS (SELECT 1 AS a) SELECT * FROM x ORDER BY a")]
#[case("SELECT GROUP_CONCAT(Name) FROM")]
#[case("DROP TABLE Contacts; SELECT 1")]
fn linting_is_deterministic(#[case] sql: &str) {
    let first = serde_json::to_string(&lint(sql)).unwrap();
    let second = serde_json::to_string(&lint(sql)).unwrap();
    assert_eq!(first, second);
}
