//! Lexical read-only check applied before every execution.
//!
//! A denylist, not a parser: statement stacking and writes nested in a CTE
//! body pass as long as no listed keyword appears. Comment stripping is
//! lexical too. `--` is removed to end of line even inside a string literal,
//! and line comments go before block comments, so `'--'` or `/* -- */` can
//! swallow a later keyword on the same line.

use once_cell::sync::Lazy;
use regex::Regex;

const DENIED_KEYWORDS: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "TRUNCATE", "ALTER", "CREATE", "GRANT", "REVOKE",
    "EXECUTE",
];

static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)--.*?$").expect("valid line comment regex"));

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment regex"));

static DENIED: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:{})\b", DENIED_KEYWORDS.join("|"));
    Regex::new(&pattern).expect("valid denylist regex")
});

/// Accepts `SELECT`/`WITH` statements free of denylisted keywords once
/// comments are stripped.
pub fn is_safe_query(sql: &str) -> bool {
    let without_lines = LINE_COMMENT.replace_all(sql, "");
    let without_comments = BLOCK_COMMENT.replace_all(&without_lines, "");
    let upper = without_comments.to_uppercase();
    let statement = upper.trim();

    if !(statement.starts_with("SELECT") || statement.starts_with("WITH")) {
        return false;
    }
    !DENIED.is_match(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_drop() {
        assert!(!is_safe_query("DROP TABLE x"));
    }

    #[test]
    fn accepts_select_and_cte() {
        assert!(is_safe_query("select * from sales.public.orders limit 100"));
        assert!(is_safe_query(
            "WITH recent AS (SELECT * FROM t) SELECT count(*) FROM recent"
        ));
    }

    #[test]
    fn rejects_denied_keyword_anywhere_in_statement() {
        for keyword in DENIED_KEYWORDS {
            let sql = format!("SELECT 1; {} something", keyword.to_lowercase());
            assert!(!is_safe_query(&sql), "{keyword} should be rejected");
        }
    }

    #[test]
    fn keyword_inside_identifier_is_not_a_match() {
        assert!(is_safe_query("SELECT inserted_at, updated_by FROM audit_log"));
        assert!(is_safe_query("SELECT created FROM t"));
    }

    #[test]
    fn keywords_inside_comments_are_ignored() {
        assert!(is_safe_query("SELECT id -- then DROP the table\nFROM t"));
        assert!(is_safe_query("SELECT /* DELETE me */ id FROM t"));
    }

    #[test]
    fn comments_cannot_hide_a_non_select_start() {
        assert!(is_safe_query("-- note\nSELECT 1"));
        assert!(is_safe_query("/* header */ SELECT 1"));
        assert!(!is_safe_query("/* SELECT */ SHOW TABLES"));
    }

    #[test]
    fn stacked_statements_without_denied_keywords_pass() {
        assert!(is_safe_query("SELECT 1; SELECT 2"));
    }

    #[test]
    fn dashes_in_literals_and_block_comments_strip_the_rest_of_the_line() {
        assert!(is_safe_query("SELECT '--' AS x; DROP TABLE t"));
        assert!(is_safe_query("SELECT 1 /* a -- b */; DELETE FROM t"));
        assert!(!is_safe_query("SELECT '--' AS x;\nDROP TABLE t"));
    }
}
