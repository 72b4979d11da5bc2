//! Pulls a candidate statement out of free-form model output.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_SQL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```sql\s*(.*?)\s*```").expect("valid fenced sql regex"));

static BARE_SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)(SELECT\s+.*?(?:;|$))").expect("valid bare select regex"));

static FENCED_SQL_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```sql\s*.*?\s*```").expect("valid sql block regex"));

static FENCED_SELECT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```\s*(SELECT\s+.*?)\s*```").expect("valid select block regex")
});

static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").expect("valid blank line regex"));

/// First fenced `sql` block wins; otherwise a bare `SELECT` up to `;` or the
/// end of the text. `None` means the reply is conversational.
pub fn extract_sql(text: &str) -> Option<String> {
    if let Some(captures) = FENCED_SQL.captures(text) {
        return captures.get(1).map(|m| m.as_str().trim().to_string());
    }

    BARE_SELECT.captures(text).and_then(|captures| {
        let statement = captures.get(1)?.as_str().trim();
        Some(statement.trim_end_matches(';').to_string())
    })
}

/// Text shown to the user once every SQL-looking fenced block is removed.
pub fn strip_sql_blocks(text: &str) -> String {
    let cleaned = FENCED_SQL_BLOCK.replace_all(text, "");
    let cleaned = FENCED_SELECT_BLOCK.replace_all(&cleaned, "");
    let cleaned = EXCESS_BLANK_LINES.replace_all(&cleaned, "\n\n");
    cleaned.trim().to_string()
}
