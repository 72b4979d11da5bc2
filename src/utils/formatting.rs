//! Plain-text rendering of results for terminals and logs.

use crate::types::Row;
use serde_json::Value;

const MAX_CELL_CHARS: usize = 50;
pub const DEFAULT_TABLE_ROWS: usize = 20;
pub const DEFAULT_DISPLAY_CHARS: usize = 5000;

/// Pipe-separated table of the first `max_rows` rows, columns taken from the
/// first row.
pub fn format_results_as_table(rows: &[Row], max_rows: usize) -> String {
    let Some(first) = rows.first() else {
        return "No results".to_string();
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let shown = &rows[..rows.len().min(max_rows)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|header| truncate_cell(&cell_text(row.get(*header))))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 3);
    lines.push(
        headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| pad(header, *width))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| pad(cell, *width))
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }
    if rows.len() > max_rows {
        lines.push(format!("... and {} more rows", rows.len() - max_rows));
    }
    lines.join("\n")
}

/// Pretty JSON, cut at `max_chars`.
pub fn truncate_for_display(value: &Value, max_chars: usize) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if text.chars().count() <= max_chars {
        return text;
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}\n... (truncated)")
}

/// Single-line preview for log fields.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let head: String = flat.chars().take(max_chars).collect();
    format!("{head}...")
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn truncate_cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }
    text.chars().take(MAX_CELL_CHARS).collect()
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn row(seller: &str, listings: i64) -> Row {
        let mut row = Map::new();
        row.insert("SELLER".into(), json!(seller));
        row.insert("LISTINGS".into(), json!(listings));
        row
    }

    #[test]
    fn renders_aligned_table() {
        let rows = vec![row("Walmart", 42), row("Costco", 7)];
        let table = format_results_as_table(&rows, DEFAULT_TABLE_ROWS);
        assert_eq!(
            table,
            "SELLER  | LISTINGS\n--------+---------\nWalmart | 42      \nCostco  | 7       "
        );
    }

    #[test]
    fn notes_rows_beyond_the_limit() {
        let rows: Vec<Row> = (0..5).map(|i| row("s", i)).collect();
        let table = format_results_as_table(&rows, 2);
        assert_eq!(table.lines().count(), 5);
        assert!(table.ends_with("... and 3 more rows"));
    }

    #[test]
    fn empty_results_say_so() {
        assert_eq!(format_results_as_table(&[], 20), "No results");
    }

    #[test]
    fn long_cells_are_cut() {
        let long = "x".repeat(80);
        let table = format_results_as_table(&[row(&long, 1)], 20);
        assert!(table.lines().nth(2).is_some_and(|line| line.starts_with(&"x".repeat(50))));
        assert!(!table.contains(&"x".repeat(51)));
    }

    #[test]
    fn truncates_large_json() {
        let value = json!({"rows": (0..500).collect::<Vec<_>>()});
        let shown = truncate_for_display(&value, 100);
        assert!(shown.ends_with("\n... (truncated)"));
        assert_eq!(truncate_for_display(&json!({"a": 1}), 100), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn preview_flattens_and_shortens() {
        assert_eq!(preview("a\nb", 10), "a b");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
