//! Schema documentation embedded into the system prompt.

use crate::config::{AppConfig, ColumnConfig, ConfigError, TableConfig};
use std::fmt::Write;
use std::fs;
use tracing::info;

/// Static, rendered description of the queryable tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalog {
    docs: String,
}

impl SchemaCatalog {
    /// A verbatim `schema_file` wins over inline `[[tables]]`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        if let Some(path) = &config.schema_file {
            let docs = fs::read_to_string(path).map_err(|source| ConfigError::SchemaFile {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "Loaded schema documentation file");
            return Ok(Self { docs });
        }
        info!(tables = config.tables.len(), "Rendering schema documentation");
        Ok(Self::from_tables(&config.tables))
    }

    pub fn from_tables(tables: &[TableConfig]) -> Self {
        let mut docs = String::new();
        for table in tables {
            render_table(&mut docs, table);
        }
        Self { docs }
    }

    pub fn docs(&self) -> &str {
        &self.docs
    }
}

fn render_table(out: &mut String, table: &TableConfig) {
    let _ = writeln!(out, "### {}", table.name);
    let _ = writeln!(out, "{}", table.description);
    out.push('\n');
    out.push_str("Columns:\n");
    for column in &table.columns {
        render_column(out, column);
    }
    if let Some(notes) = &table.notes {
        let _ = writeln!(out, "\nNotes: {notes}");
    }
    out.push('\n');
}

fn render_column(out: &mut String, column: &ColumnConfig) {
    let _ = write!(
        out,
        "  - {} ({}): {}",
        column.name, column.data_type, column.description
    );
    if let Some(examples) = &column.examples {
        let _ = write!(out, " (e.g., {examples})");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> TableConfig {
        TableConfig {
            name: "RETAIL.PUBLIC.LISTINGS".into(),
            description: "One row per product listing.".into(),
            columns: vec![
                ColumnConfig {
                    name: "TITLE".into(),
                    data_type: "VARCHAR".into(),
                    description: "Listing title".into(),
                    examples: Some("'iPhone 15 Pro', 'Galaxy S24'".into()),
                },
                ColumnConfig {
                    name: "PRICE".into(),
                    data_type: "NUMBER(10,2)".into(),
                    description: "Current price in USD".into(),
                    examples: None,
                },
            ],
            notes: Some("Prices exclude shipping.".into()),
        }
    }

    #[test]
    fn renders_tables_in_documentation_format() {
        let catalog = SchemaCatalog::from_tables(&[listings()]);
        let expected = "### RETAIL.PUBLIC.LISTINGS\n\
One row per product listing.\n\
\n\
Columns:\n  - TITLE (VARCHAR): Listing title (e.g., 'iPhone 15 Pro', 'Galaxy S24')\n  - PRICE (NUMBER(10,2)): Current price in USD\n\
\n\
Notes: Prices exclude shipping.\n\n";
        assert_eq!(catalog.docs(), expected);
    }

    #[test]
    fn empty_table_list_renders_nothing() {
        assert_eq!(SchemaCatalog::from_tables(&[]).docs(), "");
    }
}
