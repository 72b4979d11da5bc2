// Config loading tests - AppConfig::load against files on disk

use nlsql_agent::config::{AppConfig, ConfigError};
use nlsql_agent::infrastructure::schema::SchemaCatalog;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("agent.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

const MINIMAL: &str = r#"
default_provider = "local"
model = "llama3"

[[providers]]
id = "local"
type = "ollama"
endpoint = "http://127.0.0.1:11434"

[warehouse]
account_url = "https://acme.snowflakecomputing.com"
token = "SNOWFLAKE_TOKEN"
"#;

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/agent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_error_when_model_missing() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), &MINIMAL.replace("model = \"llama3\"\n", ""));
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::MissingModel)
    ));
}

#[test]
fn returns_error_when_no_providers() {
    let dir = tempdir().expect("tempdir");
    let content = r#"
default_provider = "local"
model = "llama3"

[warehouse]
account_url = "https://acme.snowflakecomputing.com"
token = "SNOWFLAKE_TOKEN"
"#;
    let path = write_config(dir.path(), content);
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::NoProvidersConfigured)
    ));
}

#[test]
fn returns_error_when_endpoint_missing() {
    let dir = tempdir().expect("tempdir");
    let content = MINIMAL.replace("endpoint = \"http://127.0.0.1:11434\"\n", "");
    let path = write_config(dir.path(), &content);
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::MissingEndpoint { provider }) if provider == "local"
    ));
}

#[test]
fn returns_error_when_warehouse_missing() {
    let dir = tempdir().expect("tempdir");
    let content = MINIMAL
        .split("[warehouse]")
        .next()
        .expect("provider section")
        .to_string();
    let path = write_config(dir.path(), &content);
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::MissingWarehouse)
    ));
}

#[test]
fn loads_sample_configuration() {
    let config = AppConfig::load(Some(Path::new("config/agent.toml"))).expect("sample config");

    assert_eq!(config.default_provider, "anthropic");
    assert_eq!(config.providers.len(), 4);
    assert_eq!(config.warehouse.max_rows, 1000);
    assert_eq!(config.warehouse.statement_timeout_secs, 30);
    assert_eq!(config.tables.len(), 1);
    assert_eq!(config.tables[0].columns.len(), 4);

    let schema = SchemaCatalog::from_config(&config).expect("schema");
    assert!(schema.docs().starts_with("### RETAIL.PUBLIC.LISTINGS\n"));
    assert!(
        schema
            .docs()
            .contains("  - SELLER (VARCHAR): Marketplace seller name (e.g., 'Walmart', 'Costco')\n")
    );
}

#[test]
fn schema_file_is_used_verbatim() {
    let dir = tempdir().expect("tempdir");
    let schema_path = dir.path().join("schema.md");
    fs::write(&schema_path, "### A.B.C\nhand written\n").expect("write schema");
    let content = format!(
        "schema_file = \"{}\"\n{MINIMAL}",
        schema_path.display().to_string().replace('\\', "/")
    );
    let path = write_config(dir.path(), &content);

    let config = AppConfig::load(Some(&path)).expect("config");
    let schema = SchemaCatalog::from_config(&config).expect("schema");
    assert_eq!(schema.docs(), "### A.B.C\nhand written\n");
}

#[test]
fn unreadable_schema_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let content = format!("schema_file = \"/nonexistent/schema.md\"\n{MINIMAL}");
    let path = write_config(dir.path(), &content);

    let config = AppConfig::load(Some(&path)).expect("config");
    assert!(matches!(
        SchemaCatalog::from_config(&config),
        Err(ConfigError::SchemaFile { .. })
    ));
}
