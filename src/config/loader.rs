use super::CONFIG_PATH;
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawProviderConfig, RetryConfig};
use super::schema::TableConfig;
use super::server::RestServerConfig;
use super::warehouse::{
    DEFAULT_MAX_ROWS, DEFAULT_STATEMENT_TIMEOUT_SECS, RawWarehouseConfig, WarehouseConfig,
};
use crate::constants::{DEFAULT_DOMAIN, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub model: Option<String>,
    pub default_provider: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub providers: Vec<RawProviderConfig>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    pub warehouse: Option<RawWarehouseConfig>,
    #[serde(default)]
    pub rest_server: Option<RestServerConfig>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    pub schema_file: Option<String>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Expand `${VAR}` and `~` references, leaving the input untouched when a
/// variable is unset.
pub(crate) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<super::AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    read_config(config_path)
}

fn read_config(path: &Path) -> Result<super::AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<super::AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<super::AppConfig, ConfigError> {
    let model = parsed.model.ok_or(ConfigError::MissingModel)?;
    let default_provider = parsed
        .default_provider
        .ok_or(ConfigError::MissingDefaultProvider)?;

    if parsed.providers.is_empty() {
        return Err(ConfigError::NoProvidersConfigured);
    }

    let mut providers: Vec<ModelProviderConfig> = Vec::new();
    for raw_provider in parsed.providers {
        if raw_provider.endpoint.is_none() {
            return Err(ConfigError::MissingEndpoint {
                provider: raw_provider.id.clone(),
            });
        }
        providers.push(ModelProviderConfig::from(raw_provider));
    }
    if !providers.iter().any(|p| p.id == default_provider) {
        return Err(ConfigError::ProviderNotFound {
            provider: default_provider,
        });
    }
    if let Some(provider) = providers.iter_mut().find(|p| p.id == default_provider) {
        provider.ensure_model(&model);
    }

    let warehouse = build_warehouse(parsed.warehouse.ok_or(ConfigError::MissingWarehouse)?)?;

    Ok(super::AppConfig {
        default_provider,
        model,
        domain: parsed.domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        providers,
        retry: parsed.retry.unwrap_or_default(),
        warehouse,
        rest_server: parsed.rest_server.unwrap_or_default(),
        tables: parsed.tables,
        schema_file: parsed.schema_file.map(|p| PathBuf::from(expand(&p))),
    })
}

fn build_warehouse(raw: RawWarehouseConfig) -> Result<WarehouseConfig, ConfigError> {
    let account_url = raw
        .account_url
        .ok_or(ConfigError::MissingWarehouseField {
            field: "account_url",
        })?;
    let token = raw
        .token
        .ok_or(ConfigError::MissingWarehouseField { field: "token" })?;

    Ok(WarehouseConfig {
        account_url: expand(&account_url),
        token,
        token_type: raw.token_type.unwrap_or_else(|| "KEYPAIR_JWT".to_string()),
        database: raw.database,
        schema: raw.schema,
        warehouse: raw.warehouse,
        role: raw.role,
        max_rows: raw.max_rows.unwrap_or(DEFAULT_MAX_ROWS),
        statement_timeout_secs: raw
            .statement_timeout_secs
            .unwrap_or(DEFAULT_STATEMENT_TIMEOUT_SECS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
default_provider = "anthropic"
model = "claude-sonnet-4-5"

[[providers]]
id = "anthropic"
type = "anthropic"
endpoint = "https://api.anthropic.com"
api_key = "ANTHROPIC_API_KEY"

[warehouse]
account_url = "https://acme.snowflakecomputing.com"
token = "SNOWFLAKE_TOKEN"
"#;

    fn parse(content: &str) -> Result<super::super::AppConfig, ConfigError> {
        parse_config(content, Path::new("<test>"))
    }

    #[test]
    fn applies_defaults_to_optional_sections() {
        let config = parse(BASE).expect("valid config");

        assert_eq!(config.domain, DEFAULT_DOMAIN);
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.rest_server, RestServerConfig::default());
        assert_eq!(config.warehouse.token_type, "KEYPAIR_JWT");
        assert_eq!(config.warehouse.max_rows, DEFAULT_MAX_ROWS);
        assert_eq!(
            config.warehouse.statement_timeout_secs,
            DEFAULT_STATEMENT_TIMEOUT_SECS
        );
        assert!(config.tables.is_empty());
        assert_eq!(config.schema_file, None);
    }

    #[test]
    fn registers_selected_model_on_default_provider() {
        let config = parse(BASE).expect("valid config");
        let provider = config.selected_provider().expect("default provider");
        assert!(provider.supports("claude-sonnet-4-5"));
        assert_eq!(provider.max_tokens, 2048);
    }

    #[test]
    fn rejects_missing_warehouse_token() {
        let content = BASE.replace("token = \"SNOWFLAKE_TOKEN\"\n", "");
        assert!(matches!(
            parse(&content),
            Err(ConfigError::MissingWarehouseField { field: "token" })
        ));
    }

    #[test]
    fn rejects_unknown_default_provider() {
        let content = BASE.replace(
            "default_provider = \"anthropic\"",
            "default_provider = \"openai\"",
        );
        assert!(matches!(
            parse(&content),
            Err(ConfigError::ProviderNotFound { provider }) if provider == "openai"
        ));
    }

    #[test]
    fn reports_toml_errors_with_path() {
        let err = parse("model = ").expect_err("invalid toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("<test>"));
    }
}
