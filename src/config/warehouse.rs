use serde::Deserialize;

pub const DEFAULT_MAX_ROWS: usize = 1000;
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Snowflake SQL API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// e.g. `https://myorg-myaccount.snowflakecomputing.com`
    pub account_url: String,
    /// Name of the environment variable holding the bearer token
    pub token: String,
    /// `KEYPAIR_JWT`, `OAUTH` or `PROGRAMMATIC_ACCESS_TOKEN`
    pub token_type: String,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub warehouse: Option<String>,
    pub role: Option<String>,
    pub max_rows: usize,
    pub statement_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct RawWarehouseConfig {
    pub(super) account_url: Option<String>,
    pub(super) token: Option<String>,
    #[serde(default)]
    pub(super) token_type: Option<String>,
    pub(super) database: Option<String>,
    pub(super) schema: Option<String>,
    pub(super) warehouse: Option<String>,
    pub(super) role: Option<String>,
    pub(super) max_rows: Option<usize>,
    pub(super) statement_timeout_secs: Option<u64>,
}
