//! Query-execution collaborator.
//!
//! The agent only sees [`QueryExecutor`]; the warehouse owns its own
//! statement timeout and row cap.

mod snowflake;

pub use snowflake::SnowflakeExecutor;

use crate::types::QueryResult;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Only SELECT queries are allowed")]
    Rejected,
    #[error("warehouse token environment variable '{env_var}' is not set")]
    MissingToken { env_var: String },
    #[error("network error reaching warehouse: {0}")]
    Network(#[from] reqwest::Error),
    /// Raw backend error text, forwarded verbatim.
    #[error("{message}")]
    Backend { message: String },
    #[error("warehouse returned invalid response: {0}")]
    InvalidResponse(String),
}

impl QueryError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Executes one read-only statement and returns its rows.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResult, QueryError>;
}

/// Boundary check every executor applies on its own, independent of the
/// agent's validator.
pub fn is_read_statement(sql: &str) -> bool {
    let upper = sql.trim_start().to_uppercase();
    upper.starts_with("SELECT") || upper.starts_with("WITH")
}
