//! Snowflake SQL API (v2) executor

use super::{QueryError, QueryExecutor, is_read_statement};
use crate::config::WarehouseConfig;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::types::{QueryResult, Row};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const STATEMENTS_PATH: &str = "/api/v2/statements";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct SnowflakeExecutor {
    http: Client,
    config: WarehouseConfig,
    token: Option<String>,
}

impl SnowflakeExecutor {
    pub fn from_config(config: WarehouseConfig) -> Self {
        let token = resolve_api_key("warehouse", Some(&config.token));
        Self {
            http: Client::new(),
            config,
            token,
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}{STATEMENTS_PATH}{suffix}",
            self.config.account_url.trim_end_matches('/')
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, QueryError> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| QueryError::MissingToken {
                env_var: self.config.token.clone(),
            })?;
        Ok(builder
            .bearer_auth(token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                self.config.token_type.as_str(),
            )
            .header("Accept", "application/json"))
    }

    async fn submit(&self, sql: &str) -> Result<StatementResponse, QueryError> {
        let body = StatementRequest {
            statement: sql,
            timeout: self.config.statement_timeout_secs,
            database: self.config.database.as_deref(),
            schema: self.config.schema.as_deref(),
            warehouse: self.config.warehouse.as_deref(),
            role: self.config.role.as_deref(),
        };
        let builder = self.authorize(self.http.post(self.url("")).json(&body))?;
        let mut response = read_statement(builder).await?;

        // 202: still running; poll until the warehouse finishes or cancels it
        // at its own statement timeout.
        while response.status == StatusCode::ACCEPTED {
            let handle = response
                .body
                .statement_handle
                .clone()
                .ok_or_else(|| QueryError::InvalidResponse("missing statementHandle".into()))?;
            debug!(handle = handle.as_str(), "Statement still running, polling");
            tokio::time::sleep(POLL_INTERVAL).await;
            let builder = self.authorize(self.http.get(self.url(&format!("/{handle}"))))?;
            response = read_statement(builder).await?;
        }

        Ok(response.body)
    }

    async fn fetch_partition(
        &self,
        handle: &str,
        partition: usize,
    ) -> Result<Vec<Vec<Option<String>>>, QueryError> {
        let builder = self.authorize(
            self.http
                .get(self.url(&format!("/{handle}")))
                .query(&[("partition", partition)]),
        )?;
        let response = read_statement(builder).await?;
        Ok(response.body.data.unwrap_or_default())
    }
}

#[async_trait]
impl QueryExecutor for SnowflakeExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResult, QueryError> {
        if !is_read_statement(sql) {
            warn!("Warehouse rejected non-read statement at its boundary");
            return Err(QueryError::Rejected);
        }

        info!(
            timeout_secs = self.config.statement_timeout_secs,
            max_rows = self.config.max_rows,
            "Executing statement on warehouse"
        );
        let response = self.submit(sql).await?;
        let meta = response
            .result_set_meta_data
            .ok_or_else(|| QueryError::InvalidResponse("missing resultSetMetaData".into()))?;

        let mut raw_rows = response.data.unwrap_or_default();
        if let Some(handle) = response.statement_handle.as_deref() {
            for partition in 1..meta.partition_info.len() {
                if raw_rows.len() >= self.config.max_rows {
                    break;
                }
                raw_rows.extend(self.fetch_partition(handle, partition).await?);
            }
        }
        raw_rows.truncate(self.config.max_rows);

        let rows: QueryResult = raw_rows
            .into_iter()
            .map(|cells| build_row(&meta.row_type, cells))
            .collect();
        info!(rows = rows.len(), "Warehouse statement completed");
        Ok(rows)
    }
}

struct StatementReply {
    status: StatusCode,
    body: StatementResponse,
}

async fn read_statement(builder: RequestBuilder) -> Result<StatementReply, QueryError> {
    let response = builder.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if status == StatusCode::OK || status == StatusCode::ACCEPTED {
        let body = serde_json::from_str(&text)
            .map_err(|e| QueryError::InvalidResponse(e.to_string()))?;
        return Ok(StatementReply { status, body });
    }

    let message = serde_json::from_str::<StatementResponse>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("warehouse returned status {}: {text}", status.as_u16()));
    Err(QueryError::backend(message))
}

fn build_row(columns: &[ColumnType], cells: Vec<Option<String>>) -> Row {
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| {
            let value = cell.map(|raw| convert_cell(column, raw)).unwrap_or(Value::Null);
            (column.name.clone(), value)
        })
        .collect()
}

/// The SQL API encodes every cell as a string; restore JSON scalars by
/// column type.
fn convert_cell(column: &ColumnType, raw: String) -> Value {
    match column.kind.to_ascii_lowercase().as_str() {
        "fixed" if column.scale.unwrap_or(0) == 0 => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(raw)),
        "fixed" | "real" => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(raw)),
        "boolean" => match raw.as_str() {
            "true" | "TRUE" | "1" => Value::Bool(true),
            "false" | "FALSE" | "0" => Value::Bool(false),
            _ => Value::String(raw),
        },
        "date" => raw
            .parse::<i64>()
            .ok()
            .and_then(epoch_days_to_date)
            .map(|date| Value::String(date.to_string()))
            .unwrap_or(Value::String(raw)),
        "timestamp_ntz" | "timestamp_ltz" | "timestamp_tz" => epoch_to_iso(&raw)
            .map(Value::String)
            .unwrap_or(Value::String(raw)),
        _ => Value::String(raw),
    }
}

fn epoch_days_to_date(days: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(TimeDelta::try_days(days)?)
}

/// `"1700000000.123000000"` (optionally followed by a timezone offset) to an
/// ISO-8601 timestamp without offset.
fn epoch_to_iso(raw: &str) -> Option<String> {
    let epoch = raw.split_whitespace().next()?;
    let (secs, nanos) = match epoch.split_once('.') {
        Some((secs, frac)) => {
            let frac = format!("{frac:0<9}");
            (secs.parse::<i64>().ok()?, frac.get(..9)?.parse::<u32>().ok()?)
        }
        None => (epoch.parse::<i64>().ok()?, 0),
    };
    let stamp = DateTime::from_timestamp(secs, nanos)?;
    Some(stamp.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    result_set_meta_data: Option<ResultSetMeta>,
    data: Option<Vec<Vec<Option<String>>>>,
    statement_handle: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMeta {
    #[serde(default)]
    row_type: Vec<ColumnType>,
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ColumnType {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    scale: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(name: &str, kind: &str, scale: Option<i64>) -> ColumnType {
        ColumnType {
            name: name.into(),
            kind: kind.into(),
            scale,
        }
    }

    #[test]
    fn builds_rows_in_column_order_with_typed_cells() {
        let columns = vec![
            column("SELLER", "text", None),
            column("LISTINGS", "fixed", Some(0)),
            column("AVG_PRICE", "fixed", Some(2)),
            column("ON_SALE", "boolean", None),
            column("RATING", "real", None),
        ];
        let row = build_row(
            &columns,
            vec![
                Some("Walmart".into()),
                Some("42".into()),
                Some("129.50".into()),
                Some("true".into()),
                None,
            ],
        );

        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["SELLER", "LISTINGS", "AVG_PRICE", "ON_SALE", "RATING"]);
        assert_eq!(row["LISTINGS"], json!(42));
        assert_eq!(row["AVG_PRICE"], json!(129.5));
        assert_eq!(row["ON_SALE"], json!(true));
        assert_eq!(row["RATING"], Value::Null);
    }

    #[test]
    fn dates_and_timestamps_render_as_iso_text() {
        let date = convert_cell(&column("D", "date", None), "19723".into());
        assert_eq!(date, json!("2024-01-01"));

        let ts = convert_cell(&column("T", "timestamp_ntz", None), "1704067200.500000000".into());
        assert_eq!(ts, json!("2024-01-01T00:00:00.500"));
    }

    #[test]
    fn unparseable_cells_fall_back_to_text() {
        let value = convert_cell(&column("N", "fixed", Some(0)), "n/a".into());
        assert_eq!(value, json!("n/a"));
    }

    #[tokio::test]
    async fn rejects_writes_before_any_network_call() {
        let executor = SnowflakeExecutor::from_config(WarehouseConfig {
            account_url: "http://127.0.0.1:9".into(),
            token: "NLSQL_TEST_UNSET_TOKEN".into(),
            token_type: "OAUTH".into(),
            database: None,
            schema: None,
            warehouse: None,
            role: None,
            max_rows: 10,
            statement_timeout_secs: 5,
        });

        let result = executor.execute("DROP TABLE orders").await;
        assert!(matches!(result, Err(QueryError::Rejected)));
    }
}
