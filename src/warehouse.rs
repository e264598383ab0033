//! Warehouse gateway: executes SQL text against BigQuery over its REST API
//! and returns rows as column-ordered values.
//!
//! The gateway surfaces a single opaque `Warehouse` error kind; callers at
//! the router boundary convert it into user-facing text. No retries are
//! performed.

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use itertools::Itertools;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Result rows from a warehouse query. Column order is the per-row mapping
/// order; rows never change after creation.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// (column, value) pairs of one row, in column order.
    pub fn row_pairs(&self, row: usize) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|c| c.as_str())
            .zip(self.rows[row].iter())
    }

    /// Generic rendering: rows newline-joined, each row a comma-joined
    /// `column: value` list.
    pub fn render_rows(&self) -> String {
        (0..self.rows.len())
            .map(|i| {
                self.row_pairs(i)
                    .map(|(column, value)| format!("{}: {}", column, render_scalar(value)))
                    .join(", ")
            })
            .join("\n")
    }

    /// First row as a placeholder name → rendered value map, for response
    /// template substitution.
    pub fn first_row_values(&self) -> Option<HashMap<String, String>> {
        if self.rows.is_empty() {
            return None;
        }
        Some(
            self.row_pairs(0)
                .map(|(column, value)| (column.to_string(), render_scalar(value)))
                .collect(),
        )
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Render a scalar cell the way it appears in chat output.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResult>;
}

/// BigQuery client over the `jobs.query` REST endpoint.
pub struct BigQueryClient {
    project_id: String,
    access_token: String,
    base_url: String,
    http: reqwest::Client,
}

impl BigQueryClient {
    pub fn new(project_id: String, access_token: String) -> Self {
        Self {
            project_id,
            access_token,
            base_url: "https://bigquery.googleapis.com/bigquery/v2".to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        debug!("Executing warehouse query: {}", sql);

        let body = serde_json::json!({
            "query": sql,
            "useLegacySql": false,
        });

        let response = self
            .http
            .post(format!(
                "{}/projects/{}/queries",
                self.base_url, self.project_id
            ))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::Warehouse(format!("query request failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ReportError::Warehouse(format!("unreadable query response: {}", e)))?;

        if let Some(error) = payload.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(ReportError::Warehouse(format!(
                "query rejected: {}",
                message
            )));
        }
        if !status.is_success() {
            return Err(ReportError::Warehouse(format!(
                "query failed with HTTP {}",
                status
            )));
        }
        if payload["jobComplete"] == Value::Bool(false) {
            return Err(ReportError::Warehouse(
                "query did not complete within the request deadline".to_string(),
            ));
        }

        Ok(parse_query_response(&payload))
    }
}

fn parse_query_response(payload: &Value) -> QueryResult {
    let columns: Vec<String> = payload["schema"]["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["name"].as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let rows: Vec<Vec<Value>> = payload["rows"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row["f"]
                        .as_array()
                        .map(|cells| cells.iter().map(|cell| cell["v"].clone()).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    QueryResult::new(columns, rows)
}
