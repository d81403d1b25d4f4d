//! Single-query PostgreSQL loading.
//!
//! One connection per load, closed on every exit path; the result shape
//! is determined entirely by the query text. Cell values decode by
//! attempt (i64, i32, i16, f64, f32, text, bool) and fall back to a
//! missing value for anything else, so exotic column types degrade a
//! cell rather than the whole load.

use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{Column, Connection, PgConnection, Row};

use serde_json::{Map, Number, Value};
use tracing::{error, info, warn};

use crate::config::DbConfig;
use crate::dataset::Dataset;
use crate::error::{DbError, DbResult};
use crate::storage::{self, RunContext, Stage};

/// Connect, run exactly one query, and materialize the full result set.
pub async fn try_load_query(query: &str, config: &DbConfig) -> DbResult<Dataset> {
    let port: u16 = config
        .port
        .trim()
        .parse()
        .map_err(|_| DbError::InvalidPort(config.port.clone()))?;

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name);

    info!(database = %config.name, host = %config.host, port, "attempting to connect to postgres");
    let mut conn = PgConnection::connect_with(&options)
        .await
        .map_err(|e| DbError::Connect(e.to_string()))?;
    info!("successfully connected to postgres");

    info!(query = %preview(query), "executing sql query");
    let fetched = sqlx::query(query).fetch_all(&mut conn).await;

    // The connection is released before the query result is inspected,
    // so a failed query still closes it.
    if let Err(err) = conn.close().await {
        warn!("postgres connection did not close cleanly: {err}");
    } else {
        info!("postgres connection closed");
    }

    let rows = fetched.map_err(|e| DbError::Query(e.to_string()))?;
    Ok(rows_to_dataset(&rows))
}

/// Boundary operation: load, log, and on success persist the raw stage.
pub async fn load_query(
    query: &str,
    config: &DbConfig,
    run: Option<&RunContext>,
) -> Option<Dataset> {
    match try_load_query(query, config).await {
        Ok(dataset) => {
            let (rows, columns) = dataset.shape();
            info!(rows, columns, "successfully loaded data from postgres");
            if let Some(run) = run {
                storage::persist_stage(Some(&dataset), run, Stage::Raw);
            }
            Some(dataset)
        }
        Err(err) if err.is_driver_error() => {
            error!("error connecting to or querying postgres: {err}");
            None
        }
        Err(err) => {
            error!("an unexpected error occurred during postgres loading: {err}");
            None
        }
    }
}

/// Boundary operation reading credentials from the environment.
///
/// A missing credential disables this path without attempting a
/// connection.
pub async fn load_query_from_env(query: &str, run: Option<&RunContext>) -> Option<Dataset> {
    let config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}, check your .env file");
            return None;
        }
    };
    load_query(query, &config, run).await
}

fn rows_to_dataset(rows: &[PgRow]) -> Dataset {
    let Some(first) = rows.first() else {
        return Dataset::new(Vec::new(), Vec::new());
    };

    let headers: Vec<String> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let records = rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (i, header) in headers.iter().enumerate() {
                record.insert(header.clone(), decode_cell(row, i));
            }
            record
        })
        .collect();

    Dataset::new(headers, records)
}

fn decode_cell(row: &PgRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v
            .and_then(|f| Number::from_f64(f64::from(f)))
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    Value::Null
}

fn preview(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.chars().count() <= 100 {
        trimmed.to_string()
    } else {
        let shown: String = trimmed.chars().take(100).collect();
        format!("{shown}...")
    }
}
