//! Cleaning transformation for the churn dataset.
//!
//! Steps run in a fixed order. Only the charges-column step is fatal:
//! a missing charges column aborts the whole transformation, while a
//! missing indicator or identifier column is logged and skipped. On
//! success the result is persisted twice, tagged `staging` and `final`
//! with identical content (no further transformation separates the two
//! stages in this pipeline).

use serde_json::{Number, Value};
use tracing::{debug, error, info, warn};

use crate::config::CleanColumns;
use crate::dataset::{display_cell, Dataset};
use crate::error::{CleanError, CleanResult};
use crate::storage::{self, RunContext, Stage};

/// Boundary operation: clean with the default churn schema columns.
pub fn clean(input: Option<Dataset>, run: Option<&RunContext>) -> Option<Dataset> {
    clean_with_columns(input, &CleanColumns::default(), run)
}

/// Boundary operation with explicit column names.
///
/// Returns the cleaned dataset, or absence when the input was absent
/// or the charges step aborted. Staging and final artifacts are only
/// written for a successful transformation.
pub fn clean_with_columns(
    input: Option<Dataset>,
    columns: &CleanColumns,
    run: Option<&RunContext>,
) -> Option<Dataset> {
    let Some(dataset) = input else {
        warn!("input dataset is absent, cannot perform cleaning");
        return None;
    };

    info!("starting data cleaning and transformation process");
    let cleaned = match try_clean(dataset, columns) {
        Ok(cleaned) => cleaned,
        Err(err) => {
            error!("cleaning aborted: {err}");
            return None;
        }
    };

    if let Some(run) = run {
        storage::persist_stage(Some(&cleaned), run, Stage::Staging);
        storage::persist_stage(Some(&cleaned), run, Stage::Final);
    }

    info!("data cleaning and transformation process completed");
    Some(cleaned)
}

/// Apply the ordered cleaning steps.
///
/// Fails only when the charges column is missing (or unprocessable);
/// the indicator and identifier steps log and continue.
pub fn try_clean(mut dataset: Dataset, columns: &CleanColumns) -> CleanResult<Dataset> {
    normalize_charges(&mut dataset, &columns.charges)?;
    encode_indicator(&mut dataset, &columns.indicator);
    drop_identifier(&mut dataset, &columns.identifier);
    log_summary(&dataset);
    Ok(dataset)
}

/// Coerce the charges column to numeric and fill missing values with 0.
///
/// Non-numeric text counts as missing, not as an error. A missing
/// column is fatal for the whole transformation.
fn normalize_charges(dataset: &mut Dataset, column: &str) -> CleanResult<()> {
    info!(column, "processing charges column");
    if !dataset.has_column(column) {
        return Err(CleanError::MissingColumn(column.to_string()));
    }

    for record in &mut dataset.records {
        let Some(cell) = record.get_mut(column) else {
            continue;
        };
        let coerced = match cell {
            Value::Number(_) | Value::Null => continue,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Value::Bool(b) => Value::from(u8::from(*b)),
            _ => Value::Null,
        };
        *cell = coerced;
    }

    let missing = dataset.null_count(column);
    info!(column, missing, "converted charges to numeric (missing includes coerced values)");

    if missing > 0 {
        let zero = Value::Number(Number::from_f64(0.0).unwrap_or_else(|| Number::from(0)));
        for record in &mut dataset.records {
            if matches!(record.get(column), None | Some(Value::Null)) {
                record.insert(column.to_string(), zero.clone());
            }
        }
        info!(column, filled = missing, "filled missing charges values with 0");
    }

    if let Some(summary) = dataset.numeric_summary(column) {
        debug!(
            column,
            count = summary.count,
            mean = summary.mean,
            min = summary.min,
            max = summary.max,
            "charges statistics after cleaning"
        );
    }

    Ok(())
}

/// Encode the churn indicator: `"Yes"` becomes 1, `"No"` becomes 0.
///
/// A missing column or leftover non-binary values are logged but never
/// stop the transformation.
fn encode_indicator(dataset: &mut Dataset, column: &str) {
    info!(column, "encoding churn indicator (Yes=1, No=0)");
    if !dataset.has_column(column) {
        error!(column, "indicator column not found, skipping encoding");
        return;
    }

    let before = dataset.distinct_values(column);
    for record in &mut dataset.records {
        let Some(cell) = record.get_mut(column) else {
            continue;
        };
        if let Value::String(s) = cell {
            match s.trim() {
                "Yes" => *cell = Value::from(1),
                "No" => *cell = Value::from(0),
                _ => {}
            }
        }
    }
    let after = dataset.distinct_values(column);
    info!(?before, ?after, "indicator values before and after encoding");

    let unexpected: Vec<String> = dataset
        .records
        .iter()
        .filter_map(|r| r.get(column))
        .filter(|v| !is_binary(v))
        .map(display_cell)
        .fold(Vec::new(), |mut acc, v| {
            if !acc.contains(&v) {
                acc.push(v);
            }
            acc
        });

    if unexpected.is_empty() {
        info!(column, "indicator column successfully encoded to 0/1");
    } else {
        warn!(column, ?unexpected, "indicator column contains unexpected values after encoding");
    }
}

/// Drop the identifier column when present.
fn drop_identifier(dataset: &mut Dataset, column: &str) {
    info!(column, "checking for identifier column to drop");
    if dataset.drop_column(column) {
        info!(column, "dropped identifier column");
    } else {
        warn!(column, "identifier column not found, skipped dropping");
    }
}

/// Diagnostic state after cleaning; no effect on the returned data.
fn log_summary(dataset: &Dataset) {
    let (rows, columns) = dataset.shape();
    info!(rows, columns, "dataset state after cleaning");
    for (column, missing) in dataset.null_counts() {
        info!(column = %column, missing, "missing values after cleaning");
    }
    debug!("first rows after cleaning:\n{}", dataset.head(5));
}

fn is_binary(value: &Value) -> bool {
    matches!(value.as_i64(), Some(0) | Some(1))
        || matches!(value.as_f64(), Some(f) if f == 0.0 || f == 1.0)
}
