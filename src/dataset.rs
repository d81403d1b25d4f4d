//! In-memory tabular dataset flowing between pipeline stages.
//!
//! A [`Dataset`] is an ordered header list plus one JSON object per row,
//! keyed by header. Cell scalars are `serde_json::Value`: `Null` marks a
//! missing value, numbers and strings carry data. The structure is owned
//! by whichever stage currently holds it and handed off by value.

use serde_json::{Map, Number, Value};

/// One tabular snapshot at one pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Column names in file order.
    pub headers: Vec<String>,
    /// Rows as JSON objects keyed by header.
    pub records: Vec<Map<String, Value>>,
}

/// Basic statistics over a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<Map<String, Value>>) -> Self {
        Self { headers, records }
    }

    /// Infer a scalar cell from raw delimited text.
    ///
    /// Empty text is a missing value; integer and float text become
    /// numbers; everything else stays a string.
    pub fn infer_cell(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(n) = Number::from_f64(f) {
                return Value::Number(n);
            }
        }
        Value::String(raw.to_string())
    }

    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Number of missing (`Null`) cells in one column.
    pub fn null_count(&self, name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.get(name), None | Some(Value::Null)))
            .count()
    }

    /// Missing-value count per column, in header order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.headers
            .iter()
            .map(|h| (h.clone(), self.null_count(h)))
            .collect()
    }

    /// Distinct display values of one column, in first-appearance order.
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for record in &self.records {
            let display = display_cell(record.get(name).unwrap_or(&Value::Null));
            if !seen.contains(&display) {
                seen.push(display);
            }
        }
        seen
    }

    /// Remove a column from the schema and every row.
    ///
    /// Returns whether the column was present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(pos) = self.headers.iter().position(|h| h == name) else {
            return false;
        };
        self.headers.remove(pos);
        for record in &mut self.records {
            record.remove(name);
        }
        true
    }

    /// Count/mean/min/max over the numeric cells of one column.
    ///
    /// `None` when the column has no numeric cells.
    pub fn numeric_summary(&self, name: &str) -> Option<NumericSummary> {
        let values: Vec<f64> = self
            .records
            .iter()
            .filter_map(|r| r.get(name).and_then(Value::as_f64))
            .collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(NumericSummary {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }

    /// Render the header and first `n` rows for diagnostic logs.
    pub fn head(&self, n: usize) -> String {
        let mut out = self.headers.join(" | ");
        for record in self.records.iter().take(n) {
            let row: Vec<String> = self
                .headers
                .iter()
                .map(|h| display_cell(record.get(h).unwrap_or(&Value::Null)))
                .collect();
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        out
    }
}

/// Human-readable form of one cell for logs and distinct-value lists.
pub fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        let headers = vec!["customerID".to_string(), "tenure".to_string(), "Churn".to_string()];
        let rows = vec![
            vec![json!("0001-A"), json!(12), json!("Yes")],
            vec![json!("0002-B"), Value::Null, json!("No")],
            vec![json!("0003-C"), json!(3), json!("Yes")],
        ];
        let records = rows
            .into_iter()
            .map(|row| {
                headers
                    .iter()
                    .cloned()
                    .zip(row)
                    .collect::<Map<String, Value>>()
            })
            .collect();
        Dataset::new(headers, records)
    }

    #[test]
    fn test_infer_cell_types() {
        assert_eq!(Dataset::infer_cell(""), Value::Null);
        assert_eq!(Dataset::infer_cell("   "), Value::Null);
        assert_eq!(Dataset::infer_cell("42"), json!(42));
        assert_eq!(Dataset::infer_cell("29.85"), json!(29.85));
        assert_eq!(Dataset::infer_cell("Month-to-month"), json!("Month-to-month"));
    }

    #[test]
    fn test_shape() {
        let ds = sample();
        assert_eq!(ds.shape(), (3, 3));
        assert!(ds.has_column("tenure"));
        assert!(!ds.has_column("TotalCharges"));
    }

    #[test]
    fn test_null_counts() {
        let ds = sample();
        assert_eq!(ds.null_count("tenure"), 1);
        assert_eq!(ds.null_count("Churn"), 0);

        let counts = ds.null_counts();
        assert_eq!(counts[1], ("tenure".to_string(), 1));
    }

    #[test]
    fn test_distinct_values_order() {
        let ds = sample();
        assert_eq!(ds.distinct_values("Churn"), vec!["Yes", "No"]);
    }

    #[test]
    fn test_drop_column() {
        let mut ds = sample();
        assert!(ds.drop_column("customerID"));
        assert_eq!(ds.n_cols(), 2);
        assert!(ds.records.iter().all(|r| !r.contains_key("customerID")));

        // Dropping again reports absence.
        assert!(!ds.drop_column("customerID"));
    }

    #[test]
    fn test_numeric_summary() {
        let ds = sample();
        let summary = ds.numeric_summary("tenure").unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.min, 3.0);
        assert_eq!(summary.max, 12.0);
        assert_eq!(summary.mean, 7.5);

        assert!(ds.numeric_summary("Churn").is_none());
    }

    #[test]
    fn test_head_preview() {
        let ds = sample();
        let head = ds.head(2);
        assert!(head.starts_with("customerID | tenure | Churn"));
        assert_eq!(head.lines().count(), 3);
        assert!(head.contains("null"));
    }
}
