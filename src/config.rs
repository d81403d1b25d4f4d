//! Startup configuration: database credentials, download tool resolution,
//! and the dataset-specific constants the cleaning logic targets.
//!
//! Everything ambient is materialized here once, up front. Components
//! receive validated structs instead of reading the environment themselves.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// File name prefix shared by every stage artifact.
pub const FILE_PREFIX: &str = "telco_customer_churn";

// =============================================================================
// Database Credentials
// =============================================================================

/// The five environment variables that make up a [`DbConfig`].
pub const DB_ENV_KEYS: [&str; 5] = ["DB_NAME", "DB_USER", "DB_PASSWORD", "DB_HOST", "DB_PORT"];

/// Validated PostgreSQL connection settings.
///
/// Built from the environment (or any key lookup) at startup; a missing
/// field fails validation with every absent variable named, and no
/// connection is ever attempted with a partial config.
#[derive(Clone, Deserialize)]
pub struct DbConfig {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    /// Kept as text until connect time; the loader reports a bad value.
    pub port: String,
}

impl DbConfig {
    /// Read the credentials from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the credentials through an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(DB_ENV_KEYS.len());
        let mut missing = Vec::new();

        for key in DB_ENV_KEYS {
            match get(key).filter(|v| !v.is_empty()) {
                Some(value) => values.push(value),
                None => missing.push(key.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials { missing });
        }

        let mut values = values.into_iter();
        Ok(Self {
            name: values.next().unwrap_or_default(),
            user: values.next().unwrap_or_default(),
            password: values.next().unwrap_or_default(),
            host: values.next().unwrap_or_default(),
            port: values.next().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

// =============================================================================
// Download Tool
// =============================================================================

/// The external dataset download command.
///
/// Resolved from `KAGGLE_CLI` when set, otherwise `kaggle` on `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTool {
    pub command: String,
}

impl DownloadTool {
    /// Environment variable overriding the tool command.
    pub const ENV_KEY: &'static str = "KAGGLE_CLI";

    /// Resolve the tool command from the environment.
    pub fn from_env() -> Self {
        let command = env::var(Self::ENV_KEY)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "kaggle".to_string());
        Self { command }
    }
}

impl Default for DownloadTool {
    fn default() -> Self {
        Self {
            command: "kaggle".to_string(),
        }
    }
}

// =============================================================================
// Remote Dataset
// =============================================================================

/// Identity of a remotely hosted dataset: the slug handed to the download
/// tool and the file name it is expected to place at the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDataset {
    pub slug: String,
    pub expected_file: String,
}

impl RemoteDataset {
    /// The Telco customer churn dataset this pipeline targets.
    pub fn telco_churn() -> Self {
        Self {
            slug: "blastchar/telco-customer-churn".to_string(),
            expected_file: "WA_Fn-UseC_-Telco-Customer-Churn.csv".to_string(),
        }
    }
}

// =============================================================================
// Cleaning Columns
// =============================================================================

/// Column names the cleaning transformation targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanColumns {
    /// Numeric charges column; coerced and zero-filled (fatal if absent).
    pub charges: String,
    /// Churn indicator column; Yes/No encoded to 1/0 (non-fatal if absent).
    pub indicator: String,
    /// Identifier column; dropped when present (non-fatal if absent).
    pub identifier: String,
}

impl Default for CleanColumns {
    fn default() -> Self {
        Self {
            charges: "TotalCharges".to_string(),
            indicator: "Churn".to_string(),
            identifier: "customerID".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_db_config_complete() {
        let vars = env_map(&[
            ("DB_NAME", "telco"),
            ("DB_USER", "etl"),
            ("DB_PASSWORD", "secret"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
        ]);

        let config = DbConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.name, "telco");
        assert_eq!(config.user, "etl");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, "5432");
    }

    #[test]
    fn test_db_config_one_missing() {
        // Scenario: all credentials set except the password.
        let vars = env_map(&[
            ("DB_NAME", "telco"),
            ("DB_USER", "etl"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
        ]);

        let err = DbConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        let ConfigError::MissingCredentials { missing } = err;
        assert_eq!(missing, vec!["DB_PASSWORD".to_string()]);
    }

    #[test]
    fn test_db_config_empty_value_counts_as_missing() {
        let vars = env_map(&[
            ("DB_NAME", "telco"),
            ("DB_USER", ""),
            ("DB_PASSWORD", "secret"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
        ]);

        let err = DbConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        let ConfigError::MissingCredentials { missing } = err;
        assert_eq!(missing, vec!["DB_USER".to_string()]);
    }

    #[test]
    fn test_db_config_debug_redacts_password() {
        let vars = env_map(&[
            ("DB_NAME", "telco"),
            ("DB_USER", "etl"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
        ]);

        let config = DbConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_download_tool_default() {
        assert_eq!(DownloadTool::default().command, "kaggle");
    }

    #[test]
    fn test_clean_columns_default() {
        let cols = CleanColumns::default();
        assert_eq!(cols.charges, "TotalCharges");
        assert_eq!(cols.indicator, "Churn");
        assert_eq!(cols.identifier, "customerID");
    }

    #[test]
    fn test_telco_dataset_identity() {
        let ds = RemoteDataset::telco_churn();
        assert_eq!(ds.slug, "blastchar/telco-customer-churn");
        assert!(ds.expected_file.ends_with(".csv"));
    }
}
