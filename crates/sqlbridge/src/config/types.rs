//! Settings type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix used when neither the file nor the environment sets one.
pub const DEFAULT_PREFIX: &str = "salesforce";

/// Connector source used when neither the file nor the environment sets one.
pub const DEFAULT_CONNECTOR_SOURCE: &str = "bundled";

/// Connector class used with the bundled source when none is configured.
pub const DEFAULT_BUNDLED_CONNECTOR: &str = "odbc";

pub const ENV_PREFIX: &str = "SQLBRIDGE_PREFIX";
pub const ENV_CONNECTOR_SOURCE: &str = "SQLBRIDGE_DRIVER_PATH";
pub const ENV_CONNECTOR_CLASS: &str = "SQLBRIDGE_DRIVER_CLASS";
pub const ENV_DATA_SOURCE_URL: &str = "SQLBRIDGE_JDBC_URL";
pub const ENV_TABLE_PATTERNS: &str = "SQLBRIDGE_TABLES";
pub const ENV_LOG_FILE: &str = "SQLBRIDGE_LOG_FILE";

/// Older variable names, read only when the `SQLBRIDGE_` name is unset.
pub mod legacy_env {
    pub const PREFIX: &str = "CDATA_PREFIX";
    pub const CONNECTOR_SOURCE: &str = "CDATA_DRIVER_PATH";
    pub const CONNECTOR_CLASS: &str = "CDATA_DRIVER_CLASS";
    pub const DATA_SOURCE_URL: &str = "CDATA_JDBC_URL";
    pub const TABLE_PATTERNS: &str = "CDATA_TABLES";
    pub const LOG_FILE: &str = "CDATA_LOG_FILE";
}

/// Setting keys as they appear in the settings file and in diagnostics.
pub mod keys {
    pub const PREFIX: &str = "prefix";
    pub const CONNECTOR_CLASS: &str = "connector-class";
    pub const CONNECTOR_SOURCE: &str = "connector-source";
    pub const DATA_SOURCE_URL: &str = "data-source-url";
    pub const TABLE_PATTERNS: &str = "table-patterns";
    pub const LOG_FILE: &str = "log-file";
}

/// Merged bootstrap settings.
///
/// A key is `None` when neither the file nor the environment supplied it.
/// An explicitly empty value stays `Some("")` and is reported as missing by
/// validation.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Server name and resource scheme prefix.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Connector class resolved in the load scope.
    #[serde(default)]
    pub connector_class: Option<String>,

    /// `bundled`, `resource:<name>` or a path to a connector library.
    #[serde(default)]
    pub connector_source: Option<String>,

    /// Connection url handed to the connector (may embed credentials).
    #[serde(default)]
    pub data_source_url: Option<String>,

    /// Comma-separated table patterns.
    #[serde(default)]
    pub table_patterns: Option<String>,

    /// Log destination for the process entry point.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("prefix", &self.prefix)
            .field("connector_class", &self.connector_class)
            .field("connector_source", &self.connector_source)
            .field(
                "data_source_url",
                &self.data_source_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("table_patterns", &self.table_patterns)
            .field("log_file", &self.log_file)
            .finish()
    }
}
