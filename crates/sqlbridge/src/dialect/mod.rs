//! Dialect capability discovery.
//!
//! Quoting characters and catalog/schema support are not hardcoded per
//! engine. They are read at connect time from a name/value dialect
//! information table that the engine exposes, and kept for the lifetime of
//! the [`DataSource`](crate::DataSource).

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::connector::guard;
use crate::core::identifier::{qualify_with, quote_with};
use crate::core::schema::TableIdentifier;
use crate::core::traits::{Connection, RowSet};
use crate::error::ConnectorResult;

/// Fixed query against the dialect information table.
pub const DIALECT_INFO_QUERY: &str = "SELECT NAME, VALUE FROM sys_sqlinfo";

pub const ID_QUOTE_OPEN_CHAR: &str = "IDENTIFIER_QUOTE_OPEN_CHAR";
pub const ID_QUOTE_CLOSE_CHAR: &str = "IDENTIFIER_QUOTE_CLOSE_CHAR";
pub const SUPPORTS_MULTIPLE_CATALOGS: &str = "SUPPORTS_MULTIPLE_CATALOGS";
pub const SUPPORTS_MULTIPLE_SCHEMAS: &str = "SUPPORTS_MULTIPLE_SCHEMAS";

/// Engine-reported dialect facts.
///
/// Holds every reported name/value pair; NULL values are stored as the
/// empty string. Keys the engine did not report stay absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialectCapabilities {
    values: BTreeMap<String, String>,
}

impl DialectCapabilities {
    /// Run [`DIALECT_INFO_QUERY`] on `conn` and fold the rows.
    pub fn discover(conn: &mut dyn Connection) -> ConnectorResult<Self> {
        let rows = guard("dialect discovery", || conn.execute_query(DIALECT_INFO_QUERY))?;
        let caps = Self::from_rows(&rows);
        debug!(
            "Discovered {} dialect entries (quotes={:?}, multi_catalog={}, multi_schema={})",
            caps.values.len(),
            caps.identifier_quotes(),
            caps.supports_multiple_catalogs(),
            caps.supports_multiple_schemas()
        );
        Ok(caps)
    }

    /// Fold NAME (column 0) / VALUE (column 1) rows. Later rows win.
    pub fn from_rows(rows: &RowSet) -> Self {
        let mut values = BTreeMap::new();
        for row in 0..rows.rows.len() {
            let Some(name) = rows.value(row, 0) else {
                continue;
            };
            let value = rows.value(row, 1).unwrap_or_default();
            values.insert(name.to_string(), value.to_string());
        }
        Self { values }
    }

    /// Build from explicit pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Raw reported value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// All reported entries.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn quote_open(&self) -> Option<&str> {
        self.get(ID_QUOTE_OPEN_CHAR)
    }

    pub fn quote_close(&self) -> Option<&str> {
        self.get(ID_QUOTE_CLOSE_CHAR)
    }

    /// `"YES"` in any letter case; anything else, or no value, is false.
    pub fn supports_multiple_catalogs(&self) -> bool {
        is_yes(self.get(SUPPORTS_MULTIPLE_CATALOGS))
    }

    /// `"YES"` in any letter case; anything else, or no value, is false.
    pub fn supports_multiple_schemas(&self) -> bool {
        is_yes(self.get(SUPPORTS_MULTIPLE_SCHEMAS))
    }

    /// Open and close quote characters concatenated (e.g. `""` or `[]`).
    pub fn identifier_quotes(&self) -> String {
        format!(
            "{}{}",
            self.quote_open().unwrap_or_default(),
            self.quote_close().unwrap_or_default()
        )
    }

    /// Wrap `name` in the reported quote characters, without escaping.
    pub fn quote_identifier(&self, name: &str) -> String {
        quote_with(
            self.quote_open().unwrap_or_default(),
            self.quote_close().unwrap_or_default(),
            name,
        )
    }

    /// Quote each part of `table` and join with dots.
    pub fn qualify(&self, table: &TableIdentifier) -> String {
        qualify_with(
            self.quote_open().unwrap_or_default(),
            self.quote_close().unwrap_or_default(),
            table,
        )
    }
}

fn is_yes(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("YES"))
}
