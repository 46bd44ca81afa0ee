//! Connector contract.
//!
//! Everything the bootstrap layer needs from a data source goes through
//! three traits:
//!
//! - [`Connector`]: produces connections from a url and a property set
//! - [`Connection`]: executes statements and exposes metadata
//! - [`DatabaseMetadata`]: catalog, schema and table listings
//!
//! Implementations are treated as foreign code. Callers inside this crate
//! only reach them through [`crate::connector::boundary::guard`].
//!
//! A connection is closed when it is dropped, so holding it in a local
//! binding is enough to guarantee release on every exit path.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConnectorResult;

/// Properties passed to [`Connector::connect`] alongside the url.
pub type Properties = BTreeMap<String, String>;

/// Produces connections to a data source.
pub trait Connector: Send + Sync {
    /// Connector identifier for logging (e.g., "odbc").
    fn name(&self) -> &str;

    /// Open a new connection. Blocks until the connection is established
    /// or fails.
    fn connect(&self, url: &str, properties: &Properties) -> ConnectorResult<Box<dyn Connection>>;
}

/// An open connection. Dropping it closes it.
pub trait Connection {
    /// Execute a query and return every row as text.
    fn execute_query(&mut self, sql: &str) -> ConnectorResult<RowSet>;

    /// Metadata entry point.
    fn metadata(&mut self) -> &mut dyn DatabaseMetadata;
}

/// Catalog, schema and table listings reported by the engine.
pub trait DatabaseMetadata {
    /// List catalog names in engine order.
    fn catalogs(&mut self) -> ConnectorResult<Vec<String>>;

    /// List schemas in engine order.
    fn schemas(&mut self) -> ConnectorResult<Vec<SchemaEntry>>;

    /// List tables matching the filter in engine order.
    fn tables(&mut self, filter: &TableFilter<'_>) -> ConnectorResult<Vec<TableEntry>>;
}

/// Text result set from [`Connection::execute_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    /// Column names as reported by the engine.
    pub columns: Vec<String>,
    /// Row values; `None` is SQL NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RowSet {
    /// Create a row set from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Value at `(row, col)`, flattening out-of-range and NULL to `None`.
    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// One row of a schema listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

/// One row of a table listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    /// Object kind as classified by the engine (TABLE, VIEW, ...).
    pub kind: Option<String>,
}

/// Filter for [`DatabaseMetadata::tables`]. `None` means match-any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableFilter<'a> {
    pub catalog: Option<&'a str>,
    pub schema: Option<&'a str>,
    /// Name pattern passed verbatim to the engine (may use `%` and `_`).
    pub name: &'a str,
    /// Object kinds to include; empty means every kind.
    pub kinds: &'a [&'a str],
}
