//! Table pattern expansion against live metadata.

use std::sync::Arc;

use tracing::{debug, info};

use crate::connector::{guard, with_connection};
use crate::core::schema::{TableIdentifier, TablePattern};
use crate::core::traits::{Connection, Connector, TableFilter};
use crate::error::{BridgeError, Result};

/// Expand `patterns` on one open connection.
///
/// One metadata lookup per pattern: catalog and schema filters come from
/// the pattern (absent means match-any), the name is passed verbatim and
/// object kind is unrestricted. Rows are kept exactly as reported and in
/// pattern order; overlapping patterns yield duplicates.
pub fn resolve_tables(
    conn: &mut dyn Connection,
    patterns: &[TablePattern],
) -> Result<Vec<TableIdentifier>> {
    let mut resolved = Vec::new();

    for pattern in patterns {
        let filter = TableFilter {
            catalog: pattern.catalog.as_deref(),
            schema: pattern.schema.as_deref(),
            name: &pattern.name,
            kinds: &[],
        };

        let entries = guard("table listing", || conn.metadata().tables(&filter))
            .map_err(|e| BridgeError::introspection(&format!("table listing for '{}'", pattern), e))?;

        debug!("Pattern '{}' matched {} tables", pattern, entries.len());
        resolved.extend(entries.into_iter().map(|entry| TableIdentifier {
            catalog: entry.catalog,
            schema: entry.schema,
            name: entry.name,
        }));
    }

    Ok(resolved)
}

/// Opens its own connection per [`resolve`](TableResolver::resolve) call.
pub struct TableResolver {
    connector: Arc<dyn Connector>,
    url: String,
}

impl TableResolver {
    pub fn new(connector: Arc<dyn Connector>, url: impl Into<String>) -> Self {
        Self {
            connector,
            url: url.into(),
        }
    }

    /// Resolve `patterns`. An empty list returns immediately without
    /// connecting. Every failure, including failing to connect, is a
    /// [`BridgeError::SchemaIntrospection`].
    pub fn resolve(&self, patterns: &[TablePattern]) -> Result<Vec<TableIdentifier>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let tables = with_connection(self.connector.as_ref(), &self.url, "table resolution", |conn| {
            resolve_tables(conn, patterns)
        })
        .map_err(|e| BridgeError::introspection("table resolution", e))??;

        info!(
            "Resolved {} tables from {} patterns",
            tables.len(),
            patterns.len()
        );
        Ok(tables)
    }
}
