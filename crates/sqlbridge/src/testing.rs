//! In-memory connector for tests.
//!
//! Row order is fixed by the test: listings come back exactly in the order
//! they were scripted, which pins down the engine-defined "first row"
//! behaviour of scope resolution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::traits::{
    Connection, Connector, DatabaseMetadata, Properties, RowSet, SchemaEntry, TableEntry,
    TableFilter,
};
use crate::dialect::DIALECT_INFO_QUERY;
use crate::error::{ConnectorError, ConnectorResult};

/// Filter values seen by a table listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFilter {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    pub kinds: Vec<String>,
}

#[derive(Default)]
struct Script {
    sql_info: Vec<(String, Option<String>)>,
    catalogs: Vec<String>,
    schemas: Vec<SchemaEntry>,
    tables: Vec<TableEntry>,
    fail_connect: Option<String>,
    panic_connect: Option<String>,
    fail_query: Option<String>,
    panic_query: Option<String>,
    panic_metadata: Option<String>,
    fail_tables: Option<String>,
    panic_tables: Option<String>,
    panic_drop: Option<String>,
}

#[derive(Default)]
struct Counters {
    live: AtomicUsize,
    opened: AtomicUsize,
    filters: Mutex<Vec<RecordedFilter>>,
    urls: Mutex<Vec<String>>,
}

/// Scripted connector that tracks open connections.
#[derive(Clone)]
pub struct MockConnector {
    script: Arc<Script>,
    counters: Arc<Counters>,
}

impl MockConnector {
    /// Connector reporting `"` quoting, single catalog and single schema.
    pub fn new() -> Self {
        Self::default()
            .with_sql_info("IDENTIFIER_QUOTE_OPEN_CHAR", Some("\""))
            .with_sql_info("IDENTIFIER_QUOTE_CLOSE_CHAR", Some("\""))
            .with_sql_info("SUPPORTS_MULTIPLE_CATALOGS", Some("NO"))
            .with_sql_info("SUPPORTS_MULTIPLE_SCHEMAS", Some("NO"))
            .with_schemas(vec![schema_entry("C1", "S1")])
    }

    /// Connector with no scripted rows at all.
    pub fn empty() -> Self {
        Self::default()
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("script is configured before use")
    }

    /// Add or replace a dialect info row.
    pub fn with_sql_info(mut self, name: &str, value: Option<&str>) -> Self {
        let rows = &mut self.script_mut().sql_info;
        rows.retain(|(key, _)| key != name);
        rows.push((name.to_string(), value.map(str::to_string)));
        self
    }

    pub fn with_catalogs(mut self, catalogs: Vec<&str>) -> Self {
        self.script_mut().catalogs = catalogs.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_schemas(mut self, schemas: Vec<SchemaEntry>) -> Self {
        self.script_mut().schemas = schemas;
        self
    }

    pub fn with_tables(mut self, tables: Vec<TableEntry>) -> Self {
        self.script_mut().tables = tables;
        self
    }

    pub fn failing_connect(mut self, message: &str) -> Self {
        self.script_mut().fail_connect = Some(message.to_string());
        self
    }

    pub fn panicking_connect(mut self, message: &str) -> Self {
        self.script_mut().panic_connect = Some(message.to_string());
        self
    }

    pub fn failing_query(mut self, message: &str) -> Self {
        self.script_mut().fail_query = Some(message.to_string());
        self
    }

    pub fn failing_tables(mut self, message: &str) -> Self {
        self.script_mut().fail_tables = Some(message.to_string());
        self
    }

    pub fn panicking_query(mut self, message: &str) -> Self {
        self.script_mut().panic_query = Some(message.to_string());
        self
    }

    /// Panic in catalog and schema listings.
    pub fn panicking_metadata(mut self, message: &str) -> Self {
        self.script_mut().panic_metadata = Some(message.to_string());
        self
    }

    pub fn panicking_tables(mut self, message: &str) -> Self {
        self.script_mut().panic_tables = Some(message.to_string());
        self
    }

    /// Panic when a connection is released. The live count is updated first.
    pub fn panicking_drop(mut self, message: &str) -> Self {
        self.script_mut().panic_drop = Some(message.to_string());
        self
    }

    /// Connections currently open.
    pub fn live_connections(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Connections opened since creation.
    pub fn opened_connections(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Filters passed to table listings, in call order.
    pub fn table_filters(&self) -> Vec<RecordedFilter> {
        self.counters.filters.lock().unwrap().clone()
    }

    /// Urls passed to `connect`, in call order.
    pub fn connect_urls(&self) -> Vec<String> {
        self.counters.urls.lock().unwrap().clone()
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self {
            script: Arc::new(Script::default()),
            counters: Arc::new(Counters::default()),
        }
    }
}

impl Connector for MockConnector {
    fn name(&self) -> &str {
        "mock"
    }

    fn connect(&self, url: &str, _properties: &Properties) -> ConnectorResult<Box<dyn Connection>> {
        self.counters.urls.lock().unwrap().push(url.to_string());
        if let Some(message) = &self.script.panic_connect {
            panic!("{}", message);
        }
        if let Some(message) = &self.script.fail_connect {
            return Err(ConnectorError::Connection(message.clone()));
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            script: self.script.clone(),
            counters: self.counters.clone(),
        }))
    }
}

struct MockConnection {
    script: Arc<Script>,
    counters: Arc<Counters>,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        if let Some(message) = &self.script.panic_drop {
            panic!("{}", message);
        }
    }
}

impl Connection for MockConnection {
    fn execute_query(&mut self, sql: &str) -> ConnectorResult<RowSet> {
        if let Some(message) = &self.script.panic_query {
            panic!("{}", message);
        }
        if let Some(message) = &self.script.fail_query {
            return Err(ConnectorError::Query(message.clone()));
        }
        if sql != DIALECT_INFO_QUERY {
            return Err(ConnectorError::Query(format!("no such table in: {}", sql)));
        }

        let rows = self
            .script
            .sql_info
            .iter()
            .map(|(name, value)| vec![Some(name.clone()), value.clone()])
            .collect();
        Ok(RowSet::new(vec!["NAME".to_string(), "VALUE".to_string()], rows))
    }

    fn metadata(&mut self) -> &mut dyn DatabaseMetadata {
        self
    }
}

impl DatabaseMetadata for MockConnection {
    fn catalogs(&mut self) -> ConnectorResult<Vec<String>> {
        if let Some(message) = &self.script.panic_metadata {
            panic!("{}", message);
        }
        Ok(self.script.catalogs.clone())
    }

    fn schemas(&mut self) -> ConnectorResult<Vec<SchemaEntry>> {
        if let Some(message) = &self.script.panic_metadata {
            panic!("{}", message);
        }
        Ok(self.script.schemas.clone())
    }

    fn tables(&mut self, filter: &TableFilter<'_>) -> ConnectorResult<Vec<TableEntry>> {
        self.counters.filters.lock().unwrap().push(RecordedFilter {
            catalog: filter.catalog.map(str::to_string),
            schema: filter.schema.map(str::to_string),
            name: filter.name.to_string(),
            kinds: filter.kinds.iter().map(|k| k.to_string()).collect(),
        });
        if let Some(message) = &self.script.panic_tables {
            panic!("{}", message);
        }
        if let Some(message) = &self.script.fail_tables {
            return Err(ConnectorError::Query(message.clone()));
        }

        let matches = |value: &Option<String>, pattern: Option<&str>| match pattern {
            None => true,
            Some(p) => value.as_deref().is_some_and(|v| like(v, p)),
        };

        Ok(self
            .script
            .tables
            .iter()
            .filter(|t| matches(&t.catalog, filter.catalog))
            .filter(|t| matches(&t.schema, filter.schema))
            .filter(|t| like(&t.name, filter.name))
            .cloned()
            .collect())
    }
}

/// SQL LIKE with `%` and `_`, case-sensitive.
pub fn like(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_at(&value, &pattern)
}

fn like_at(value: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => value.is_empty(),
        Some(('%', rest)) => (0..=value.len()).any(|i| like_at(&value[i..], rest)),
        Some(('_', rest)) => !value.is_empty() && like_at(&value[1..], rest),
        Some((c, rest)) => value.first() == Some(c) && like_at(&value[1..], rest),
    }
}

pub fn schema_entry(catalog: &str, schema: &str) -> SchemaEntry {
    SchemaEntry {
        catalog: Some(catalog.to_string()),
        schema: Some(schema.to_string()),
    }
}

pub fn table_entry(catalog: &str, schema: &str, name: &str) -> TableEntry {
    TableEntry {
        catalog: Some(catalog.to_string()),
        schema: Some(schema.to_string()),
        name: name.to_string(),
        kind: Some("TABLE".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_wildcards() {
        assert!(like("CUSTOMER_A", "CUSTOMER%"));
        assert!(like("CUSTOMER", "CUSTOMER%"));
        assert!(like("Lead", "L_ad"));
        assert!(!like("ORDERS", "CUSTOMER%"));
        assert!(!like("Lead", "Lea"));
    }

    #[test]
    fn test_connection_drop_releases() {
        let connector = MockConnector::new();
        {
            let _conn = connector.connect("mock://", &Properties::new()).unwrap();
            assert_eq!(connector.live_connections(), 1);
        }
        assert_eq!(connector.live_connections(), 0);
        assert_eq!(connector.opened_connections(), 1);
    }
}
