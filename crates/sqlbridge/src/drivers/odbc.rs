//! ODBC connector.
//!
//! The data-source-url is an ODBC connection string. In the process scope
//! the string is passed through unchanged and the driver manager picks the
//! driver. In an isolated scope the connector library is the ODBC driver
//! itself and is pinned with `Driver={<path>}`.
//!
//! **Requirements:**
//! - The `odbc` feature must be enabled
//! - An ODBC driver manager must be installed:
//!   - Linux: `apt install unixodbc` or `yum install unixODBC`
//!   - macOS: `brew install unixodbc`
//!   - Windows: built in

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use odbc_api::buffers::TextRowSet;
use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tracing::{debug, info};

use crate::core::registry::LoadScope;
use crate::core::traits::{
    Connection, Connector, DatabaseMetadata, Properties, RowSet, SchemaEntry, TableEntry,
    TableFilter,
};
use crate::error::{ConnectorError, ConnectorResult};

const BATCH_SIZE: usize = 1000;
const MAX_STR_LEN: usize = 4096;

/// SQLTables result columns.
const TABLE_CAT: usize = 0;
const TABLE_SCHEM: usize = 1;
const TABLE_NAME: usize = 2;
const TABLE_TYPE: usize = 3;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Process-wide ODBC environment.
fn environment() -> ConnectorResult<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| {
        ConnectorError::Instantiation(format!(
            "Failed to create ODBC environment: {}. Make sure an ODBC driver manager is installed.",
            e
        ))
    })?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// Connector over the system ODBC driver manager.
#[derive(Debug)]
pub struct OdbcConnector {
    driver: Option<PathBuf>,
}

impl OdbcConnector {
    /// Build the connector for a load scope.
    ///
    /// # Errors
    ///
    /// - `Instantiation` if the ODBC environment cannot be created
    /// - `LibraryLoad` if the isolated library cannot be read
    /// - `CapabilityMismatch` if the isolated library is not a shared object
    pub fn for_scope(scope: &LoadScope) -> ConnectorResult<Self> {
        environment()?;

        let driver = match scope.library() {
            Some(library) => {
                check_shared_object(library)?;
                Some(library.to_path_buf())
            }
            None => None,
        };

        debug!("ODBC connector ready (driver={:?})", driver);
        Ok(Self { driver })
    }

    /// Pinned driver library, if any.
    pub fn driver(&self) -> Option<&Path> {
        self.driver.as_deref()
    }

    fn connection_string(&self, url: &str, properties: &Properties) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(driver) = &self.driver {
            parts.push(format!("Driver={{{}}}", driver.display()));
        }
        parts.extend(
            url.split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .filter(|p| self.driver.is_none() || !is_driver_attribute(p))
                .map(str::to_string),
        );
        parts.extend(properties.iter().map(|(k, v)| format!("{}={}", k, v)));
        parts.join(";")
    }
}

impl Connector for OdbcConnector {
    fn name(&self) -> &str {
        "odbc"
    }

    fn connect(&self, url: &str, properties: &Properties) -> ConnectorResult<Box<dyn Connection>> {
        let env = environment()?;
        let connection_string = self.connection_string(url, properties);

        let conn = env
            .connect_with_connection_string(&connection_string, ConnectionOptions::default())
            .map_err(|e| ConnectorError::Connection(format!("ODBC connection failed: {}", e)))?;

        info!("Connected via ODBC");
        Ok(Box::new(OdbcConnection { conn }))
    }
}

/// An open ODBC connection. Closed on drop.
pub struct OdbcConnection {
    conn: odbc_api::Connection<'static>,
}

impl Connection for OdbcConnection {
    fn execute_query(&mut self, sql: &str) -> ConnectorResult<RowSet> {
        let cursor = self
            .conn
            .execute(sql, ())
            .map_err(|e| ConnectorError::Query(format!("ODBC query failed: {} - SQL: {}", e, sql)))?;

        match cursor {
            Some(cursor) => read_rows(cursor),
            None => Ok(RowSet::default()),
        }
    }

    fn metadata(&mut self) -> &mut dyn DatabaseMetadata {
        self
    }
}

impl DatabaseMetadata for OdbcConnection {
    fn catalogs(&mut self) -> ConnectorResult<Vec<String>> {
        // SQL_ALL_CATALOGS
        let rows = self.list_tables("%", "", "", "")?;
        Ok((0..rows.rows.len())
            .filter_map(|row| rows.value(row, TABLE_CAT).map(str::to_string))
            .collect())
    }

    fn schemas(&mut self) -> ConnectorResult<Vec<SchemaEntry>> {
        // SQL_ALL_SCHEMAS
        let rows = self.list_tables("", "%", "", "")?;
        Ok((0..rows.rows.len())
            .map(|row| SchemaEntry {
                catalog: rows.value(row, TABLE_CAT).map(str::to_string),
                schema: rows.value(row, TABLE_SCHEM).map(str::to_string),
            })
            .collect())
    }

    fn tables(&mut self, filter: &TableFilter<'_>) -> ConnectorResult<Vec<TableEntry>> {
        let kinds = filter.kinds.join(",");
        let rows = self.list_tables(
            filter.catalog.unwrap_or("%"),
            filter.schema.unwrap_or("%"),
            filter.name,
            &kinds,
        )?;

        Ok((0..rows.rows.len())
            .filter_map(|row| {
                let name = rows.value(row, TABLE_NAME)?;
                Some(TableEntry {
                    catalog: rows.value(row, TABLE_CAT).map(str::to_string),
                    schema: rows.value(row, TABLE_SCHEM).map(str::to_string),
                    name: name.to_string(),
                    kind: rows.value(row, TABLE_TYPE).map(str::to_string),
                })
            })
            .collect())
    }
}

impl OdbcConnection {
    fn list_tables(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        kinds: &str,
    ) -> ConnectorResult<RowSet> {
        let cursor = self
            .conn
            .tables(catalog, schema, table, kinds)
            .map_err(|e| ConnectorError::Query(format!("ODBC table listing failed: {}", e)))?;
        read_rows(cursor)
    }
}

/// Fetch every row of `cursor` as text.
fn read_rows(mut cursor: impl Cursor) -> ConnectorResult<RowSet> {
    let columns = cursor
        .column_names()
        .map_err(|e| ConnectorError::Query(format!("Failed to get column names: {}", e)))?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| ConnectorError::Query(format!("Failed to get column names: {}", e)))?;
    let num_cols = columns.len();

    let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_STR_LEN))
        .map_err(|e| ConnectorError::Query(format!("Failed to create row buffer: {}", e)))?;
    let mut row_cursor = cursor
        .bind_buffer(&mut buffers)
        .map_err(|e| ConnectorError::Query(format!("Failed to bind buffer: {}", e)))?;

    let mut rows = Vec::new();
    while let Some(batch) = row_cursor
        .fetch()
        .map_err(|e| ConnectorError::Query(format!("Failed to fetch rows: {}", e)))?
    {
        for row_idx in 0..batch.num_rows() {
            let row = (0..num_cols)
                .map(|col_idx| {
                    batch
                        .at(col_idx, row_idx)
                        .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                })
                .collect();
            rows.push(row);
        }
    }

    Ok(RowSet::new(columns, rows))
}

fn is_driver_attribute(part: &str) -> bool {
    part.split_once('=')
        .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("driver"))
}

/// Reject libraries that are not ELF, Mach-O or PE images.
fn check_shared_object(library: &Path) -> ConnectorResult<()> {
    let mut magic = [0u8; 4];
    let read = File::open(library)
        .and_then(|mut f| f.read(&mut magic))
        .map_err(|e| ConnectorError::LibraryLoad(format!("{}: {}", library.display(), e)))?;

    if is_shared_object_magic(&magic[..read]) {
        Ok(())
    } else {
        Err(ConnectorError::CapabilityMismatch(format!(
            "{} is not a shared library and cannot provide an ODBC driver",
            library.display()
        )))
    }
}

fn is_shared_object_magic(magic: &[u8]) -> bool {
    const ELF: &[u8] = b"\x7fELF";
    const PE: &[u8] = b"MZ";
    const MACH_O: [[u8; 4]; 5] = [
        [0xfe, 0xed, 0xfa, 0xce],
        [0xfe, 0xed, 0xfa, 0xcf],
        [0xce, 0xfa, 0xed, 0xfe],
        [0xcf, 0xfa, 0xed, 0xfe],
        [0xca, 0xfe, 0xba, 0xbe],
    ];
    magic.starts_with(ELF) || magic.starts_with(PE) || MACH_O.iter().any(|m| magic == m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(driver: Option<&str>) -> OdbcConnector {
        OdbcConnector {
            driver: driver.map(PathBuf::from),
        }
    }

    #[test]
    fn test_connection_string_passthrough_in_process_scope() {
        let c = connector(None);
        assert_eq!(
            c.connection_string("Driver={Acme};Server=db;UID=u", &Properties::new()),
            "Driver={Acme};Server=db;UID=u"
        );
    }

    #[test]
    fn test_connection_string_pins_isolated_driver() {
        let c = connector(Some("/opt/acme/libacmeodbc.so"));
        assert_eq!(
            c.connection_string("DRIVER={Other};Server=db;", &Properties::new()),
            "Driver={/opt/acme/libacmeodbc.so};Server=db"
        );
    }

    #[test]
    fn test_connection_string_appends_properties() {
        let c = connector(None);
        let mut props = Properties::new();
        props.insert("UID".to_string(), "u".to_string());
        assert_eq!(c.connection_string("DSN=acme", &props), "DSN=acme;UID=u");
    }

    #[test]
    fn test_shared_object_magic() {
        assert!(is_shared_object_magic(b"\x7fELF"));
        assert!(is_shared_object_magic(b"MZ\x90\x00"));
        assert!(is_shared_object_magic(&[0xcf, 0xfa, 0xed, 0xfe]));
        assert!(!is_shared_object_magic(b"PK\x03\x04"));
        assert!(!is_shared_object_magic(b""));
    }

    #[test]
    fn test_text_file_is_capability_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("driver.jar");
        std::fs::write(&path, b"PK\x03\x04 not a shared object").unwrap();

        let err = check_shared_object(&path).unwrap_err();
        assert_eq!(err.category(), "CapabilityMismatch");
    }
}
