//! Core abstractions shared by every bootstrap component.
//!
//! - [`traits`]: the connector contract (connector, connection, metadata)
//! - [`schema`]: table patterns and resolved table identifiers
//! - [`identifier`]: identifier quoting with engine-reported quote characters
//! - [`registry`]: connector registry for explicit dependency injection
//!
//! Connector implementations live outside this module (`drivers/` for the
//! ones compiled into the process, shared libraries for the rest), so the
//! bootstrap logic can be tested against mock connectors.

pub mod identifier;
pub mod registry;
pub mod schema;
pub mod traits;

pub use registry::{ConnectorFactory, ConnectorRegistry, LoadScope};
pub use schema::{TableIdentifier, TablePattern};
pub use traits::{
    Connection, Connector, DatabaseMetadata, Properties, RowSet, SchemaEntry, TableEntry,
    TableFilter,
};
