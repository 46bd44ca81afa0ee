//! Connector implementations.
//!
//! - [`odbc`]: any engine reachable through the system ODBC driver manager
//!   (feature `odbc`)
//!
//! # Adding New Connectors
//!
//! 1. Create a module under `drivers/` implementing
//!    [`Connector`](crate::core::traits::Connector),
//!    [`Connection`](crate::core::traits::Connection) and
//!    [`DatabaseMetadata`](crate::core::traits::DatabaseMetadata)
//! 2. Register a factory in `ConnectorRegistry::with_builtins()`
//! 3. Gate the connector with a feature flag in `Cargo.toml`

#[cfg(feature = "odbc")]
pub mod odbc;

#[cfg(feature = "odbc")]
pub use odbc::OdbcConnector;
