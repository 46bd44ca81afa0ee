//! # sqlbridge
//!
//! Bootstrap layer beneath a resource-serving protocol server for
//! relational data sources.
//!
//! This library turns a set of loosely-typed settings into a validated
//! connection factory:
//!
//! - **Connector loading** from the bundled set, a packaged resource or an
//!   external library file, with every call into connector code behind a
//!   panic-catching boundary
//! - **Dialect discovery** of quoting and catalog/schema support from the
//!   engine's own dialect information table
//! - **Default scope** selection from live catalog/schema metadata
//! - **Table resolution** of wildcarded, partially-qualified patterns into
//!   concrete tables
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlbridge::{ConnectorRegistry, DataSource, Settings};
//!
//! fn main() -> sqlbridge::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let source = DataSource::new(settings, ConnectorRegistry::with_builtins());
//!     if !source.validate(&mut std::io::stderr()) {
//!         std::process::exit(1);
//!     }
//!     for table in source.get_tables()? {
//!         println!("{}", table);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connector;
pub mod core;
pub mod datasource;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod scope;
pub mod tables;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use config::Settings;
pub use connector::{ConnectorHandle, ConnectorSource};
pub use core::{ConnectorRegistry, LoadScope, TableIdentifier, TablePattern};
pub use datasource::DataSource;
pub use dialect::DialectCapabilities;
pub use error::{BridgeError, ConnectorError, Result};
pub use scope::ScopeDefaults;
