//! Default catalog/schema resolution.
//!
//! Which lookup runs depends on the two dialect flags:
//!
//! | multi-catalog | multi-schema | lookup                          |
//! |---------------|--------------|---------------------------------|
//! | no            | no           | first schema row → catalog+schema |
//! | no            | yes          | first catalog row → catalog     |
//! | yes           | any          | none                            |
//!
//! "First row" is whatever the engine returns first; no ordering is
//! imposed here.

use serde::Serialize;
use tracing::debug;

use crate::connector::guard;
use crate::core::traits::Connection;
use crate::dialect::DialectCapabilities;
use crate::error::{BridgeError, Result};

/// Default catalog/schema used for unqualified table references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeDefaults {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

/// Lookup used to derive [`ScopeDefaults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeStrategy {
    /// Single catalog, single schema: take both from the schema listing.
    SchemaListing,
    /// Single catalog, many schemas: take the catalog from the catalog listing.
    CatalogListing,
    /// Many catalogs: no single default is meaningful.
    Unscoped,
}

impl ScopeStrategy {
    /// Pick the strategy for the discovered capabilities.
    pub fn select(caps: &DialectCapabilities) -> Self {
        if caps.supports_multiple_catalogs() {
            ScopeStrategy::Unscoped
        } else if caps.supports_multiple_schemas() {
            ScopeStrategy::CatalogListing
        } else {
            ScopeStrategy::SchemaListing
        }
    }
}

impl ScopeDefaults {
    /// Resolve defaults on an already open connection.
    pub fn resolve(conn: &mut dyn Connection, caps: &DialectCapabilities) -> Result<Self> {
        let strategy = ScopeStrategy::select(caps);
        debug!("Resolving default scope using {:?}", strategy);

        let defaults = match strategy {
            ScopeStrategy::SchemaListing => {
                let schemas = guard("schema listing", || conn.metadata().schemas())
                    .map_err(|e| BridgeError::introspection("schema listing", e))?;
                let first = schemas.into_iter().next().ok_or_else(|| {
                    BridgeError::SchemaIntrospection("schema listing returned no rows".into())
                })?;
                ScopeDefaults {
                    catalog: first.catalog,
                    schema: first.schema,
                }
            }
            ScopeStrategy::CatalogListing => {
                let catalogs = guard("catalog listing", || conn.metadata().catalogs())
                    .map_err(|e| BridgeError::introspection("catalog listing", e))?;
                let first = catalogs.into_iter().next().ok_or_else(|| {
                    BridgeError::SchemaIntrospection("catalog listing returned no rows".into())
                })?;
                ScopeDefaults {
                    catalog: Some(first),
                    schema: None,
                }
            }
            ScopeStrategy::Unscoped => ScopeDefaults::default(),
        };

        debug!(
            "Default scope: catalog={:?}, schema={:?}",
            defaults.catalog, defaults.schema
        );
        Ok(defaults)
    }
}
