//! Connector sourcing, loading and connectivity checks.
//!
//! The `connector-source` setting selects one of three strategies:
//!
//! - `bundled`: the class is resolved among connectors compiled into this
//!   process.
//! - `resource:<name>`: a connector library shipped with this program under
//!   its `connectors/` directory.
//! - any other value: a path to a connector library on disk.
//!
//! Every strategy ends in the same instantiation step, run through
//! [`boundary::guard`].

pub mod boundary;
pub mod loader;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::registry::{ConnectorRegistry, LoadScope};
use crate::core::traits::{Connection, Connector, Properties};
use crate::error::{ConnectorError, ConnectorResult};

pub use boundary::guard;
pub use loader::{
    default_resource_root, BundledLoader, ConnectorLoader, ExternalFileLoader,
    PackagedResourceLoader,
};

/// `connector-source` value selecting the in-process connectors.
pub const BUNDLED_SOURCE: &str = "bundled";

/// Prefix of a `connector-source` naming a packaged resource.
pub const RESOURCE_PREFIX: &str = "resource:";

/// Where the connector implementation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorSource {
    Bundled,
    PackagedResource(String),
    ExternalFile(PathBuf),
}

impl ConnectorSource {
    /// Parse a `connector-source` value. Never fails: anything that is not
    /// `bundled` or `resource:<name>` is taken as a file path.
    pub fn parse(value: &str) -> Self {
        if value == BUNDLED_SOURCE {
            ConnectorSource::Bundled
        } else if let Some(name) = value.strip_prefix(RESOURCE_PREFIX) {
            ConnectorSource::PackagedResource(name.to_string())
        } else {
            ConnectorSource::ExternalFile(PathBuf::from(value))
        }
    }

    /// Whether failures are reported as a bundled connector failure.
    ///
    /// Packaged resources ship with the program, so they count as bundled.
    pub fn is_bundled(&self) -> bool {
        !matches!(self, ConnectorSource::ExternalFile(_))
    }

    /// Loader strategy for this source.
    pub fn loader(&self, resource_root: &Path) -> Box<dyn ConnectorLoader> {
        match self {
            ConnectorSource::Bundled => Box::new(BundledLoader),
            ConnectorSource::PackagedResource(name) => {
                Box::new(PackagedResourceLoader::new(resource_root, name.clone()))
            }
            ConnectorSource::ExternalFile(path) => Box::new(ExternalFileLoader::new(path.clone())),
        }
    }
}

impl fmt::Display for ConnectorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorSource::Bundled => write!(f, "{}", BUNDLED_SOURCE),
            ConnectorSource::PackagedResource(name) => write!(f, "{}{}", RESOURCE_PREFIX, name),
            ConnectorSource::ExternalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A loaded connector plus how it was resolved.
#[derive(Clone)]
pub struct ConnectorHandle {
    connector: Arc<dyn Connector>,
    class_name: String,
    scope: LoadScope,
}

impl ConnectorHandle {
    pub fn new(connector: Arc<dyn Connector>, class_name: impl Into<String>, scope: LoadScope) -> Self {
        Self {
            connector,
            class_name: class_name.into(),
            scope,
        }
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn scope(&self) -> &LoadScope {
        &self.scope
    }
}

impl fmt::Debug for ConnectorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorHandle")
            .field("class_name", &self.class_name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Resolve and instantiate `class_name` using the strategy for `source`.
pub fn load_connector(
    source: &ConnectorSource,
    class_name: &str,
    registry: &ConnectorRegistry,
    resource_root: &Path,
) -> ConnectorResult<ConnectorHandle> {
    debug!("Loading connector class '{}' from {}", class_name, source);
    source.loader(resource_root).load(registry, class_name)
}

/// Open a connection with empty properties.
pub fn open_connection(connector: &dyn Connector, url: &str) -> ConnectorResult<Box<dyn Connection>> {
    guard("connect", || connector.connect(url, &Properties::new()))
}

/// Open a connection, hand it to `f`, then release it.
///
/// Connect, every use of the connection and its release all run inside one
/// [`guard`], so a panic while closing is contained as well. The outer
/// error covers connecting and panics; the inner result is `f`'s own.
pub fn with_connection<T, E, F>(
    connector: &dyn Connector,
    url: &str,
    operation: &str,
    f: F,
) -> ConnectorResult<std::result::Result<T, E>>
where
    F: FnOnce(&mut dyn Connection) -> std::result::Result<T, E>,
{
    guard(operation, || {
        let mut conn = connector.connect(url, &Properties::new())?;
        let outcome = f(conn.as_mut());
        drop(conn);
        Ok(outcome)
    })
}

/// Open one connection and close it again. No query is issued.
pub fn verify_connectivity(connector: &dyn Connector, url: &str) -> ConnectorResult<()> {
    let outcome = with_connection(connector, url, "connectivity check", |_| {
        Ok::<(), ConnectorError>(())
    });
    match outcome.and_then(|r| r) {
        Ok(()) => {
            info!("Connectivity check succeeded");
            Ok(())
        }
        Err(e) => {
            warn!("Connectivity check failed: {}", e);
            Err(e)
        }
    }
}
