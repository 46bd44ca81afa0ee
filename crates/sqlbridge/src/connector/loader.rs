//! Connector sourcing strategies.
//!
//! Each strategy only decides *where* the connector class is resolved (its
//! [`LoadScope`]); instantiation is shared and always runs through the
//! fault boundary.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::registry::{ConnectorRegistry, LoadScope};
use crate::error::{ConnectorError, ConnectorResult};

use super::boundary::guard;
use super::ConnectorHandle;

/// Directory name, next to the executable, that holds packaged connectors.
pub const PACKAGED_CONNECTOR_DIR: &str = "connectors";

/// Resolves a connector class into a live connector.
pub trait ConnectorLoader {
    /// Short description for logs and diagnostics.
    fn describe(&self) -> String;

    /// Prepare the scope the class is resolved in.
    fn scope(&self) -> ConnectorResult<LoadScope>;

    /// Prepare the scope, then resolve and instantiate `class_name`.
    fn load(&self, registry: &ConnectorRegistry, class_name: &str) -> ConnectorResult<ConnectorHandle> {
        let scope = self.scope()?;
        debug!("Resolving connector class '{}' in {} scope", class_name, scope);

        let connector = guard("connector instantiation", || {
            registry.instantiate(class_name, &scope)
        })?;

        info!("Loaded connector '{}' from {}", class_name, self.describe());
        Ok(ConnectorHandle::new(connector, class_name, scope))
    }
}

/// Connector already compiled into this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl ConnectorLoader for BundledLoader {
    fn describe(&self) -> String {
        "bundled connectors".to_string()
    }

    fn scope(&self) -> ConnectorResult<LoadScope> {
        Ok(LoadScope::Process)
    }
}

/// Connector library shipped inside this program's distribution.
#[derive(Debug, Clone)]
pub struct PackagedResourceLoader {
    root: PathBuf,
    resource: String,
}

impl PackagedResourceLoader {
    /// Resolve `resource` under `root` (normally [`default_resource_root`]).
    pub fn new(root: impl Into<PathBuf>, resource: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            resource: resource.into(),
        }
    }

    /// Path the resource resolves to.
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.resource)
    }
}

impl ConnectorLoader for PackagedResourceLoader {
    fn describe(&self) -> String {
        format!("packaged resource '{}'", self.resource)
    }

    fn scope(&self) -> ConnectorResult<LoadScope> {
        let path = self.path();
        if !path.is_file() {
            return Err(ConnectorError::LibraryLoad(format!(
                "resource not found: {}",
                self.resource
            )));
        }
        Ok(LoadScope::Isolated { library: path })
    }
}

/// Connector library at an arbitrary path on disk.
#[derive(Debug, Clone)]
pub struct ExternalFileLoader {
    path: PathBuf,
}

impl ExternalFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectorLoader for ExternalFileLoader {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn scope(&self) -> ConnectorResult<LoadScope> {
        if !self.path.is_file() {
            return Err(ConnectorError::LibraryLoad(format!(
                "connector library not found: {}",
                self.path.display()
            )));
        }
        let library = self
            .path
            .canonicalize()
            .map_err(|e| ConnectorError::LibraryLoad(format!("{}: {}", self.path.display(), e)))?;
        Ok(LoadScope::Isolated { library })
    }
}

/// `<directory of the running executable>/connectors`, or `./connectors`
/// when the executable path is unavailable.
pub fn default_resource_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(PACKAGED_CONNECTOR_DIR)
}
