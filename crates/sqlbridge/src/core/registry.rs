//! Connector registry for explicit dependency injection.
//!
//! The [`ConnectorRegistry`] maps connector class names to factories. It is
//! the "execution environment" in which a connector class is resolved:
//! bundled connectors are factories compiled into this process, while
//! packaged and external connectors are factories that bind a shared
//! library through an isolated [`LoadScope`].
//!
//! The registry is constructed explicitly and handed to the
//! [`DataSource`](crate::DataSource) rather than living in a global, so
//! tests can register mock connectors.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConnectorError, ConnectorResult};

use super::traits::Connector;

/// Where a connector class is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadScope {
    /// The running process's own environment (bundled connectors).
    Process,
    /// A separate scope bound to one connector library.
    Isolated { library: PathBuf },
}

impl LoadScope {
    /// Library bound to this scope, if any.
    pub fn library(&self) -> Option<&Path> {
        match self {
            LoadScope::Process => None,
            LoadScope::Isolated { library } => Some(library),
        }
    }
}

impl fmt::Display for LoadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadScope::Process => write!(f, "process"),
            LoadScope::Isolated { library } => write!(f, "isolated({})", library.display()),
        }
    }
}

/// Builds a connector instance for a load scope.
pub type ConnectorFactory =
    Arc<dyn Fn(&LoadScope) -> ConnectorResult<Arc<dyn Connector>> + Send + Sync>;

/// Registry of connector factories keyed by class name.
#[derive(Default, Clone)]
pub struct ConnectorRegistry {
    factories: HashMap<String, ConnectorFactory>,
}

impl ConnectorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the connectors compiled into this build.
    ///
    /// With the `odbc` feature the ODBC connector is registered under
    /// [`crate::config::DEFAULT_BUNDLED_CONNECTOR`].
    pub fn with_builtins() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "odbc")]
        {
            use crate::drivers::odbc::OdbcConnector;

            registry.register(crate::config::DEFAULT_BUNDLED_CONNECTOR, |scope: &LoadScope| {
                Ok(Arc::new(OdbcConnector::for_scope(scope)?) as Arc<dyn Connector>)
            });
        }

        registry
    }

    /// Register a connector factory under a class name.
    pub fn register<F>(&mut self, class_name: impl Into<String>, factory: F)
    where
        F: Fn(&LoadScope) -> ConnectorResult<Arc<dyn Connector>> + Send + Sync + 'static,
    {
        self.factories.insert(class_name.into(), Arc::new(factory));
    }

    /// Get a factory by class name.
    pub fn get(&self, class_name: &str) -> Option<ConnectorFactory> {
        self.factories.get(class_name).cloned()
    }

    /// Resolve `class_name` and build an instance in `scope`.
    ///
    /// This does not catch panics; callers go through the connector
    /// boundary.
    pub fn instantiate(
        &self,
        class_name: &str,
        scope: &LoadScope,
    ) -> ConnectorResult<Arc<dyn Connector>> {
        let factory = self
            .get(class_name)
            .ok_or_else(|| ConnectorError::ClassNotFound(class_name.to_string()))?;
        factory(scope)
    }

    /// Check if a class name is registered.
    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Get all registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}
