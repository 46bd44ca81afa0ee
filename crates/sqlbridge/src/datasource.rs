//! Data source facade consumed by the protocol server.
//!
//! A [`DataSource`] owns the settings and the connector registry. The first
//! successful [`validate`](DataSource::validate) stores the loaded connector
//! together with its discovered dialect capabilities and default scope; that
//! state is never replaced afterwards.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::connector::{
    default_resource_root, load_connector, open_connection, verify_connectivity, with_connection,
    ConnectorHandle, ConnectorSource,
};
use crate::core::registry::ConnectorRegistry;
use crate::core::schema::TableIdentifier;
use crate::core::traits::{Connection, Connector};
use crate::dialect::DialectCapabilities;
use crate::error::{BridgeError, Result};
use crate::scope::ScopeDefaults;
use crate::tables::TableResolver;

/// Version reported to protocol clients.
pub const SERVER_VERSION: &str = "1.0";

/// Connector plus everything discovered from it during validation.
#[derive(Debug)]
pub struct LoadedConnector {
    pub handle: ConnectorHandle,
    pub capabilities: DialectCapabilities,
    pub defaults: ScopeDefaults,
}

/// Bootstrapped access to one relational data source.
#[derive(Debug)]
pub struct DataSource {
    settings: Settings,
    registry: ConnectorRegistry,
    resource_root: PathBuf,
    loaded: OnceLock<LoadedConnector>,
}

impl DataSource {
    /// Create a data source; packaged connectors resolve under
    /// [`default_resource_root`].
    pub fn new(settings: Settings, registry: ConnectorRegistry) -> Self {
        Self {
            settings,
            registry,
            resource_root: default_resource_root(),
            loaded: OnceLock::new(),
        }
    }

    /// Resolve packaged connectors under `root` instead.
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    /// Check the settings and bring the connector up.
    ///
    /// Writes one line per problem to `errors` and returns whether every
    /// attempted check passed. A connector load failure suppresses the
    /// connectivity check.
    pub fn validate(&self, errors: &mut dyn Write) -> bool {
        let mut ok = true;

        if let Err(e) = self.settings.require_prefix() {
            ok &= report(errors, e.to_string());
        }

        let class_name = match self.settings.require_connector_class() {
            Ok(class) => class,
            Err(e) => {
                ok &= report(errors, e.to_string());
                ""
            }
        };

        match self.settings.require_connector_source() {
            Ok(source) => {
                if let Err(e) = self.load(&source, class_name) {
                    ok &= report(errors, load_diagnostic(&source, &e));
                }
            }
            Err(e) => ok &= report(errors, e.to_string()),
        }

        match self.settings.require_data_source_url() {
            Ok(url) if ok => {
                if let Some(loaded) = self.loaded.get() {
                    if let Err(e) = verify_connectivity(loaded.handle.connector().as_ref(), url) {
                        ok &= report(errors, BridgeError::Connectivity(e).to_string());
                    }
                }
            }
            Ok(_) => debug!("Skipping connectivity check after earlier failures"),
            Err(e) => ok &= report(errors, e.to_string()),
        }

        if ok {
            info!("Data source '{}' validated", self.server_name());
        }
        ok
    }

    /// Instantiate the connector and, when a url is configured, discover
    /// capabilities and default scope on one connection. State is stored
    /// only if every step succeeds.
    fn load(&self, source: &ConnectorSource, class_name: &str) -> Result<()> {
        if let Some(loaded) = self.loaded.get() {
            debug!("Reusing loaded connector '{}'", loaded.handle.class_name());
            return Ok(());
        }

        let handle = load_connector(source, class_name, &self.registry, &self.resource_root)
            .map_err(BridgeError::ConnectorLoad)?;

        let Some(url) = self.settings.data_source_url() else {
            debug!("No data-source-url; skipping capability discovery");
            return Ok(());
        };

        let (capabilities, defaults) =
            with_connection(handle.connector().as_ref(), url, "capability discovery", |conn| {
                let capabilities =
                    DialectCapabilities::discover(conn).map_err(BridgeError::ConnectorLoad)?;
                let defaults = ScopeDefaults::resolve(conn, &capabilities)?;
                Ok::<_, BridgeError>((capabilities, defaults))
            })
            .map_err(BridgeError::ConnectorLoad)??;

        // Lost race: the first stored state wins.
        let _ = self.loaded.set(LoadedConnector {
            handle,
            capabilities,
            defaults,
        });
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedConnector> {
        self.loaded.get().ok_or(BridgeError::NotValidated)
    }

    /// Loaded connector state, if validation has succeeded.
    pub fn loaded_connector(&self) -> Option<&LoadedConnector> {
        self.loaded.get()
    }

    /// Open a new connection with empty properties. The caller owns it.
    pub fn new_connection(&self) -> Result<Box<dyn Connection>> {
        let loaded = self.loaded()?;
        let url = self.settings.require_data_source_url()?;
        open_connection(loaded.handle.connector().as_ref(), url).map_err(BridgeError::Connectivity)
    }

    /// Shared handle to the loaded connector.
    pub fn connector(&self) -> Result<Arc<dyn Connector>> {
        Ok(self.loaded()?.handle.connector().clone())
    }

    pub fn capabilities(&self) -> Result<&DialectCapabilities> {
        Ok(&self.loaded()?.capabilities)
    }

    /// Wrap `name` in the engine's quote characters, without escaping.
    pub fn quote_identifier(&self, name: &str) -> Result<String> {
        Ok(self.capabilities()?.quote_identifier(name))
    }

    /// Quoted, dot-joined name of a resolved table.
    pub fn qualify_table(&self, table: &TableIdentifier) -> Result<String> {
        Ok(self.capabilities()?.qualify(table))
    }

    /// Open and close quote characters concatenated.
    pub fn identifier_quotes(&self) -> Result<String> {
        Ok(self.capabilities()?.identifier_quotes())
    }

    pub fn supports_multiple_catalogs(&self) -> Result<bool> {
        Ok(self.capabilities()?.supports_multiple_catalogs())
    }

    pub fn supports_multiple_schemas(&self) -> Result<bool> {
        Ok(self.capabilities()?.supports_multiple_schemas())
    }

    pub fn default_catalog(&self) -> Result<Option<&str>> {
        Ok(self.loaded()?.defaults.catalog.as_deref())
    }

    pub fn default_schema(&self) -> Result<Option<&str>> {
        Ok(self.loaded()?.defaults.schema.as_deref())
    }

    /// Resolve the `table-patterns` setting against live metadata.
    ///
    /// Unset or empty patterns return an empty list without connecting.
    pub fn get_tables(&self) -> Result<Vec<TableIdentifier>> {
        let patterns = self.settings.parsed_table_patterns()?;
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let connector = self.connector()?;
        let url = self.settings.require_data_source_url()?;
        let result = TableResolver::new(connector, url).resolve(&patterns);
        if let Err(e) = &result {
            warn!("Table resolution failed: {}", e);
        }
        result
    }

    /// Server name: the configured prefix.
    pub fn server_name(&self) -> &str {
        self.settings.prefix().unwrap_or_default()
    }

    pub fn server_version(&self) -> &'static str {
        SERVER_VERSION
    }

    /// `<prefix>://`
    pub fn resource_scheme(&self) -> String {
        format!("{}://", self.server_name())
    }

    pub fn log_file(&self) -> Option<&str> {
        self.settings.log_file()
    }
}

fn report(errors: &mut dyn Write, line: String) -> bool {
    warn!("{}", line);
    if let Err(e) = writeln!(errors, "{}", line) {
        warn!("Failed to write diagnostic: {}", e);
    }
    false
}

fn load_diagnostic(source: &ConnectorSource, err: &BridgeError) -> String {
    let detail = match err {
        BridgeError::ConnectorLoad(e) => e.describe(),
        BridgeError::SchemaIntrospection(msg) => format!("SchemaIntrospectionFailure: {}", msg),
        other => other.to_string(),
    };
    let kind = if source.is_bundled() {
        "bundled connector"
    } else {
        "connector"
    };
    format!("Attempting to load the {} failed: {}", kind, detail)
}
