//! Per-key settings checks used by data source validation.

use super::{keys, Settings, DEFAULT_CONNECTOR_SOURCE};
use crate::connector::ConnectorSource;
use crate::core::schema::TablePattern;
use crate::error::{BridgeError, Result};

impl Settings {
    /// The prefix, or `MissingOption` when unset or empty.
    pub fn require_prefix(&self) -> Result<&str> {
        self.prefix().ok_or(BridgeError::MissingOption(keys::PREFIX))
    }

    /// The connector class is required unless the source is `bundled`.
    ///
    /// Returns the class to resolve, which is empty for a bundled source
    /// with no class configured.
    pub fn require_connector_class(&self) -> Result<&str> {
        match self.connector_class() {
            Some(class) => Ok(class),
            None if self.connector_source.as_deref() == Some(DEFAULT_CONNECTOR_SOURCE) => Ok(""),
            None => Err(BridgeError::MissingOption(keys::CONNECTOR_CLASS)),
        }
    }

    /// Parsed connector source.
    ///
    /// An external file that does not exist is rejected here, before any
    /// load attempt.
    pub fn require_connector_source(&self) -> Result<ConnectorSource> {
        let value = self
            .connector_source()
            .ok_or(BridgeError::MissingOption(keys::CONNECTOR_SOURCE))?;

        let source = ConnectorSource::parse(value);
        if let ConnectorSource::ExternalFile(path) = &source {
            if !path.exists() {
                return Err(BridgeError::InvalidConnectorFile(path.clone()));
            }
        }
        Ok(source)
    }

    pub fn require_data_source_url(&self) -> Result<&str> {
        self.data_source_url()
            .ok_or(BridgeError::MissingOption(keys::DATA_SOURCE_URL))
    }

    /// Parsed table patterns; empty when the key is unset.
    pub fn parsed_table_patterns(&self) -> Result<Vec<TablePattern>> {
        match self.table_patterns() {
            Some(value) => TablePattern::parse_list(value),
            None => Ok(Vec::new()),
        }
    }
}
