//! Error types for the bootstrap layer.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for bootstrap operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A required setting is absent or empty.
    #[error("The '{0}' option is missing")]
    MissingOption(&'static str),

    /// The external connector file named by `connector-source` does not exist.
    #[error("The 'connector-source' option is not a valid connector library file: {}", .0.display())]
    InvalidConnectorFile(PathBuf),

    /// Connector resolution, instantiation or capability discovery failed.
    #[error("Connector load failed: {0}")]
    ConnectorLoad(#[source] ConnectorError),

    /// A connection could not be established.
    #[error("Failed to open connection: {0}")]
    Connectivity(#[source] ConnectorError),

    /// A dialect or metadata query failed.
    #[error("Schema introspection failed: {0}")]
    SchemaIntrospection(String),

    /// The data source was used before a successful validation.
    #[error("Data source has not been validated")]
    NotValidated,

    /// Settings could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (settings file, connector files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BridgeError {
    /// Create a SchemaIntrospection error from a connector failure.
    pub fn introspection(context: &str, err: ConnectorError) -> Self {
        BridgeError::SchemaIntrospection(format!("{}: {}", context, err))
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            BridgeError::MissingOption(_)
            | BridgeError::InvalidConnectorFile(_)
            | BridgeError::Config(_)
            | BridgeError::Yaml(_) => 2,
            BridgeError::ConnectorLoad(_) | BridgeError::NotValidated => 3,
            BridgeError::Connectivity(_) => 4,
            BridgeError::SchemaIntrospection(_) => 5,
            BridgeError::Io(_) => 7,
        }
    }
}

/// Failure raised by, or while loading, a connector implementation.
///
/// Connectors are foreign code, so every failure crossing the connector
/// boundary is reduced to one of these categories plus a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// No connector is registered under the requested class name.
    #[error("connector class not found: {0}")]
    ClassNotFound(String),

    /// The connector factory could not build an instance.
    #[error("{0}")]
    Instantiation(String),

    /// The instantiated component cannot act as a connector in this scope.
    #[error("{0}")]
    CapabilityMismatch(String),

    /// The isolated load scope could not be prepared.
    #[error("{0}")]
    LibraryLoad(String),

    /// The connector failed to establish a connection.
    #[error("{0}")]
    Connection(String),

    /// A statement or metadata call failed on an open connection.
    #[error("{0}")]
    Query(String),

    /// Foreign code panicked.
    #[error("{0}")]
    Panic(String),
}

impl ConnectorError {
    /// Short category name used in diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            ConnectorError::ClassNotFound(_) => "ClassNotFound",
            ConnectorError::Instantiation(_) => "InstantiationFailure",
            ConnectorError::CapabilityMismatch(_) => "CapabilityMismatch",
            ConnectorError::LibraryLoad(_) => "LibraryLoadFailure",
            ConnectorError::Connection(_) => "ConnectionFailure",
            ConnectorError::Query(_) => "QueryFailure",
            ConnectorError::Panic(_) => "Panic",
        }
    }

    /// `<category>: <message>` form used by validation diagnostics.
    pub fn describe(&self) -> String {
        format!("{}: {}", self.category(), self)
    }
}

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Result type alias for calls into connector code.
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;
