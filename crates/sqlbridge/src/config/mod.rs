//! Settings loading and validation.
//!
//! Values come from an optional YAML file, then environment variables
//! override them, then the remaining gaps are defaulted. The result is
//! read-only for the rest of the process.

mod types;
mod validation;

pub use types::*;

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::error::{BridgeError, Result};

impl Settings {
    /// Load from an optional settings file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |name| std::env::var_os(name))
    }

    /// Load with a custom environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut settings = match path {
            Some(path) => {
                debug!("Reading settings from {}", path.display());
                let content = std::fs::read_to_string(path)?;
                Self::from_yaml(&content)?
            }
            None => Self::default(),
        };
        settings.apply_env(env)?;
        settings.apply_defaults();
        Ok(settings)
    }

    /// Parse a settings file. No environment overrides or defaults applied.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file is an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Overwrite keys for which the environment has a value.
    ///
    /// Each key is looked up under its `SQLBRIDGE_` name first, then under
    /// its legacy name. A value that is not valid UTF-8 is an error.
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let overrides: [(&str, &str, &mut Option<String>); 6] = [
            (ENV_PREFIX, legacy_env::PREFIX, &mut self.prefix),
            (ENV_CONNECTOR_SOURCE, legacy_env::CONNECTOR_SOURCE, &mut self.connector_source),
            (ENV_CONNECTOR_CLASS, legacy_env::CONNECTOR_CLASS, &mut self.connector_class),
            (ENV_DATA_SOURCE_URL, legacy_env::DATA_SOURCE_URL, &mut self.data_source_url),
            (ENV_TABLE_PATTERNS, legacy_env::TABLE_PATTERNS, &mut self.table_patterns),
            (ENV_LOG_FILE, legacy_env::LOG_FILE, &mut self.log_file),
        ];
        for (name, legacy, slot) in overrides {
            let found = env(name)
                .map(|value| (name, value))
                .or_else(|| env(legacy).map(|value| (legacy, value)));
            if let Some((source, value)) = found {
                let value = value.into_string().map_err(|_| {
                    BridgeError::Config(format!(
                        "Environment variable {} is not valid UTF-8",
                        source
                    ))
                })?;
                debug!("Setting overridden by {}", source);
                *slot = Some(value);
            }
        }
        Ok(())
    }

    /// Fill unset keys that have a default.
    ///
    /// The connector class is only defaulted for the bundled source.
    pub fn apply_defaults(&mut self) {
        self.prefix.get_or_insert_with(|| DEFAULT_PREFIX.to_string());
        self.connector_source
            .get_or_insert_with(|| DEFAULT_CONNECTOR_SOURCE.to_string());
        if self.connector_class.is_none()
            && self.connector_source.as_deref() == Some(DEFAULT_CONNECTOR_SOURCE)
        {
            self.connector_class = Some(DEFAULT_BUNDLED_CONNECTOR.to_string());
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        non_empty(&self.prefix)
    }

    pub fn connector_class(&self) -> Option<&str> {
        non_empty(&self.connector_class)
    }

    pub fn connector_source(&self) -> Option<&str> {
        non_empty(&self.connector_source)
    }

    pub fn data_source_url(&self) -> Option<&str> {
        non_empty(&self.data_source_url)
    }

    pub fn table_patterns(&self) -> Option<&str> {
        non_empty(&self.table_patterns)
    }

    pub fn log_file(&self) -> Option<&str> {
        non_empty(&self.log_file)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
