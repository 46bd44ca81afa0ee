//! Table reference types.
//!
//! A [`TablePattern`] is what the user asked for; a [`TableIdentifier`] is
//! what the engine reported back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Possibly wildcarded, possibly partially-qualified table reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePattern {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    /// Table name, passed to the engine verbatim (may contain `%` / `_`).
    pub name: String,
}

impl TablePattern {
    /// Pattern matching `name` in any catalog and schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Restrict the pattern to a schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Restrict the pattern to a catalog.
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Parse a comma-separated list of patterns.
    ///
    /// Each entry is `name`, `schema.name` or `catalog.schema.name`. Parts
    /// may be wrapped in `"..."`, `[...]` or `` `...` `` to keep dots, commas
    /// or surrounding spaces. Empty entries are skipped.
    pub fn parse_list(input: &str) -> Result<Vec<TablePattern>> {
        let mut patterns = Vec::new();
        let mut parts: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut quoted: Option<String> = None;
        let mut closing: Option<char> = None;

        for ch in input.chars() {
            if let Some(close) = closing {
                if ch == close {
                    closing = None;
                    quoted = Some(std::mem::take(&mut current));
                } else {
                    current.push(ch);
                }
                continue;
            }

            match ch {
                '.' => parts.push(finish_part(&mut current, &mut quoted)),
                ',' => {
                    parts.push(finish_part(&mut current, &mut quoted));
                    if let Some(pattern) = build_pattern(std::mem::take(&mut parts))? {
                        patterns.push(pattern);
                    }
                }
                '"' | '[' | '`' if current.trim().is_empty() && quoted.is_none() => {
                    current.clear();
                    closing = Some(if ch == '[' { ']' } else { ch });
                }
                c if quoted.is_some() => {
                    if !c.is_whitespace() {
                        return Err(BridgeError::Config(format!(
                            "unexpected '{}' after quoted identifier in table list: {}",
                            c, input
                        )));
                    }
                }
                c => current.push(c),
            }
        }

        if closing.is_some() {
            return Err(BridgeError::Config(format!(
                "unterminated quoted identifier in table list: {}",
                input
            )));
        }

        parts.push(finish_part(&mut current, &mut quoted));
        if let Some(pattern) = build_pattern(parts)? {
            patterns.push(pattern);
        }

        Ok(patterns)
    }
}

fn finish_part(current: &mut String, quoted: &mut Option<String>) -> String {
    let raw = std::mem::take(current);
    match quoted.take() {
        Some(value) => value,
        None => raw.trim().to_string(),
    }
}

fn build_pattern(mut parts: Vec<String>) -> Result<Option<TablePattern>> {
    if parts.len() == 1 && parts[0].is_empty() {
        return Ok(None);
    }
    if parts.len() > 3 {
        return Err(BridgeError::Config(format!(
            "table reference has too many parts: {}",
            parts.join(".")
        )));
    }
    if parts.iter().any(|p| p.is_empty()) {
        return Err(BridgeError::Config(format!(
            "table reference has an empty part: {}",
            parts.join(".")
        )));
    }

    let name = parts.pop().unwrap_or_default();
    let schema = parts.pop();
    let catalog = parts.pop();
    Ok(Some(TablePattern {
        catalog,
        schema,
        name,
    }))
}

impl FromStr for TablePattern {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let mut patterns = Self::parse_list(s)?;
        match patterns.len() {
            1 => Ok(patterns.remove(0)),
            0 => Err(BridgeError::Config("empty table reference".to_string())),
            n => Err(BridgeError::Config(format!(
                "expected one table reference, found {}",
                n
            ))),
        }
    }
}

impl fmt::Display for TablePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{}.", catalog)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}", self.name)
    }
}

/// Concrete table as reported by engine metadata.
///
/// Never built from user input; the table resolver is the only producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdentifier {
    /// Catalog name (`None` when the engine reports NULL).
    pub catalog: Option<String>,
    /// Schema name (`None` when the engine reports NULL).
    pub schema: Option<String>,
    pub name: String,
}

impl TableIdentifier {
    /// The non-empty name parts in catalog, schema, name order.
    pub fn parts(&self) -> Vec<&str> {
        [self.catalog.as_deref(), self.schema.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect()
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts().join("."))
    }
}
