//! Identifier quoting with engine-reported quote characters.
//!
//! Quoting is plain wrapping: the open and close sequences are placed
//! around the name verbatim. Embedded quote characters are not escaped.

use super::schema::TableIdentifier;

/// Wrap `name` in the given open/close sequences.
///
/// # Examples
///
/// ```
/// use sqlbridge::core::identifier::quote_with;
///
/// assert_eq!(quote_with("\"", "\"", "id"), "\"id\"");
/// assert_eq!(quote_with("[", "]", "Order Items"), "[Order Items]");
/// ```
pub fn quote_with(open: &str, close: &str, name: &str) -> String {
    let mut quoted = String::with_capacity(open.len() + name.len() + close.len());
    quoted.push_str(open);
    quoted.push_str(name);
    quoted.push_str(close);
    quoted
}

/// Quote every non-empty part of a table identifier and join with dots.
pub fn qualify_with(open: &str, close: &str, table: &TableIdentifier) -> String {
    table
        .parts()
        .into_iter()
        .map(|part| quote_with(open, close, part))
        .collect::<Vec<_>>()
        .join(".")
}
