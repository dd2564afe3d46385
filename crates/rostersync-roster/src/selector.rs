//! Logical-field to column resolution.

use serde::{Deserialize, Serialize};

/// Maps a logical roster field to a concrete column.
///
/// A positive 1-based `index` takes precedence over `name`; the name is
/// looked up in the header with an exact, case-sensitive match. With neither
/// configured the field resolves to the empty string for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    /// Header name of the column.
    #[serde(default)]
    pub name: Option<String>,
    /// 1-based column index; `0` or absent means disabled.
    #[serde(default)]
    pub index: Option<usize>,
}

impl FieldSelector {
    /// Select a column by header name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            index: None,
        }
    }

    /// Select a column by 1-based index.
    #[must_use]
    pub fn by_index(index: usize) -> Self {
        Self {
            name: None,
            index: Some(index),
        }
    }

    /// Whether this selector names any column at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.index.is_some_and(|i| i > 0) || self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Resolve the field value for one row.
    ///
    /// Out-of-bounds indexes and unmatched names yield `""`, never an error.
    #[must_use]
    pub fn resolve<'a>(&self, row: &'a [String], header: &[String]) -> &'a str {
        if let Some(index) = self.index.filter(|&i| i > 0) {
            return row.get(index - 1).map_or("", String::as_str);
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if let Some(pos) = header.iter().position(|h| h == name) {
                return row.get(pos).map_or("", String::as_str);
            }
        }
        ""
    }
}
