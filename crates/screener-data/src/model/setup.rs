//! Screener setup definitions.

use serde::Serialize;

/// A named screening criterion whose matches are published as a result table.
///
/// Filters refer to a setup by `name`, never by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenerSetup {
    /// Catalog key.
    pub id: String,
    /// Display and matching name.
    pub name: String,
    /// Result table file, joined onto the results base locator.
    pub source_file: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl ScreenerSetup {
    /// Create a fully specified setup.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source_file: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_file: Some(source_file.into()),
            description: Some(description.into()),
        }
    }

    /// Description, falling back to the name.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}
