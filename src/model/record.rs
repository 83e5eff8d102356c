//! The flattened bibliographic record.

/// Sentinel for fields the descriptive section does not provide.
pub const UNKNOWN: &str = "unknown";

/// Bibliographic record of the resolved print.
///
/// Every field holds either genuine content or [`UNKNOWN`]; none is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct BibliographicRecord {
    pub title: String,
    pub identifier: String,
    pub person: String,
    pub year: String,
    pub urn: String,
    pub license: String,
}

impl Default for BibliographicRecord {
    fn default() -> Self {
        Self {
            title: UNKNOWN.to_string(),
            identifier: UNKNOWN.to_string(),
            person: UNKNOWN.to_string(),
            year: UNKNOWN.to_string(),
            urn: UNKNOWN.to_string(),
            license: UNKNOWN.to_string(),
        }
    }
}

impl BibliographicRecord {
    /// A copy of this record with a different identifier.
    pub fn with_identifier(self, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..self
        }
    }

    /// Fields as (name, value) pairs in display order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Title", &self.title),
            ("Identifier", &self.identifier),
            ("Person", &self.person),
            ("Year", &self.year),
            ("URN", &self.urn),
            ("License", &self.license),
        ]
    }
}

/// `value` if present and non-blank, else [`UNKNOWN`].
pub(crate) fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
