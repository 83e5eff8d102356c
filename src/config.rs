//! Resolver-wide configuration.

use crate::mets::{DEFAULT_IMAGE_GROUP, DEFAULT_OCR_GROUP};

/// Settings shared by every step of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// File group whose file order defines page order.
    pub image_group: String,
    /// File group holding full text, attached to pages when present.
    pub ocr_group: Option<String>,
    /// Path expression overriding the identifier rule, evaluated against the
    /// whole document.
    pub identifier_expression: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            image_group: DEFAULT_IMAGE_GROUP.to_string(),
            ocr_group: Some(DEFAULT_OCR_GROUP.to_string()),
            identifier_expression: None,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_group(mut self, group: impl Into<String>) -> Self {
        self.image_group = group.into();
        self
    }

    pub fn with_ocr_group(mut self, group: impl Into<String>) -> Self {
        self.ocr_group = Some(group.into());
        self
    }

    pub fn without_ocr_group(mut self) -> Self {
        self.ocr_group = None;
        self
    }

    pub fn with_identifier_expression(mut self, expr: impl Into<String>) -> Self {
        self.identifier_expression = Some(expr.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.image_group, "MAX");
        assert_eq!(config.ocr_group.as_deref(), Some("FULLTEXT"));
        assert!(config.identifier_expression.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ResolverConfig::new()
            .with_image_group("DEFAULT")
            .without_ocr_group()
            .with_identifier_expression("//mods:recordIdentifier[@source='gbv-ppn']");
        assert_eq!(config.image_group, "DEFAULT");
        assert_eq!(config.ocr_group, None);
        assert!(config.identifier_expression.unwrap().contains("gbv-ppn"));
    }
}
