//! Error types for METS resolution.
//!
//! Every resolution failure names the document it happened in, and where it
//! applies the logical node and physical container involved, so a broken
//! record can be located without re-running with verbose tracing.

use thiserror::Error;

/// Errors that can occur while loading or resolving a METS document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error in {document}: {message}")]
    Xml { document: String, message: String },

    #[error("invalid path expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    #[error("no primary descriptive section found in {document}")]
    NoPrimarySection { document: String },

    #[error("ambiguous primary descriptive section in {document}: candidates {}", candidates.join(", "))]
    AmbiguousPrimarySection {
        document: String,
        candidates: Vec<String>,
    },

    #[error("descriptive section '{section}' referenced but not present in {document}")]
    UnknownDescriptiveSection { document: String, section: String },

    #[error("no identifier with a source attribute in section '{section}' of {document}")]
    NoRecordIdentifier { document: String, section: String },

    #[error("identifier expression '{expression}' matched nothing in {document}")]
    IdentifierExpressionNoMatch { document: String, expression: String },

    #[error("identifier expression '{expression}' matched an empty value in {document}")]
    IdentifierExpressionEmpty { document: String, expression: String },

    #[error("no logical structure map in {document}")]
    MissingLogicalStructure { document: String },

    #[error("file group '{group}' is missing or empty in {document}")]
    MissingFileGroup { document: String, group: String },

    #[error("logical node '{logical_id}' links to unknown physical container '{physical_id}' in {document}")]
    InvalidPhysicalTarget {
        document: String,
        logical_id: String,
        physical_id: String,
    },

    #[error("logical node '{logical_id}' has no structure link in {document}")]
    UnresolvedPageLink {
        document: String,
        logical_id: String,
    },

    #[error("page '{physical_id}' linked from '{logical_id}' has neither LABEL nor ORDERLABEL in {document}")]
    UnlabelableLeafPage {
        document: String,
        logical_id: String,
        physical_id: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
