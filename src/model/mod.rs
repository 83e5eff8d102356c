//! Resolved output types.
//!
//! This module contains:
//! - The bibliographic record with its `"unknown"` sentinel
//! - Physical pages and their files
//! - The closed structure type vocabulary
//! - The arena-backed outline tree

mod outline;
mod page;
mod record;
pub mod structure_type;

pub use outline::{NodeIndex, NodeKind, OutlineEntry, OutlineTree, StructureNode};
pub use page::{FileRef, PhysicalPage};
pub use record::{BibliographicRecord, UNKNOWN};
pub(crate) use record::or_unknown;
pub use structure_type::{FALLBACK_LABEL, StructureType, label_for_code};
