//! # mets-outline
//!
//! Structural resolution of METS/MODS documents describing digitized prints.
//!
//! A METS file describes a print four ways at once: descriptive sections
//! (MODS records), a logical structure map (the table of contents), a
//! physical structure map (the scanned pages) and structure links between
//! the two maps. This crate resolves that into:
//!
//! - a [`BibliographicRecord`] taken from the primary descriptive section
//! - the [`PhysicalPage`] sequence, in the order of the paging file group
//! - an [`OutlineTree`] mapping every logical section to its start page
//!
//! ## Quick Start
//!
//! ```no_run
//! use mets_outline::{ResolverConfig, resolve_path};
//!
//! let resolution = resolve_path("mets.xml", ResolverConfig::default())?;
//! println!("{}", resolution.record.title);
//! for (index, depth) in resolution.outline.walk() {
//!     let node = resolution.outline.node(index).unwrap();
//!     println!("{}{} ... {}", "  ".repeat(depth), node.label, node.start_page);
//! }
//! # Ok::<(), mets_outline::Error>(())
//! ```
//!
//! ## Other document sources
//!
//! The resolver only talks to the [`DocumentQuery`] trait. [`XmlDocument`] is
//! the bundled implementation; anything that can answer path queries can be
//! resolved with [`Resolver::new`].

pub mod config;
pub mod error;
pub mod mets;
pub mod model;
pub mod query;
pub mod resolve;
pub mod xml;

use std::path::Path;

pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use model::{
    BibliographicRecord, FileRef, NodeIndex, NodeKind, OutlineEntry, OutlineTree, PhysicalPage,
    StructureNode, StructureType, UNKNOWN,
};
pub use query::{DocumentQuery, FileGroupListing, NodeRef};
pub use resolve::{CleanReport, Resolution, Resolver};
pub use xml::XmlDocument;

/// Load and resolve the METS file at `path`.
pub fn resolve_path(path: impl AsRef<Path>, config: ResolverConfig) -> Result<Resolution> {
    let doc = XmlDocument::open(path)?;
    Resolver::new(&doc, config).resolve()
}
