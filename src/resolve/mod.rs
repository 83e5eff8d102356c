//! Structural resolution of METS documents.
//!
//! [`Resolver`] ties the steps together:
//!
//! - [`locator`] picks the primary descriptive section
//! - [`record`] flattens it into a [`BibliographicRecord`]
//! - [`pages`] lays out the physical page sequence
//! - [`structure`] builds the outline from the logical structure map
//! - [`dedup`] removes unresolved and duplicate outline entries
//!
//! # Example
//!
//! ```no_run
//! use mets_outline::{Resolver, ResolverConfig, XmlDocument};
//!
//! let doc = XmlDocument::open("mets.xml")?;
//! let resolver = Resolver::new(&doc, ResolverConfig::default());
//! let resolution = resolver.resolve()?;
//! println!("{} ({} pages)", resolution.record.title, resolution.pages.len());
//! # Ok::<(), mets_outline::Error>(())
//! ```

pub mod dedup;
pub mod links;
pub mod locator;
pub mod pages;
pub mod record;
pub mod structure;

use std::cell::OnceCell;

pub use dedup::{CleanReport, clean};
pub use links::LinkIndex;
pub use locator::locate_primary;
pub use pages::{PageSequence, build_pages};
pub use record::{Relator, build_record, evaluate_identifier_expression};
pub use structure::resolve_structure;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::model::{BibliographicRecord, OutlineTree, PhysicalPage};
use crate::query::DocumentQuery;

/// Everything a resolution pass produces.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: BibliographicRecord,
    pub pages: Vec<PhysicalPage>,
    pub outline: OutlineTree,
    pub report: CleanReport,
}

/// Resolver over a borrowed document.
///
/// The structure links, the primary section and the record are computed at
/// most once per resolver.
pub struct Resolver<'d> {
    doc: &'d dyn DocumentQuery,
    config: ResolverConfig,
    links: OnceCell<LinkIndex>,
    primary: OnceCell<String>,
    record: OnceCell<BibliographicRecord>,
}

impl<'d> Resolver<'d> {
    pub fn new(doc: &'d dyn DocumentQuery, config: ResolverConfig) -> Self {
        Self {
            doc,
            config,
            links: OnceCell::new(),
            primary: OnceCell::new(),
            record: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn links(&self) -> Result<&LinkIndex> {
        if let Some(links) = self.links.get() {
            return Ok(links);
        }
        let links = LinkIndex::build(self.doc)?;
        Ok(self.links.get_or_init(|| links))
    }

    /// Id of the primary descriptive section.
    pub fn primary_section(&self) -> Result<&str> {
        if let Some(section) = self.primary.get() {
            return Ok(section);
        }
        let section = locate_primary(self.doc, self.links()?)?;
        Ok(self.primary.get_or_init(|| section))
    }

    /// The bibliographic record, built on first use.
    pub fn record(&self) -> Result<&BibliographicRecord> {
        if let Some(record) = self.record.get() {
            return Ok(record);
        }
        let record = build_record(
            self.doc,
            self.primary_section()?,
            self.config.identifier_expression.as_deref(),
        )?;
        Ok(self.record.get_or_init(|| record))
    }

    /// Take the identifier from `expr` from now on.
    ///
    /// An already built record is replaced by a copy with the new identifier;
    /// its other fields are not recomputed.
    pub fn override_identifier(&mut self, expr: &str) -> Result<&BibliographicRecord> {
        let identifier = evaluate_identifier_expression(self.doc, expr)?;
        self.config.identifier_expression = Some(expr.to_string());
        if let Some(record) = self.record.take() {
            self.record = OnceCell::from(record.with_identifier(identifier));
        }
        self.record()
    }

    /// The page sequence in paging group order.
    pub fn pages(&self) -> Result<PageSequence> {
        build_pages(
            self.doc,
            &self.config.image_group,
            self.config.ocr_group.as_deref(),
        )
    }

    /// The cleaned outline for `pages`.
    ///
    /// The record title labels an otherwise unlabeled root; the outline does
    /// not require the record to be resolvable.
    pub fn outline(&self, pages: &PageSequence) -> Result<(OutlineTree, CleanReport)> {
        let title = match self.record() {
            Ok(record) => Some(record.title.as_str()),
            Err(err) => {
                tracing::debug!(document = self.doc.source(), %err, "no record title for outline root");
                None
            }
        };
        let tree = resolve_structure(self.doc, pages, self.links()?, title)?;
        Ok(clean(tree))
    }

    /// Run every step and collect the results.
    ///
    /// The first failing step aborts the pass.
    pub fn resolve(&self) -> Result<Resolution> {
        let record = self.record()?.clone();
        let pages = self.pages()?;
        let tree = resolve_structure(self.doc, &pages, self.links()?, Some(&record.title))?;
        let (outline, report) = clean(tree);

        tracing::debug!(
            document = self.doc.source(),
            identifier = record.identifier.as_str(),
            pages = pages.len(),
            outline = outline.node_count(),
            dropped = report.dropped(),
            "resolved document"
        );

        Ok(Resolution {
            record,
            pages: pages.into_pages(),
            outline,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::xml::XmlDocument;

    const DOC: &str = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
<mets:dmdSec ID="dmd1"><mets:mdWrap><mets:xmlData><mods:mods>
  <mods:titleInfo><mods:title>Kurtze Beschreibung</mods:title></mods:titleInfo>
  <mods:recordInfo><mods:recordIdentifier source="gbv-ppn">1001</mods:recordIdentifier></mods:recordInfo>
  <mods:identifier type="vd17">3:600000X</mods:identifier>
  <mods:originInfo><mods:dateIssued>1650</mods:dateIssued></mods:originInfo>
</mods:mods></mets:xmlData></mets:mdWrap></mets:dmdSec>
<mets:fileSec><mets:fileGrp USE="MAX">
  <mets:file ID="f1"><mets:FLocat xlink:href="1.jpg"/></mets:file>
  <mets:file ID="f2"><mets:FLocat xlink:href="2.jpg"/></mets:file>
</mets:fileGrp></mets:fileSec>
<mets:structMap TYPE="LOGICAL">
  <mets:div ID="log1" TYPE="monograph" DMDID="dmd1"><mets:div ID="log2" TYPE="chapter"/></mets:div>
</mets:structMap>
<mets:structMap TYPE="PHYSICAL">
  <mets:div ID="physroot" TYPE="physSequence">
    <mets:div ID="phys1" TYPE="page"><mets:fptr FILEID="f1"/></mets:div>
    <mets:div ID="phys2" TYPE="page"><mets:fptr FILEID="f2"/></mets:div>
  </mets:div>
</mets:structMap>
<mets:structLink>
  <mets:smLink xlink:from="log1" xlink:to="physroot"/>
  <mets:smLink xlink:from="log2" xlink:to="phys2"/>
</mets:structLink>
</mets:mets>"#;

    fn doc() -> XmlDocument {
        XmlDocument::parse(DOC, "facade.xml").unwrap()
    }

    #[test]
    fn test_record_is_memoized() {
        let doc = doc();
        let resolver = Resolver::new(&doc, ResolverConfig::default());
        let first = resolver.record().unwrap();
        let second = resolver.record().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(resolver.primary_section().unwrap(), "dmd1");
    }

    #[test]
    fn test_override_changes_only_identifier() {
        let doc = doc();
        let mut resolver = Resolver::new(&doc, ResolverConfig::default());
        let before = resolver.record().unwrap().clone();

        let after = resolver
            .override_identifier("//mods:identifier[@type='vd17']")
            .unwrap()
            .clone();
        assert_eq!(after.identifier, "3:600000X");
        assert_eq!(after.clone().with_identifier(before.identifier.clone()), before);
        assert_eq!(
            resolver.config().identifier_expression.as_deref(),
            Some("//mods:identifier[@type='vd17']")
        );
    }

    #[test]
    fn test_failed_override_keeps_record() {
        let doc = doc();
        let mut resolver = Resolver::new(&doc, ResolverConfig::default());
        resolver.record().unwrap();
        assert!(matches!(
            resolver.override_identifier("//mods:identifier[@type='urn']"),
            Err(Error::IdentifierExpressionNoMatch { .. })
        ));
        assert_eq!(resolver.record().unwrap().identifier, "1001");
    }

    #[test]
    fn test_resolve() {
        let doc = doc();
        let resolution = Resolver::new(&doc, ResolverConfig::default()).resolve().unwrap();
        assert_eq!(resolution.record.title, "Kurtze Beschreibung");
        assert_eq!(resolution.pages.len(), 2);

        let outline = resolution.outline.to_entries();
        assert_eq!(outline.label, "Monographie");
        assert_eq!(outline.page, 1);
        assert_eq!(outline.children[0].label, "Kapitel");
        assert_eq!(outline.children[0].page, 2);
        assert_eq!(resolution.report, CleanReport::default());
    }

    #[test]
    fn test_other_paging_group() {
        let doc = doc();
        let config = ResolverConfig::default().with_image_group("DEFAULT");
        assert!(matches!(
            Resolver::new(&doc, config).resolve(),
            Err(Error::MissingFileGroup { group, .. }) if group == "DEFAULT"
        ));
    }
}
