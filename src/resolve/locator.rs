//! Locating the primary descriptive section.
//!
//! A METS document may carry several `mets:dmdSec`s (host record, volume
//! record, records for contained works). Which one describes the print is
//! decided by an ordered list of strategies; the first one that yields a
//! section wins:
//!
//! 1. `simple`: the top logical div, or its single document-level child,
//!    is the only candidate carrying a `DMDID`.
//! 2. `physical_root_link`: the physical sequence root is linked from
//!    exactly one logical div.
//! 3. `majority_link`: among document-level divs with a `DMDID`, the one
//!    linking the most pages (itself and its descendants).
//! 4. `parent_of_tied_pair`: two candidates tie and one is the direct
//!    parent of the other; the parent wins.

use std::cell::OnceCell;
use std::collections::HashSet;

use super::links::LinkIndex;
use crate::error::{Error, Result};
use crate::mets;
use crate::model::StructureType;
use crate::query::{DocumentQuery, NodeRef};

/// A strategy inspects the document and may decide on a section id.
type Strategy = fn(&LocatorContext<'_>) -> Result<Option<String>>;

/// Strategies in order of specificity.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("simple", simple),
    ("physical_root_link", physical_root_link),
    ("majority_link", majority_link),
    ("parent_of_tied_pair", parent_of_tied_pair),
];

/// A logical div eligible to carry the primary section.
#[derive(Debug, Clone)]
struct Candidate {
    node: NodeRef,
    section: String,
    link_count: usize,
}

/// Shared state for the strategies; candidates are ranked once, on demand.
struct LocatorContext<'a> {
    doc: &'a dyn DocumentQuery,
    links: &'a LinkIndex,
    logical_map: Option<NodeRef>,
    candidates: OnceCell<Vec<Candidate>>,
}

/// Find the id of the primary descriptive section.
pub fn locate_primary(doc: &dyn DocumentQuery, links: &LinkIndex) -> Result<String> {
    let ctx = LocatorContext {
        doc,
        links,
        logical_map: doc.select_first(doc.root(), mets::LOGICAL_MAP)?,
        candidates: OnceCell::new(),
    };

    for (name, strategy) in STRATEGIES {
        if let Some(section) = strategy(&ctx)? {
            tracing::debug!(
                document = doc.source(),
                strategy = name,
                section = section.as_str(),
                "located primary descriptive section"
            );
            return check_exists(doc, section);
        }
    }

    let top = ctx.top_candidates()?;
    if top.is_empty() {
        Err(Error::NoPrimarySection {
            document: doc.source().to_string(),
        })
    } else {
        Err(Error::AmbiguousPrimarySection {
            document: doc.source().to_string(),
            candidates: top.iter().map(|c| c.section.clone()).collect(),
        })
    }
}

fn check_exists(doc: &dyn DocumentQuery, section: String) -> Result<String> {
    let exists = doc
        .element_by_id(&section)
        .is_some_and(|node| doc.local_name(node) == Some("dmdSec"));
    if exists {
        Ok(section)
    } else {
        Err(Error::UnknownDescriptiveSection {
            document: doc.source().to_string(),
            section,
        })
    }
}

impl LocatorContext<'_> {
    fn dmd_id(&self, div: NodeRef) -> Option<String> {
        self.doc
            .attribute(div, mets::ATTR_DMDID)
            .and_then(mets::first_dmd_id)
            .map(String::from)
    }

    fn structure_type(&self, div: NodeRef) -> Option<StructureType> {
        self.doc
            .attribute(div, mets::ATTR_TYPE)
            .and_then(StructureType::from_code)
    }

    fn is_document_level(&self, div: NodeRef) -> bool {
        self.structure_type(div)
            .is_some_and(|t| t.is_document_level())
    }

    /// Document-level divs with a `DMDID`, in document order.
    fn candidates(&self) -> Result<&[Candidate]> {
        if let Some(candidates) = self.candidates.get() {
            return Ok(candidates);
        }

        let mut candidates = Vec::new();
        if let Some(map) = self.logical_map {
            for div in self.doc.select(map, ".//mets:div")? {
                if !self.is_document_level(div) {
                    continue;
                }
                let Some(section) = self.dmd_id(div) else {
                    continue;
                };
                candidates.push(Candidate {
                    node: div,
                    section,
                    link_count: self.count_links(div)?,
                });
            }
        }

        Ok(self.candidates.get_or_init(|| candidates))
    }

    /// Distinct physical targets linked from `div` or any of its descendants.
    fn count_links(&self, div: NodeRef) -> Result<usize> {
        let mut nodes = vec![div];
        nodes.extend(self.doc.select(div, ".//mets:div")?);

        let mut targets = HashSet::new();
        for node in nodes {
            if let Some(id) = self.doc.attribute(node, mets::ATTR_ID) {
                targets.extend(self.links.targets(id).iter().map(String::as_str));
            }
        }
        Ok(targets.len())
    }

    /// Candidates sharing the highest link count, one per distinct section.
    fn top_candidates(&self) -> Result<Vec<Candidate>> {
        let candidates = self.candidates()?;
        let Some(max) = candidates.iter().map(|c| c.link_count).max() else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        Ok(candidates
            .iter()
            .filter(|c| c.link_count == max)
            .filter(|c| seen.insert(c.section.clone()))
            .cloned()
            .collect())
    }
}

fn simple(ctx: &LocatorContext<'_>) -> Result<Option<String>> {
    let Some(map) = ctx.logical_map else {
        return Ok(None);
    };
    let tops = ctx.doc.select(map, mets::DIVS)?;
    let [top] = tops.as_slice() else {
        return Ok(None);
    };

    let mut found = Vec::new();
    let top_is_anchor = ctx.structure_type(*top).is_some_and(|t| t.is_anchor());
    if !top_is_anchor && let Some(section) = ctx.dmd_id(*top) {
        found.push(section);
    }
    for child in ctx.doc.select(*top, mets::DIVS)? {
        if ctx.is_document_level(child)
            && let Some(section) = ctx.dmd_id(child)
        {
            found.push(section);
        }
    }

    Ok(match found.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    })
}

fn physical_root_link(ctx: &LocatorContext<'_>) -> Result<Option<String>> {
    let doc = ctx.doc;
    let expr = format!(
        "{}/mets:div[@TYPE='{}']",
        mets::PHYSICAL_MAP,
        mets::PHYSICAL_ROOT_TYPE
    );

    let mut linking: Vec<&str> = Vec::new();
    for root in doc.select_all(&expr)? {
        let Some(id) = doc.attribute(root, mets::ATTR_ID) else {
            continue;
        };
        for source in ctx.links.sources(id) {
            if !linking.contains(&source.as_str()) {
                linking.push(source);
            }
        }
    }

    let [logical_id] = linking.as_slice() else {
        return Ok(None);
    };
    Ok(doc
        .element_by_id(logical_id)
        .and_then(|div| ctx.dmd_id(div)))
}

fn majority_link(ctx: &LocatorContext<'_>) -> Result<Option<String>> {
    let top = ctx.top_candidates()?;
    Ok(match top.as_slice() {
        [winner] => Some(winner.section.clone()),
        _ => None,
    })
}

fn parent_of_tied_pair(ctx: &LocatorContext<'_>) -> Result<Option<String>> {
    let top = ctx.top_candidates()?;
    let [a, b] = top.as_slice() else {
        return Ok(None);
    };

    let parent_of = |node: NodeRef| ctx.doc.parent(node);
    if parent_of(b.node) == Some(a.node) {
        Ok(Some(a.section.clone()))
    } else if parent_of(a.node) == Some(b.node) {
        Ok(Some(b.section.clone()))
    } else {
        Ok(None)
    }
}
