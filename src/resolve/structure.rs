//! Building the outline from the logical structure map.
//!
//! Every logical div becomes a section node whose start page is the page of
//! its first structure link. Further links of a non document-level div
//! become page leaves under it, ahead of its logical children.

use super::links::LinkIndex;
use super::pages::PageSequence;
use crate::error::{Error, Result};
use crate::mets;
use crate::model::{FALLBACK_LABEL, NodeIndex, NodeKind, OutlineTree, StructureNode, StructureType, UNKNOWN};
use crate::query::{DocumentQuery, NodeRef};

/// Type code given to page leaves.
pub const PAGE_TYPE: &str = "page";

/// Resolve the logical structure into an outline tree.
///
/// `title` labels the root when nothing more specific is available. Start
/// page 0 marks a target without a paging file; such nodes are removed by
/// [`clean`](super::dedup::clean).
pub fn resolve_structure(
    doc: &dyn DocumentQuery,
    pages: &PageSequence,
    links: &LinkIndex,
    title: Option<&str>,
) -> Result<OutlineTree> {
    let missing = || Error::MissingLogicalStructure {
        document: doc.source().to_string(),
    };
    let map = doc.select_first(doc.root(), mets::LOGICAL_MAP)?.ok_or_else(missing)?;
    let top = doc.select_first(map, mets::DIVS)?.ok_or_else(missing)?;

    let builder = StructureBuilder {
        doc,
        pages,
        links,
        title: title.filter(|t| !t.trim().is_empty() && *t != UNKNOWN),
    };

    let root_div = builder.document_root(top)?;
    let (root, extra) = builder.section(root_div, true)?;
    let logical_id = root.id.clone();
    let mut tree = OutlineTree::new(root);
    let root = tree.root();
    builder.attach_pages(&mut tree, root, &logical_id, &extra)?;
    builder.descend(&mut tree, root, root_div)?;

    tracing::debug!(
        document = doc.source(),
        nodes = tree.node_count(),
        "resolved logical structure"
    );
    Ok(tree)
}

struct StructureBuilder<'a> {
    doc: &'a dyn DocumentQuery,
    pages: &'a PageSequence,
    links: &'a LinkIndex,
    title: Option<&'a str>,
}

impl StructureBuilder<'_> {
    /// Skip anchor containers that wrap exactly one print.
    fn document_root(&self, mut div: NodeRef) -> Result<NodeRef> {
        loop {
            let is_anchor = self
                .doc
                .attribute(div, mets::ATTR_TYPE)
                .and_then(StructureType::from_code)
                .is_some_and(|t| t.is_anchor());
            if !is_anchor {
                return Ok(div);
            }
            match self.doc.select(div, mets::DIVS)?.as_slice() {
                [only] => div = *only,
                _ => return Ok(div),
            }
        }
    }

    fn descend(&self, tree: &mut OutlineTree, parent: NodeIndex, div: NodeRef) -> Result<()> {
        for child in self.doc.select(div, mets::DIVS)? {
            let (node, extra) = self.section(child, false)?;
            let logical_id = node.id.clone();
            let index = tree.append(parent, node);
            self.attach_pages(tree, index, &logical_id, &extra)?;
            self.descend(tree, index, child)?;
        }
        Ok(())
    }

    /// Section node for `div`, plus the physical ids to attach as page leaves.
    fn section(&self, div: NodeRef, is_root: bool) -> Result<(StructureNode, Vec<String>)> {
        let doc = self.doc;
        let id = doc.non_empty_attribute(div, mets::ATTR_ID).unwrap_or_default();
        let type_code = doc.non_empty_attribute(div, mets::ATTR_TYPE).unwrap_or_default();
        let mut node = StructureNode::new(id, type_code, NodeKind::Section);

        if node.structure_type.is_none() {
            tracing::warn!(
                document = doc.source(),
                logical_id = id,
                type_code,
                "unknown structure type"
            );
        }
        node.label = self.label(div, node.structure_type, is_root);

        let targets = self.links.targets(id);
        node.start_page = match targets.first() {
            Some(target) => self.page_of(id, target)?,
            None if node
                .structure_type
                .is_some_and(|t| t.is_newspaper_container()) =>
            {
                1
            }
            None => {
                return Err(Error::UnresolvedPageLink {
                    document: doc.source().to_string(),
                    logical_id: id.to_string(),
                });
            }
        };

        let document_level = node.structure_type.is_some_and(|t| t.is_document_level());
        let extra = if document_level {
            Vec::new()
        } else {
            targets
                .iter()
                .skip(1)
                .filter(|target| !self.pages.is_sequence_root(target))
                .cloned()
                .collect()
        };

        Ok((node, extra))
    }

    fn label(&self, div: NodeRef, structure_type: Option<StructureType>, is_root: bool) -> String {
        let explicit = self
            .doc
            .non_empty_attribute(div, mets::ATTR_LABEL)
            .or_else(|| self.doc.non_empty_attribute(div, mets::ATTR_ORDER_LABEL));
        if let Some(label) = explicit {
            return label.to_string();
        }
        if let Some(t) = structure_type {
            return t.label().to_string();
        }
        if is_root && let Some(title) = self.title {
            return title.to_string();
        }
        FALLBACK_LABEL.to_string()
    }

    /// Start page for a link from `logical_id` to `physical_id`.
    fn page_of(&self, logical_id: &str, physical_id: &str) -> Result<u32> {
        if self.pages.is_sequence_root(physical_id) {
            return Ok(1);
        }
        if let Some(order) = self.pages.order_of(physical_id) {
            return Ok(order);
        }
        if self.pages.contains(physical_id) {
            tracing::warn!(
                document = self.doc.source(),
                logical_id,
                physical_id,
                "linked page has no file in the paging group"
            );
            return Ok(0);
        }
        Err(Error::InvalidPhysicalTarget {
            document: self.doc.source().to_string(),
            logical_id: logical_id.to_string(),
            physical_id: physical_id.to_string(),
        })
    }

    fn attach_pages(
        &self,
        tree: &mut OutlineTree,
        parent: NodeIndex,
        logical_id: &str,
        physical_ids: &[String],
    ) -> Result<()> {
        for physical_id in physical_ids {
            let start_page = self.page_of(logical_id, physical_id)?;
            let label = self
                .doc
                .element_by_id(physical_id)
                .and_then(|div| {
                    self.doc
                        .non_empty_attribute(div, mets::ATTR_LABEL)
                        .or_else(|| self.doc.non_empty_attribute(div, mets::ATTR_ORDER_LABEL))
                })
                .ok_or_else(|| Error::UnlabelableLeafPage {
                    document: self.doc.source().to_string(),
                    logical_id: logical_id.to_string(),
                    physical_id: physical_id.clone(),
                })?;

            let leaf = StructureNode::new(physical_id.as_str(), PAGE_TYPE, NodeKind::Page)
                .with_label(label)
                .with_start_page(start_page);
            tree.append(parent, leaf);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::pages::build_pages;
    use crate::xml::XmlDocument;

    fn doc(logical: &str, links: &[(&str, &str)]) -> XmlDocument {
        let sm_links: String = links
            .iter()
            .map(|(from, to)| format!(r#"<mets:smLink xlink:from="{from}" xlink:to="{to}"/>"#))
            .collect();
        let xml = format!(
            r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
<mets:fileSec><mets:fileGrp USE="MAX">
  <mets:file ID="f1"><mets:FLocat xlink:href="1.jpg"/></mets:file>
  <mets:file ID="f2"><mets:FLocat xlink:href="2.jpg"/></mets:file>
  <mets:file ID="f3"><mets:FLocat xlink:href="3.jpg"/></mets:file>
</mets:fileGrp></mets:fileSec>
<mets:structMap TYPE="LOGICAL">{logical}</mets:structMap>
<mets:structMap TYPE="PHYSICAL">
  <mets:div ID="physroot" TYPE="physSequence">
    <mets:div ID="phys1" TYPE="page" ORDERLABEL="[1]"><mets:fptr FILEID="f1"/></mets:div>
    <mets:div ID="phys2" TYPE="page" LABEL="Titel" ORDERLABEL="[2]"><mets:fptr FILEID="f2"/></mets:div>
    <mets:div ID="phys3" TYPE="page"><mets:fptr FILEID="f3"/></mets:div>
    <mets:div ID="phys4" TYPE="page" LABEL="Beilage"/>
  </mets:div>
</mets:structMap>
<mets:structLink>{sm_links}</mets:structLink>
</mets:mets>"#
        );
        XmlDocument::parse(&xml, "structure.xml").unwrap()
    }

    fn resolve(doc: &XmlDocument, title: Option<&str>) -> Result<OutlineTree> {
        let pages = build_pages(doc, "MAX", None)?;
        let links = LinkIndex::build(doc)?;
        resolve_structure(doc, &pages, &links, title)
    }

    fn labels(tree: &OutlineTree) -> Vec<(String, u32, usize)> {
        tree.walk()
            .into_iter()
            .map(|(i, depth)| {
                let node = tree.node(i).unwrap();
                (node.label.clone(), node.start_page, depth)
            })
            .collect()
    }

    #[test]
    fn test_labels_and_start_pages() {
        let doc = doc(
            r#"<mets:div ID="log1" TYPE="monograph" DMDID="dmd1">
  <mets:div ID="log2" TYPE="title_page" LABEL="Titelblatt"/>
  <mets:div ID="log3" TYPE="chapter"/>
</mets:div>"#,
            &[("log1", "physroot"), ("log2", "phys1"), ("log3", "phys2")],
        );
        let tree = resolve(&doc, Some("Hodegeticum")).unwrap();
        assert_eq!(
            labels(&tree),
            vec![
                ("Monographie".to_string(), 1, 0),
                ("Titelblatt".to_string(), 1, 1),
                ("Kapitel".to_string(), 2, 1),
            ]
        );
    }

    #[test]
    fn test_root_falls_back_to_title_then_placeholder() {
        let doc = doc(
            r#"<mets:div ID="log1" TYPE="custom_type"/>"#,
            &[("log1", "physroot")],
        );
        let tree = resolve(&doc, Some("Hodegeticum")).unwrap();
        assert_eq!(tree.node(tree.root()).unwrap().label, "Hodegeticum");

        let tree = resolve(&doc, Some(UNKNOWN)).unwrap();
        assert_eq!(tree.node(tree.root()).unwrap().label, FALLBACK_LABEL);
    }

    #[test]
    fn test_anchor_root_is_skipped() {
        let doc = doc(
            r#"<mets:div ID="log0" TYPE="multivolume_work"><mets:div ID="log1" TYPE="volume"/></mets:div>"#,
            &[("log1", "physroot")],
        );
        let tree = resolve(&doc, None).unwrap();
        assert_eq!(tree.node(tree.root()).unwrap().id, "log1");
    }

    #[test]
    fn test_extra_links_become_page_leaves() {
        let doc = doc(
            r#"<mets:div ID="log1" TYPE="monograph">
  <mets:div ID="log2" TYPE="chapter"><mets:div ID="log3" TYPE="section"/></mets:div>
</mets:div>"#,
            &[
                ("log1", "physroot"),
                ("log1", "phys1"),
                ("log2", "phys1"),
                ("log2", "phys2"),
                ("log3", "phys3"),
            ],
        );
        let tree = resolve(&doc, None).unwrap();
        let chapter = tree.children(tree.root())[0];
        let kids: Vec<_> = tree
            .children(chapter)
            .iter()
            .map(|&i| {
                let n = tree.node(i).unwrap();
                (n.id.as_str(), n.kind, n.label.as_str(), n.start_page)
            })
            .collect();
        assert_eq!(
            kids,
            vec![
                ("phys2", NodeKind::Page, "Titel", 2),
                ("log3", NodeKind::Section, "Abschnitt", 3),
            ]
        );
        // Document-level root: no page leaves.
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_unlabelable_leaf_page() {
        let doc = doc(
            r#"<mets:div ID="log1" TYPE="chapter"/>"#,
            &[("log1", "phys1"), ("log1", "phys3")],
        );
        assert!(matches!(
            resolve(&doc, None),
            Err(Error::UnlabelableLeafPage { logical_id, physical_id, .. })
                if logical_id == "log1" && physical_id == "phys3"
        ));
    }

    #[test]
    fn test_link_failures() {
        let unlinked = doc(
            r#"<mets:div ID="log1" TYPE="monograph"><mets:div ID="log2" TYPE="chapter"/></mets:div>"#,
            &[("log1", "physroot")],
        );
        assert!(matches!(
            resolve(&unlinked, None),
            Err(Error::UnresolvedPageLink { logical_id, .. }) if logical_id == "log2"
        ));

        let dangling = doc(
            r#"<mets:div ID="log1" TYPE="monograph"/>"#,
            &[("log1", "phys99")],
        );
        assert!(matches!(
            resolve(&dangling, None),
            Err(Error::InvalidPhysicalTarget { physical_id, .. }) if physical_id == "phys99"
        ));
    }

    #[test]
    fn test_newspaper_container_without_link() {
        let doc = doc(
            r#"<mets:div ID="log1" TYPE="year" LABEL="1848"><mets:div ID="log2" TYPE="issue"/></mets:div>"#,
            &[("log2", "phys2")],
        );
        let tree = resolve(&doc, None).unwrap();
        assert_eq!(
            labels(&tree),
            vec![("1848".to_string(), 1, 0), ("Ausgabe".to_string(), 2, 1)]
        );
    }

    #[test]
    fn test_target_without_paging_file_is_marked() {
        let doc = doc(
            r#"<mets:div ID="log1" TYPE="monograph"><mets:div ID="log2" TYPE="map"/></mets:div>"#,
            &[("log1", "physroot"), ("log2", "phys4")],
        );
        let tree = resolve(&doc, None).unwrap();
        let map = tree.children(tree.root())[0];
        assert_eq!(tree.node(map).unwrap().start_page, 0);
    }

    #[test]
    fn test_missing_logical_map() {
        let xml = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"/>"#;
        let doc = XmlDocument::parse(xml, "empty.xml").unwrap();
        let result = resolve_structure(&doc, &PageSequence::default(), &LinkIndex::default(), None);
        assert!(matches!(result, Err(Error::MissingLogicalStructure { .. })));
    }
}
