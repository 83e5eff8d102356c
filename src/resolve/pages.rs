//! The physical page sequence.
//!
//! Page order is the order of the files in the paging file group, never the
//! `ORDER` attribute of the physical divs. Start pages are looked up through
//! the same table, so physical page order and outline page numbers agree.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::mets;
use crate::model::{FileRef, PhysicalPage};
use crate::query::{DocumentQuery, FileGroupListing, NodeRef};

/// Pages in paging order plus the lookups the structure resolver needs.
#[derive(Debug, Clone, Default)]
pub struct PageSequence {
    pages: Vec<PhysicalPage>,
    orders: HashMap<String, u32>,
    containers: HashSet<String>,
    roots: Vec<String>,
}

impl PageSequence {
    pub fn pages(&self) -> &[PhysicalPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<PhysicalPage> {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page order of a physical container, if it has a paging file.
    pub fn order_of(&self, physical_id: &str) -> Option<u32> {
        self.orders.get(physical_id).copied()
    }

    /// Whether `physical_id` names a div of the physical structure map.
    pub fn contains(&self, physical_id: &str) -> bool {
        self.containers.contains(physical_id)
    }

    /// Whether `physical_id` is the container standing for the whole sequence.
    pub fn is_sequence_root(&self, physical_id: &str) -> bool {
        self.roots.iter().any(|root| root == physical_id)
    }
}

/// Build the page sequence from the `image_group` file order.
///
/// Files of `ocr_group` are attached right after the image file; files of
/// any other group follow in file group order.
pub fn build_pages(
    doc: &dyn DocumentQuery,
    image_group: &str,
    ocr_group: Option<&str>,
) -> Result<PageSequence> {
    let images = doc.files(image_group)?;
    if images.is_empty() {
        return Err(Error::MissingFileGroup {
            document: doc.source().to_string(),
            group: image_group.to_string(),
        });
    }

    let mut sequence = PageSequence::default();
    let mut owners: HashMap<String, NodeRef> = HashMap::new();
    let mut pointers: HashMap<NodeRef, Vec<String>> = HashMap::new();

    if let Some(map) = doc.select_first(doc.root(), mets::PHYSICAL_MAP)? {
        for top in doc.select(map, mets::DIVS)? {
            if doc.attribute(top, mets::ATTR_TYPE) == Some(mets::PHYSICAL_ROOT_TYPE)
                && let Some(id) = doc.non_empty_attribute(top, mets::ATTR_ID)
            {
                sequence.roots.push(id.to_string());
            }
        }

        for div in doc.select(map, ".//mets:div")? {
            if let Some(id) = doc.non_empty_attribute(div, mets::ATTR_ID) {
                sequence.containers.insert(id.to_string());
            }
            for fptr in doc.select(div, mets::FILE_POINTERS)? {
                let Some(file_id) = doc.non_empty_attribute(fptr, mets::ATTR_FILEID) else {
                    continue;
                };
                // Containers above the page level may point at the same file;
                // the innermost div claims it.
                owners.insert(file_id.to_string(), div);
                pointers.entry(div).or_default().push(file_id.to_string());
            }
        }
    }

    let others = companion_files(doc, image_group, ocr_group)?;

    for (i, image) in images.into_iter().enumerate() {
        let order = i as u32 + 1;
        let owner = owners.get(&image.id).copied();

        let mut page = PhysicalPage {
            order,
            physical_id: None,
            label: None,
            content_ids: None,
            files: Vec::new(),
        };

        match owner {
            Some(div) => {
                page.physical_id = doc.non_empty_attribute(div, mets::ATTR_ID).map(String::from);
                page.label = doc
                    .non_empty_attribute(div, mets::ATTR_ORDER_LABEL)
                    .or_else(|| doc.non_empty_attribute(div, mets::ATTR_LABEL))
                    .map(String::from);
                page.content_ids = doc
                    .non_empty_attribute(div, mets::ATTR_CONTENTIDS)
                    .map(String::from);

                if let Some(physical_id) = &page.physical_id {
                    sequence.orders.entry(physical_id.clone()).or_insert(order);
                }

                let mut attached: Vec<&(usize, FileRef)> = pointers
                    .get(&div)
                    .into_iter()
                    .flatten()
                    .filter_map(|file_id| others.get(file_id))
                    .collect();
                attached.sort_by_key(|(rank, _)| *rank);
                page.files.push(image);
                page.files.extend(attached.into_iter().map(|(_, file)| file.clone()));
            }
            None => {
                tracing::debug!(
                    document = doc.source(),
                    file = image.id.as_str(),
                    order,
                    "paging file not referenced by any physical div"
                );
                page.files.push(image);
            }
        }

        sequence.pages.push(page);
    }

    tracing::debug!(
        document = doc.source(),
        group = image_group,
        pages = sequence.pages.len(),
        "built page sequence"
    );
    Ok(sequence)
}

/// Files of all groups but the paging group, keyed by id and ranked by the
/// position their group takes among a page's files.
fn companion_files(
    doc: &dyn DocumentQuery,
    image_group: &str,
    ocr_group: Option<&str>,
) -> Result<HashMap<String, (usize, FileRef)>> {
    let mut groups: Vec<String> = doc
        .group_names()?
        .into_iter()
        .filter(|group| group != image_group)
        .collect();
    if let Some(ocr) = ocr_group
        && let Some(pos) = groups.iter().position(|group| group == ocr)
    {
        let ocr = groups.remove(pos);
        groups.insert(0, ocr);
    }

    let mut files = HashMap::new();
    for (rank, group) in groups.iter().enumerate() {
        for file in doc.files(group)? {
            files.entry(file.id.clone()).or_insert((rank, file));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    const DOC: &str = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
<mets:fileSec>
  <mets:fileGrp USE="DEFAULT">
    <mets:file ID="d1" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://x/default/1.jpg"/></mets:file>
  </mets:fileGrp>
  <mets:fileGrp USE="MAX">
    <mets:file ID="m2" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://x/max/2.jpg"/></mets:file>
    <mets:file ID="m1" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://x/max/1.jpg"/></mets:file>
  </mets:fileGrp>
  <mets:fileGrp USE="FULLTEXT">
    <mets:file ID="o1" MIMETYPE="application/alto+xml"><mets:FLocat LOCTYPE="URL" xlink:href="http://x/ocr/1.xml"/></mets:file>
  </mets:fileGrp>
</mets:fileSec>
<mets:structMap TYPE="PHYSICAL">
  <mets:div ID="physroot" TYPE="physSequence">
    <mets:div ID="phys1" ORDER="1" ORDERLABEL="[Seite 1]" CONTENTIDS="urn:nbn:de:1-p1" TYPE="page">
      <mets:fptr FILEID="d1"/><mets:fptr FILEID="m1"/><mets:fptr FILEID="o1"/>
    </mets:div>
    <mets:div ID="phys2" ORDER="2" LABEL="Titel" TYPE="page"><mets:fptr FILEID="m2"/></mets:div>
    <mets:div ID="phys3" ORDER="3" TYPE="page"/>
  </mets:div>
</mets:structMap>
</mets:mets>"#;

    fn sequence() -> PageSequence {
        let doc = XmlDocument::parse(DOC, "pages.xml").unwrap();
        build_pages(&doc, "MAX", Some("FULLTEXT")).unwrap()
    }

    #[test]
    fn test_order_follows_file_group() {
        let seq = sequence();
        let ids: Vec<_> = seq
            .pages()
            .iter()
            .map(|p| (p.order, p.physical_id.as_deref().unwrap()))
            .collect();
        assert_eq!(ids, vec![(1, "phys2"), (2, "phys1")]);
        assert_eq!(seq.order_of("phys1"), Some(2));
        assert_eq!(seq.order_of("phys3"), None);
        assert!(seq.contains("phys3"));
        assert!(!seq.contains("phys9"));
        assert!(seq.is_sequence_root("physroot"));
    }

    #[test]
    fn test_labels_and_companion_files() {
        let seq = sequence();
        let page = &seq.pages()[1];
        assert_eq!(page.label.as_deref(), Some("[Seite 1]"));
        assert_eq!(page.content_ids.as_deref(), Some("urn:nbn:de:1-p1"));
        let groups: Vec<_> = page.files.iter().map(|f| f.group.as_str()).collect();
        assert_eq!(groups, vec!["MAX", "FULLTEXT", "DEFAULT"]);
        assert_eq!(page.image().unwrap().local_name(), "1.jpg");

        assert_eq!(seq.pages()[0].label.as_deref(), Some("Titel"));
    }

    #[test]
    fn test_missing_group() {
        let doc = XmlDocument::parse(DOC, "pages.xml").unwrap();
        assert!(matches!(
            build_pages(&doc, "PRESENTATION", None),
            Err(Error::MissingFileGroup { group, .. }) if group == "PRESENTATION"
        ));
    }
}
