//! Index over the structure links (`mets:smLink`).

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::mets;
use crate::query::DocumentQuery;

/// Structure links keyed both ways, each list in document order.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    targets: HashMap<String, Vec<String>>,
    sources: HashMap<String, Vec<String>>,
}

impl LinkIndex {
    /// Read all structure links. Repeated identical links are kept once.
    pub fn build(doc: &dyn DocumentQuery) -> Result<Self> {
        let mut index = LinkIndex::default();
        let mut seen = HashSet::new();

        for link in doc.select_all(mets::STRUCT_LINKS)? {
            let (Some(from), Some(to)) = (
                doc.non_empty_attribute(link, mets::ATTR_LINK_FROM),
                doc.non_empty_attribute(link, mets::ATTR_LINK_TO),
            ) else {
                tracing::debug!(document = doc.source(), "skipping structure link without endpoints");
                continue;
            };
            if !seen.insert((from.to_string(), to.to_string())) {
                continue;
            }
            index.add(from, to);
        }

        Ok(index)
    }

    pub fn add(&mut self, from: &str, to: &str) {
        self.targets
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.sources
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
    }

    /// Physical ids a logical node links to.
    pub fn targets(&self, logical_id: &str) -> &[String] {
        self.targets.get(logical_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Logical ids linking to a physical container.
    pub fn sources(&self, physical_id: &str) -> &[String] {
        self.sources.get(physical_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    #[test]
    fn test_build_keeps_order_and_drops_repeats() {
        let xml = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:structLink>
    <mets:smLink xlink:from="log1" xlink:to="phys2"/>
    <mets:smLink xlink:from="log1" xlink:to="phys1"/>
    <mets:smLink xlink:from="log1" xlink:to="phys2"/>
    <mets:smLink xlink:from="log2" xlink:to="phys1"/>
    <mets:smLink xlink:from="log3"/>
  </mets:structLink>
</mets:mets>"#;
        let doc = XmlDocument::parse(xml, "links.xml").unwrap();
        let index = LinkIndex::build(&doc).unwrap();

        assert_eq!(index.targets("log1"), &["phys2", "phys1"]);
        assert_eq!(index.sources("phys1"), &["log1", "log2"]);
        assert!(index.targets("log3").is_empty());
        assert!(index.targets("missing").is_empty());
    }
}
