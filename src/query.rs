//! Collaborator interfaces the resolver is written against.
//!
//! The resolver never touches markup. It asks a [`DocumentQuery`] for nodes
//! matching path expressions and reads attributes and text from them, and it
//! asks a [`FileGroupListing`] for the files of a named file group.
//! [`XmlDocument`](crate::xml::XmlDocument) implements both.

use crate::error::Result;
use crate::mets;
use crate::model::FileRef;

/// Opaque handle to a node of a queryable document.
///
/// Handles compare in document order: a node that starts earlier in the
/// source has a smaller handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub u32);

/// Structural path queries over an already-parsed document.
pub trait DocumentQuery {
    /// Label of the document used in error messages (usually its path).
    fn source(&self) -> &str;

    /// The document node (parent of the root element).
    fn root(&self) -> NodeRef;

    /// Evaluate a path expression relative to `context`.
    ///
    /// Absolute expressions (`/a`, `//a`) ignore the context. Results are in
    /// document order without duplicates.
    fn select(&self, context: NodeRef, expr: &str) -> Result<Vec<NodeRef>>;

    /// Attribute value by (optionally prefixed) name, e.g. `ID` or `xlink:href`.
    fn attribute(&self, node: NodeRef, name: &str) -> Option<&str>;

    /// Concatenated descendant text of a node.
    fn text(&self, node: NodeRef) -> String;

    /// Element children in document order.
    fn children(&self, node: NodeRef) -> Vec<NodeRef>;

    fn parent(&self, node: NodeRef) -> Option<NodeRef>;

    /// Local (unprefixed) element name.
    fn local_name(&self, node: NodeRef) -> Option<&str>;

    /// Evaluate a path expression from the document node.
    fn select_all(&self, expr: &str) -> Result<Vec<NodeRef>> {
        self.select(self.root(), expr)
    }

    /// First match of a path expression relative to `context`.
    fn select_first(&self, context: NodeRef, expr: &str) -> Result<Option<NodeRef>> {
        Ok(self.select(context, expr)?.into_iter().next())
    }

    /// Element carrying the given `ID` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        if id.contains('\'') {
            return None;
        }
        self.select_all(&format!("//*[@ID='{id}']"))
            .ok()
            .and_then(|nodes| nodes.into_iter().next())
    }

    /// Trimmed, non-empty attribute value.
    fn non_empty_attribute(&self, node: NodeRef, name: &str) -> Option<&str> {
        self.attribute(node, name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Listing of the files that make up a named file group.
pub trait FileGroupListing {
    /// Files of `group` in document order. Unknown groups yield an empty list.
    fn files(&self, group: &str) -> Result<Vec<FileRef>>;

    /// All file groups declared by the document, in document order.
    fn group_names(&self) -> Result<Vec<String>>;
}

impl<T: DocumentQuery + ?Sized> FileGroupListing for T {
    fn files(&self, group: &str) -> Result<Vec<FileRef>> {
        if group.contains('\'') {
            return Ok(Vec::new());
        }

        let expr = format!("{}[@USE='{group}']/mets:file", mets::FILE_GROUPS);
        let mut files = Vec::new();
        for file in self.select_all(&expr)? {
            let Some(id) = self.non_empty_attribute(file, "ID") else {
                continue;
            };
            let href = self
                .select_first(file, "mets:FLocat")?
                .and_then(|flocat| self.attribute(flocat, "xlink:href"))
                .unwrap_or_default();

            files.push(FileRef {
                id: id.to_string(),
                group: group.to_string(),
                href: href.to_string(),
                mimetype: self.non_empty_attribute(file, "MIMETYPE").map(String::from),
            });
        }
        Ok(files)
    }

    fn group_names(&self) -> Result<Vec<String>> {
        Ok(self
            .select_all(mets::FILE_GROUPS)?
            .into_iter()
            .filter_map(|grp| self.non_empty_attribute(grp, "USE").map(String::from))
            .collect())
    }
}
