//! Arena-based XML DOM for METS documents.
//!
//! All nodes are stored in a contiguous vector in the order they appear in
//! the source, so a node's index doubles as its document position. Parent
//! and child links use indices into this vector.

mod parser;
pub mod path;

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::query::{DocumentQuery, NodeRef};

pub use path::PathExpr;

/// Namespace prefixes understood by path expressions and attribute lookups.
pub const KNOWN_NAMESPACES: &[(&str, &str)] = &[
    ("mets", "http://www.loc.gov/METS/"),
    ("mods", "http://www.loc.gov/mods/v3"),
    ("xlink", "http://www.w3.org/1999/xlink"),
    ("dv", "http://dfg-viewer.de/"),
];

/// Namespace URI for a known prefix.
pub fn namespace_for_prefix(prefix: &str) -> Option<&'static str> {
    KNOWN_NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum XmlNodeKind {
    /// Document node (index 0), parent of the root element.
    Document,
    Element(Element),
    Text(String),
}

/// An element with its resolved namespace.
#[derive(Debug, Clone)]
pub struct Element {
    /// Namespace URI the element's prefix (or default namespace) is bound to.
    pub namespace: Option<String>,
    /// Name as written, e.g. `mets:div`.
    pub name: String,
    /// Name without prefix, e.g. `div`.
    pub local: String,
    pub attributes: Vec<XmlAttribute>,
}

/// An attribute with its resolved namespace.
///
/// Unprefixed attributes are in no namespace, regardless of any default
/// namespace declaration.
#[derive(Debug, Clone)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub name: String,
    pub local: String,
    pub value: String,
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: XmlNodeKind,
    pub parent: Option<NodeRef>,
    pub children: Vec<NodeRef>,
}

impl XmlNode {
    fn new(kind: XmlNodeKind, parent: Option<NodeRef>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
        }
    }

    /// Element payload, if this node is an element.
    pub fn element(&self) -> Option<&Element> {
        match &self.kind {
            XmlNodeKind::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl Element {
    /// Look up an attribute by name.
    ///
    /// `prefix:local` matches on the namespace bound to a known prefix, falling
    /// back to the literal qualified name; a bare name matches attributes in
    /// no namespace.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match name.split_once(':') {
            Some((prefix, local)) => {
                let uri = namespace_for_prefix(prefix);
                self.attributes
                    .iter()
                    .find(|attr| match uri {
                        Some(uri) => attr.namespace.as_deref() == Some(uri) && attr.local == local,
                        None => attr.name == name,
                    })
                    .or_else(|| self.attributes.iter().find(|attr| attr.name == name))
            }
            None => self
                .attributes
                .iter()
                .find(|attr| attr.namespace.is_none() && attr.local == name),
        }
        .map(|attr| attr.value.as_str())
    }
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// All nodes; index 0 is the document node.
    nodes: Vec<XmlNode>,
    /// Label used in error messages.
    source: String,
    /// Map from `ID` attribute to element for fast lookup.
    id_index: HashMap<String, NodeRef>,
}

impl XmlDocument {
    /// Parse a document from text.
    pub fn parse(text: &str, source: impl Into<String>) -> Result<Self> {
        parser::parse(text, source.into())
    }

    /// Parse a document from raw bytes, honouring the XML encoding declaration.
    pub fn from_bytes(bytes: &[u8], source: impl Into<String>) -> Result<Self> {
        let hint_encoding = extract_xml_encoding(bytes);
        let text = decode_text(bytes, hint_encoding);
        Self::parse(&text, source)
    }

    /// Read and parse a document from disk. The path becomes the source label.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, path.display().to_string())
    }

    pub(crate) fn with_source(source: String) -> Self {
        Self {
            nodes: vec![XmlNode::new(XmlNodeKind::Document, None)],
            source,
            id_index: HashMap::new(),
        }
    }

    /// Allocate a node and append it to its parent's child list.
    pub(crate) fn alloc(&mut self, kind: XmlNodeKind, parent: NodeRef) -> NodeRef {
        let id = NodeRef(self.nodes.len() as u32);
        if let XmlNodeKind::Element(element) = &kind
            && let Some(xml_id) = element.attribute("ID")
        {
            self.id_index.entry(xml_id.to_string()).or_insert(id);
        }
        self.nodes.push(XmlNode::new(kind, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(parent.0 as usize) {
            parent_node.children.push(id);
        }
        id
    }

    /// Append text under `parent`, merging with a directly preceding text node.
    pub(crate) fn append_text(&mut self, parent: NodeRef, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self
            .nodes
            .get(parent.0 as usize)
            .and_then(|node| node.children.last().copied());
        if let Some(last) = last
            && let Some(XmlNode {
                kind: XmlNodeKind::Text(existing),
                ..
            }) = self.nodes.get_mut(last.0 as usize)
        {
            existing.push_str(text);
            return;
        }
        self.alloc(XmlNodeKind::Text(text.to_string()), parent);
    }

    /// Get a node by handle.
    pub fn node(&self, id: NodeRef) -> Option<&XmlNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Element payload of a node.
    pub fn element(&self, id: NodeRef) -> Option<&Element> {
        self.node(id).and_then(XmlNode::element)
    }

    /// Number of nodes, including text nodes and the document node.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The root element.
    pub fn root_element(&self) -> Option<NodeRef> {
        self.children(NodeRef(0)).into_iter().next()
    }

    /// All element descendants of `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeRef> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    fn collect_text(&self, id: NodeRef, buf: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            XmlNodeKind::Text(text) => buf.push_str(text),
            _ => {
                for &child in &node.children {
                    self.collect_text(child, buf);
                }
            }
        }
    }
}

impl DocumentQuery for XmlDocument {
    fn source(&self) -> &str {
        &self.source
    }

    fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    fn select(&self, context: NodeRef, expr: &str) -> Result<Vec<NodeRef>> {
        Ok(PathExpr::parse(expr)?.evaluate(self, context))
    }

    fn attribute(&self, node: NodeRef, name: &str) -> Option<&str> {
        self.element(node)?.attribute(name)
    }

    fn text(&self, node: NodeRef) -> String {
        let mut buf = String::new();
        self.collect_text(node, &mut buf);
        buf
    }

    fn children(&self, node: NodeRef) -> Vec<NodeRef> {
        self.node(node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|&child| self.element(child).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node)?.parent
    }

    fn local_name(&self, node: NodeRef) -> Option<&str> {
        self.element(node).map(|element| element.local.as_str())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        self.id_index.get(id).copied()
    }
}

// ----------------------------------------------------------------------------
// Text decoding
// ----------------------------------------------------------------------------

/// Decode bytes to a string.
///
/// Tries UTF-8 first (BOM handled by encoding_rs), then the encoding named in
/// the XML declaration, then Windows-1252 (a superset of ISO-8859-1, which
/// older METS exports commonly declare).
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> std::borrow::Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the `encoding="..."` value from an XML declaration.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}
