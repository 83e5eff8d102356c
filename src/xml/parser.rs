//! Build an [`XmlDocument`] from quick-xml events.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Element, XmlAttribute, XmlDocument, XmlNodeKind};
use crate::error::{Error, Result};
use crate::query::NodeRef;

/// Namespace bindings introduced by one element: (prefix, uri), "" = default.
type Scope = Vec<(String, String)>;

pub(super) fn parse(text: &str, source: String) -> Result<XmlDocument> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut doc = XmlDocument::with_source(source);
    let mut open: Vec<NodeRef> = vec![NodeRef(0)];
    let mut scopes: Vec<Scope> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| Error::Xml {
            document: doc.source.clone(),
            message: format!("{e} at byte {}", reader.error_position()),
        })?;

        match event {
            Event::Start(e) => {
                let (element, scope) = element_from(&e, &scopes);
                scopes.push(scope);
                let parent = current(&open);
                let id = doc.alloc(XmlNodeKind::Element(element), parent);
                open.push(id);
            }
            Event::Empty(e) => {
                let (element, _scope) = element_from(&e, &scopes);
                let parent = current(&open);
                doc.alloc(XmlNodeKind::Element(element), parent);
            }
            Event::End(_) => {
                scopes.pop();
                if open.len() > 1 {
                    open.pop();
                }
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut doc, current(&open), &raw);
            }
            Event::CData(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut doc, current(&open), &raw);
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    doc.append_text(current(&open), &resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if open.len() > 1 {
        return Err(Error::Xml {
            document: doc.source.clone(),
            message: format!("{} unclosed element(s) at end of input", open.len() - 1),
        });
    }
    if doc.root_element().is_none() {
        return Err(Error::Xml {
            document: doc.source.clone(),
            message: "no root element".to_string(),
        });
    }

    Ok(doc)
}

fn current(open: &[NodeRef]) -> NodeRef {
    open.last().copied().unwrap_or(NodeRef(0))
}

/// Whitespace-only runs are formatting between elements and are dropped,
/// unless they continue text already started (e.g. between two entities).
fn push_text(doc: &mut XmlDocument, parent: NodeRef, text: &str) {
    if text.trim().is_empty() {
        let continues_text = doc
            .node(parent)
            .and_then(|node| node.children.last())
            .and_then(|&last| doc.node(last))
            .is_some_and(|node| matches!(node.kind, XmlNodeKind::Text(_)));
        if !continues_text {
            return;
        }
    }
    doc.append_text(parent, text);
}

/// Convert a start tag into an element, resolving namespaces against the
/// enclosing scopes plus the declarations on the tag itself.
fn element_from(start: &BytesStart, scopes: &[Scope]) -> (Element, Scope) {
    let mut scope = Scope::new();
    let mut raw_attrs: Vec<(String, String)> = Vec::new();

    for attr in start.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(attr.value.as_ref());
        let value = quick_xml::escape::unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.clone().into_owned());

        if key == "xmlns" {
            scope.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((prefix.to_string(), value));
        } else {
            raw_attrs.push((key, value));
        }
    }

    let lookup = |prefix: &str| -> Option<String> {
        scope
            .iter()
            .rev()
            .chain(scopes.iter().rev().flat_map(|s| s.iter().rev()))
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    };

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let (namespace, local) = match name.split_once(':') {
        Some((prefix, local)) => (lookup(prefix), local.to_string()),
        None => (lookup(""), name.clone()),
    };

    let attributes = raw_attrs
        .into_iter()
        .map(|(name, value)| {
            let (namespace, local) = match name.split_once(':') {
                Some(("xml", local)) => (
                    Some("http://www.w3.org/XML/1998/namespace".to_string()),
                    local.to_string(),
                ),
                Some((prefix, local)) => (lookup(prefix), local.to_string()),
                None => (None, name.clone()),
            };
            XmlAttribute {
                namespace,
                name,
                local,
                value,
            }
        })
        .collect();

    (
        Element {
            namespace,
            name,
            local,
            attributes,
        },
        scope,
    )
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
