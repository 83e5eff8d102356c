//! A small XPath subset for querying METS documents.
//!
//! Supported forms:
//!
//! - absolute `/mets:mets/mets:structMap`, descendant `//mets:div`
//! - relative `mets:div`, `./mets:div`, `.//mods:name`, `*`
//! - predicates `[@TYPE]`, `[@TYPE='LOGICAL']`, `[@TYPE!='page']`,
//!   `[not(@eventType)]` and positions `[1]`
//!
//! Prefixed name tests match on the namespace bound to the prefix (see
//! [`KNOWN_NAMESPACES`](super::KNOWN_NAMESPACES)); unprefixed tests match the
//! local name in any namespace.

use super::{XmlDocument, namespace_for_prefix};
use crate::error::{Error, Result};
use crate::query::{DocumentQuery, NodeRef};

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name {
        namespace: Option<&'static str>,
        local: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Has(String),
    Lacks(String),
    Equals(String, String),
    NotEquals(String, String),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}

impl PathExpr {
    /// Compile an expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidExpression {
            expression: expr.to_string(),
            message: message.to_string(),
        };

        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty expression"));
        }

        let (absolute, first_axis, rest) = if let Some(rest) = trimmed.strip_prefix("//") {
            (true, Axis::Descendant, rest)
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            (true, Axis::Child, rest)
        } else if let Some(rest) = trimmed.strip_prefix(".//") {
            (false, Axis::Descendant, rest)
        } else if let Some(rest) = trimmed.strip_prefix("./") {
            (false, Axis::Child, rest)
        } else {
            (false, Axis::Child, trimmed)
        };

        let mut steps = Vec::new();
        let mut axis = first_axis;
        for (segment, next_axis) in split_steps(rest).map_err(|m| invalid(m))? {
            steps.push(parse_step(axis, segment).map_err(|m| invalid(&m))?);
            axis = next_axis;
        }
        if steps.is_empty() {
            return Err(invalid("no location steps"));
        }

        Ok(Self { absolute, steps })
    }

    /// Evaluate against a document, relative to `context` unless absolute.
    pub fn evaluate(&self, doc: &XmlDocument, context: NodeRef) -> Vec<NodeRef> {
        let mut current = vec![if self.absolute { doc.root() } else { context }];

        for step in &self.steps {
            let mut next = Vec::new();
            for &node in &current {
                let candidates = match step.axis {
                    Axis::Child => doc.children(node),
                    Axis::Descendant => doc.descendants(node),
                };
                let mut matched: Vec<NodeRef> = candidates
                    .into_iter()
                    .filter(|&candidate| step.test.matches(doc, candidate))
                    .collect();
                for predicate in &step.predicates {
                    matched = predicate.filter(doc, matched);
                }
                next.extend(matched);
            }
            next.sort_unstable();
            next.dedup();
            current = next;
            if current.is_empty() {
                break;
            }
        }

        current
    }
}

impl NameTest {
    fn matches(&self, doc: &XmlDocument, node: NodeRef) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        match self {
            NameTest::Any => true,
            NameTest::Name { namespace, local } => {
                element.local == *local
                    && namespace.is_none_or(|uri| element.namespace.as_deref() == Some(uri))
            }
        }
    }
}

impl Predicate {
    fn filter(&self, doc: &XmlDocument, nodes: Vec<NodeRef>) -> Vec<NodeRef> {
        match self {
            Predicate::Position(pos) => nodes.into_iter().skip(pos - 1).take(1).collect(),
            Predicate::Has(attr) => nodes
                .into_iter()
                .filter(|&n| doc.attribute(n, attr).is_some())
                .collect(),
            Predicate::Lacks(attr) => nodes
                .into_iter()
                .filter(|&n| doc.attribute(n, attr).is_none())
                .collect(),
            Predicate::Equals(attr, value) => nodes
                .into_iter()
                .filter(|&n| doc.attribute(n, attr) == Some(value.as_str()))
                .collect(),
            Predicate::NotEquals(attr, value) => nodes
                .into_iter()
                .filter(|&n| doc.attribute(n, attr).is_some_and(|v| v != value))
                .collect(),
        }
    }
}

/// Split the step list on `/` and `//` outside of brackets and quotes.
///
/// Each segment is paired with the axis of the step that follows it.
fn split_steps(input: &str) -> std::result::Result<Vec<(&str, Axis)>, &'static str> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'\'' | b'"') => quote = Some(b),
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.checked_sub(1).ok_or("unbalanced ']'")?,
            (None, b'/') if depth == 0 => {
                let (axis, width) = if bytes.get(i + 1) == Some(&b'/') {
                    (Axis::Descendant, 2)
                } else {
                    (Axis::Child, 1)
                };
                out.push((&input[start..i], axis));
                i += width;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if quote.is_some() {
        return Err("unterminated string literal");
    }
    if depth != 0 {
        return Err("unbalanced '['");
    }
    out.push((&input[start..], Axis::Child));
    Ok(out)
}

fn parse_step(axis: Axis, segment: &str) -> std::result::Result<Step, String> {
    let segment = segment.trim();
    let name_end = segment.find('[').unwrap_or(segment.len());
    let name = segment[..name_end].trim();
    if name.is_empty() {
        return Err("empty location step".to_string());
    }

    let test = if name == "*" {
        NameTest::Any
    } else {
        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ':' | '_' | '-' | '.'))
        {
            return Err(format!("invalid name test '{name}'"));
        }
        match name.split_once(':') {
            Some((prefix, local)) => NameTest::Name {
                namespace: Some(
                    namespace_for_prefix(prefix)
                        .ok_or_else(|| format!("unknown namespace prefix '{prefix}'"))?,
                ),
                local: local.to_string(),
            },
            None => NameTest::Name {
                namespace: None,
                local: name.to_string(),
            },
        }
    };

    let mut predicates = Vec::new();
    let mut rest = &segment[name_end..];
    while !rest.is_empty() {
        let body_end = closing_bracket(rest).ok_or("unbalanced '['")?;
        predicates.push(parse_predicate(rest[1..body_end].trim())?);
        rest = rest[body_end + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(format!("unexpected '{rest}' after predicate"));
        }
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

/// Index of the `]` closing the `[` at the start of `s`.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(body: &str) -> std::result::Result<Predicate, String> {
    if let Ok(pos) = body.parse::<usize>() {
        if pos == 0 {
            return Err("positions are 1-based".to_string());
        }
        return Ok(Predicate::Position(pos));
    }

    if let Some(inner) = body
        .strip_prefix("not(")
        .and_then(|s| s.strip_suffix(')'))
    {
        let attr = attribute_name(inner.trim())?;
        return Ok(Predicate::Lacks(attr));
    }

    if let Some((lhs, rhs)) = body.split_once("!=") {
        return Ok(Predicate::NotEquals(
            attribute_name(lhs.trim())?,
            string_literal(rhs.trim())?,
        ));
    }
    if let Some((lhs, rhs)) = body.split_once('=') {
        return Ok(Predicate::Equals(
            attribute_name(lhs.trim())?,
            string_literal(rhs.trim())?,
        ));
    }

    Ok(Predicate::Has(attribute_name(body)?))
}

fn attribute_name(s: &str) -> std::result::Result<String, String> {
    let name = s
        .strip_prefix('@')
        .ok_or_else(|| format!("expected attribute reference, found '{s}'"))?;
    if name.is_empty() {
        return Err("empty attribute name".to_string());
    }
    if let Some((prefix, _)) = name.split_once(':')
        && namespace_for_prefix(prefix).is_none()
    {
        return Err(format!("unknown namespace prefix '{prefix}'"));
    }
    Ok(name.to_string())
}

fn string_literal(s: &str) -> std::result::Result<String, String> {
    let quoted = (s.starts_with('\'') && s.ends_with('\''))
        || (s.starts_with('"') && s.ends_with('"'));
    if s.len() < 2 || !quoted {
        return Err(format!("expected quoted string, found '{s}'"));
    }
    Ok(s[1..s.len() - 1].to_string())
}
