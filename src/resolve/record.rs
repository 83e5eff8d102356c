//! Flattening the primary descriptive section into a [`BibliographicRecord`].

use crate::error::{Error, Result};
use crate::mets;
use crate::model::{BibliographicRecord, StructureType, or_unknown};
use crate::query::{DocumentQuery, NodeRef};

/// MARC relator codes the person rule distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relator {
    Author,
    Publisher,
    AssignedName,
    Contributor,
    Printer,
    Other,
}

impl Relator {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "aut" => Some(Self::Author),
            "pbl" => Some(Self::Publisher),
            "asn" => Some(Self::AssignedName),
            "ctb" => Some(Self::Contributor),
            "prt" => Some(Self::Printer),
            "oth" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Author => "aut",
            Self::Publisher => "pbl",
            Self::AssignedName => "asn",
            Self::Contributor => "ctb",
            Self::Printer => "prt",
            Self::Other => "oth",
        }
    }
}

/// Roles that may name the record's person, most preferred first.
const PERSON_ROLES: [Relator; 2] = [Relator::Author, Relator::Publisher];

const LICENSE_TYPE: &str = "use and reproduction";

/// Build the record for descriptive section `section`.
///
/// With `identifier_expression` set, the identifier is taken from that
/// expression instead of the section's source-tagged identifier.
pub fn build_record(
    doc: &dyn DocumentQuery,
    section: &str,
    identifier_expression: Option<&str>,
) -> Result<BibliographicRecord> {
    let dmd = doc
        .element_by_id(section)
        .filter(|&node| doc.local_name(node) == Some("dmdSec"))
        .ok_or_else(|| Error::UnknownDescriptiveSection {
            document: doc.source().to_string(),
            section: section.to_string(),
        })?;

    let Some(mods) = doc.select_first(dmd, mets::MODS)? else {
        // A section without a MODS record has nothing but the identifier rule
        // to fail on.
        return match identifier_expression {
            Some(expr) => Ok(BibliographicRecord::default()
                .with_identifier(evaluate_identifier_expression(doc, expr)?)),
            None => Err(Error::NoRecordIdentifier {
                document: doc.source().to_string(),
                section: section.to_string(),
            }),
        };
    };

    let identifier = match identifier_expression {
        Some(expr) => evaluate_identifier_expression(doc, expr)?,
        None => source_identifier(doc, mods)?.ok_or_else(|| Error::NoRecordIdentifier {
            document: doc.source().to_string(),
            section: section.to_string(),
        })?,
    };

    Ok(BibliographicRecord {
        title: or_unknown(title(doc, mods)?),
        identifier,
        person: or_unknown(person(doc, mods)?),
        year: or_unknown(year(doc, mods)?),
        urn: or_unknown(first_text(doc, mods, "mods:identifier[@type='urn']")?),
        license: or_unknown(license(doc, mods)?),
    })
}

/// Evaluate a caller-supplied identifier expression against the whole
/// document. The first match must carry non-blank text.
pub fn evaluate_identifier_expression(doc: &dyn DocumentQuery, expr: &str) -> Result<String> {
    let Some(node) = doc.select_first(doc.root(), expr)? else {
        return Err(Error::IdentifierExpressionNoMatch {
            document: doc.source().to_string(),
            expression: expr.to_string(),
        });
    };

    let value = doc.text(node).trim().to_string();
    if value.is_empty() {
        return Err(Error::IdentifierExpressionEmpty {
            document: doc.source().to_string(),
            expression: expr.to_string(),
        });
    }
    Ok(value)
}

/// Trimmed text of the first match with non-blank content.
fn first_text(doc: &dyn DocumentQuery, context: NodeRef, expr: &str) -> Result<Option<String>> {
    Ok(doc
        .select(context, expr)?
        .into_iter()
        .map(|node| doc.text(node).trim().to_string())
        .find(|text| !text.is_empty()))
}

fn title(doc: &dyn DocumentQuery, mods: NodeRef) -> Result<Option<String>> {
    if let Some(title) = first_text(doc, mods, "mods:titleInfo/mods:title")? {
        return Ok(Some(title));
    }

    // Volumes of a multivolume work often carry no title of their own.
    let Some(host) = doc.select_first(mods, "mods:relatedItem[@type='host']")? else {
        return Ok(None);
    };
    let volume = StructureType::Volume.label();
    Ok(Some(
        match first_text(doc, mods, "mods:part/mods:detail/mods:number")? {
            Some(number) => format!("{volume} {number}"),
            None => {
                tracing::debug!(
                    document = doc.source(),
                    host = doc.attribute(host, "xlink:href").unwrap_or_default(),
                    "untitled volume, using generic label"
                );
                volume.to_string()
            }
        },
    ))
}

fn source_identifier(doc: &dyn DocumentQuery, mods: NodeRef) -> Result<Option<String>> {
    // Only the section's own entries: a host `relatedItem` carries the
    // identifier of the parent record.
    for expr in [
        "mods:recordInfo/mods:recordIdentifier[@source]",
        "mods:identifier[@source]",
    ] {
        if let Some(id) = first_text(doc, mods, expr)? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

fn person(doc: &dyn DocumentQuery, mods: NodeRef) -> Result<Option<String>> {
    let mut named: Vec<(Relator, NodeRef)> = Vec::new();
    for name in doc.select(mods, "mods:name")? {
        for term in doc.select(name, "mods:role/mods:roleTerm")? {
            if let Some(relator) = Relator::from_code(&doc.text(term)) {
                named.push((relator, name));
            }
        }
    }

    for role in PERSON_ROLES {
        let names: Vec<NodeRef> = named
            .iter()
            .filter(|(relator, _)| *relator == role)
            .map(|&(_, name)| name)
            .collect();
        if names.is_empty() {
            continue;
        }

        for expr in ["mods:displayForm", "mods:namePart[@type='family']"] {
            for &name in &names {
                if let Some(text) = first_text(doc, name, expr)? {
                    return Ok(Some(text));
                }
            }
        }
    }
    Ok(None)
}

fn year(doc: &dyn DocumentQuery, mods: NodeRef) -> Result<Option<String>> {
    for origin in [
        "mods:originInfo[@eventType='publication']",
        "mods:originInfo[not(@eventType)]",
    ] {
        for info in doc.select(mods, origin)? {
            for date in ["mods:dateIssued", "mods:dateCreated"] {
                if let Some(year) = first_text(doc, info, date)? {
                    return Ok(Some(year));
                }
            }
        }
    }
    Ok(None)
}

fn license(doc: &dyn DocumentQuery, mods: NodeRef) -> Result<Option<String>> {
    let typed = format!("mods:accessCondition[@type='{LICENSE_TYPE}']");
    match first_text(doc, mods, &typed)? {
        Some(text) => Ok(Some(text)),
        None => first_text(doc, mods, "mods:accessCondition"),
    }
}
