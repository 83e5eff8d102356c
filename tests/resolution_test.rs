//! End-to-end resolution of the METS fixtures.
//!
//! The fixtures follow the shape of exports from DFG viewer compatible
//! repositories: one monograph, a volume of a multivolume work, a newspaper
//! issue and a few documents with known encoding defects.

use mets_outline::{
    CleanReport, Error, NodeKind, OutlineTree, Resolver, ResolverConfig, UNKNOWN, XmlDocument,
    resolve_path,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn open(name: &str) -> XmlDocument {
    XmlDocument::open(fixture_path(name)).expect("Failed to load fixture")
}

/// (label, start page, depth) of every outline entry in pre-order.
fn outline(tree: &OutlineTree) -> Vec<(String, u32, usize)> {
    tree.walk()
        .into_iter()
        .map(|(index, depth)| {
            let node = tree.node(index).unwrap();
            (node.label.clone(), node.start_page, depth)
        })
        .collect()
}

fn entry(label: &str, page: u32, depth: usize) -> (String, u32, usize) {
    (label.to_string(), page, depth)
}

// ============================================================================
// Monograph
// ============================================================================

#[test]
fn test_monograph_record() {
    let resolution = resolve_path(fixture_path("monograph.xml"), ResolverConfig::default())
        .expect("Failed to resolve monograph");
    let record = &resolution.record;

    assert_eq!(
        record.title,
        "Hodegeticum Brevibus Aphorismis Olim Pro Collegio Concinnatum"
    );
    assert_eq!(record.identifier, "191092622");
    assert_eq!(record.person, "Baumgarten, Siegmund Jacob");
    assert_eq!(record.year, "1740");
    assert_eq!(record.urn, "urn:nbn:de:gbv:3:1-635986");
    assert_eq!(record.license, "Public Domain Mark 1.0");
}

#[test]
fn test_monograph_outline() {
    let resolution = resolve_path(fixture_path("monograph.xml"), ResolverConfig::default())
        .expect("Failed to resolve monograph");

    assert_eq!(
        outline(&resolution.outline),
        vec![
            entry("Monographie", 1, 0),
            entry("Titelblatt", 1, 1),
            entry("Kapitel", 2, 1),
            entry("Caput II. De Methodo", 3, 1),
            entry("4", 4, 2),
        ]
    );
    assert_eq!(resolution.report, CleanReport::default());

    let entries = resolution.outline.to_entries();
    let leaf = &entries.children[2].children[0];
    assert_eq!(leaf.id, "phys4");
    assert_eq!(leaf.kind, NodeKind::Page);
    assert_eq!(leaf.type_code, "page");
}

#[test]
fn test_monograph_pages() {
    let resolution = resolve_path(fixture_path("monograph.xml"), ResolverConfig::default())
        .expect("Failed to resolve monograph");
    let pages = &resolution.pages;

    assert_eq!(pages.len(), 4);
    let first = &pages[0];
    assert_eq!(first.physical_id.as_deref(), Some("phys1"));
    assert_eq!(first.label.as_deref(), Some("[Seite 1]"));
    assert_eq!(
        first.content_ids.as_deref(),
        Some("urn:nbn:de:gbv:3:1-635986-p0001-0")
    );

    let groups: Vec<_> = first.files.iter().map(|f| f.group.as_str()).collect();
    assert_eq!(groups, vec!["MAX", "FULLTEXT", "DEFAULT"]);
    assert_eq!(first.image().unwrap().local_name(), "1001");
    assert_eq!(
        first.file("FULLTEXT").unwrap().mimetype.as_deref(),
        Some("text/xml")
    );
}

#[test]
fn test_monograph_without_ocr_group() {
    let config = ResolverConfig::default().without_ocr_group();
    let resolution =
        resolve_path(fixture_path("monograph.xml"), config).expect("Failed to resolve monograph");

    // Other groups are still attached, in file section order.
    let groups: Vec<_> = resolution.pages[0]
        .files
        .iter()
        .map(|f| f.group.as_str())
        .collect();
    assert_eq!(groups, vec!["MAX", "DEFAULT", "FULLTEXT"]);
}

#[test]
fn test_monograph_identifier_override() {
    let doc = open("monograph.xml");
    let mut resolver = Resolver::new(&doc, ResolverConfig::default());
    assert_eq!(resolver.record().unwrap().identifier, "191092622");

    let record = resolver
        .override_identifier("//mods:identifier[@type='vd18']")
        .unwrap();
    assert_eq!(record.identifier, "11249366");
    assert_eq!(record.year, "1740");

    let config =
        ResolverConfig::default().with_identifier_expression("//mods:identifier[@type='vd17']");
    let err = Resolver::new(&doc, config).resolve().unwrap_err();
    assert!(matches!(err, Error::IdentifierExpressionNoMatch { .. }));
    assert!(err.to_string().contains("monograph.xml"));
}

// ============================================================================
// Multivolume work
// ============================================================================

#[test]
fn test_volume_below_anchor() {
    let doc = open("volume.xml");
    let resolver = Resolver::new(&doc, ResolverConfig::default());

    assert_eq!(resolver.primary_section().unwrap(), "dmd1");
    let resolution = resolver.resolve().unwrap();

    let record = &resolution.record;
    assert_eq!(record.title, "Band 2");
    assert_eq!(record.identifier, "100000002");
    assert_eq!(record.person, "Gebauer");
    assert_eq!(record.year, "1755");
    assert_eq!(record.urn, UNKNOWN);
    assert_eq!(record.license, UNKNOWN);

    assert_eq!(
        outline(&resolution.outline),
        vec![
            entry("Band", 1, 0),
            entry("Vorrede an den Leser", 1, 1),
            entry("Register", 3, 1),
        ]
    );
    assert_eq!(resolution.outline.node(resolution.outline.root()).unwrap().id, "log1");
}

// ============================================================================
// Newspaper
// ============================================================================

#[test]
fn test_newspaper_containers_default_to_first_page() {
    let doc = open("newspaper.xml");
    let resolver = Resolver::new(&doc, ResolverConfig::default());

    // Located through the link to the physical sequence root.
    assert_eq!(resolver.primary_section().unwrap(), "md1");

    let resolution = resolver.resolve().unwrap();
    assert_eq!(resolution.record.identifier, "1848-03-04-issue-9");
    assert_eq!(resolution.record.year, "1848-03-04");
    assert_eq!(
        outline(&resolution.outline),
        vec![
            entry("Hallisches patriotisches Wochenblatt", 1, 0),
            entry("1848", 1, 1),
            entry("März", 1, 2),
            entry("4.", 1, 3),
            entry("Ausgabe", 1, 4),
            entry("Amtliche Bekanntmachung", 1, 5),
            entry("Nachrichten aus Frankreich", 2, 5),
            entry("Werbung", 3, 5),
        ]
    );

    let groups: Vec<_> = resolution.pages[0]
        .files
        .iter()
        .map(|f| f.group.as_str())
        .collect();
    assert_eq!(groups, vec!["MAX", "FULLTEXT"]);
    assert_eq!(resolution.pages[1].files.len(), 1);
}

// ============================================================================
// Encoding defects
// ============================================================================

#[test]
fn test_duplicate_link_keeps_deepest_occurrence() {
    let resolution = resolve_path(fixture_path("duplicates.xml"), ResolverConfig::default())
        .expect("Failed to resolve duplicates");

    assert_eq!(
        resolution.report,
        CleanReport {
            invalid: 1,
            duplicates: 1
        }
    );
    assert_eq!(
        outline(&resolution.outline),
        vec![
            entry("Monographie", 1, 0),
            entry("Erster Teil", 2, 1),
            entry("Vorrede", 2, 2),
            entry("Caput I", 3, 3),
            entry("Caput II", 4, 1),
        ]
    );

    // Page 3 appears once, at depth 3.
    let on_page_3: Vec<_> = outline(&resolution.outline)
        .into_iter()
        .filter(|(_, page, _)| *page == 3)
        .collect();
    assert_eq!(on_page_3, vec![entry("Caput I", 3, 3)]);
}

#[test]
fn test_tied_parent_and_child_picks_parent() {
    let doc = open("tied.xml");
    let resolver = Resolver::new(&doc, ResolverConfig::default());

    assert_eq!(resolver.primary_section().unwrap(), "dmd_work");
    let record = resolver.record().unwrap();
    assert_eq!(record.title, "Sammlung erbaulicher Schriften");
    assert_eq!(record.identifier, "300000001");
}

#[test]
fn test_identifier_without_source() {
    let err = resolve_path(fixture_path("no_source.xml"), ResolverConfig::default()).unwrap_err();
    match err {
        Error::NoRecordIdentifier { document, section } => {
            assert!(document.ends_with("no_source.xml"));
            assert_eq!(section, "dmd1");
        }
        other => panic!("expected NoRecordIdentifier, got {other}"),
    }
}

#[test]
fn test_identifier_without_source_can_be_overridden() {
    let config = ResolverConfig::default()
        .with_identifier_expression("//mods:recordInfo/mods:recordIdentifier");
    let resolution = resolve_path(fixture_path("no_source.xml"), config).unwrap();
    assert_eq!(resolution.record.identifier, "400000001");
}

#[test]
fn test_missing_paging_group() {
    let config = ResolverConfig::default().with_image_group("PRESENTATION");
    let err = resolve_path(fixture_path("monograph.xml"), config).unwrap_err();
    assert!(matches!(err, Error::MissingFileGroup { ref group, .. } if group == "PRESENTATION"));
}

#[test]
fn test_outline_without_record() {
    // The outline does not depend on the record being resolvable.
    let doc = open("no_source.xml");
    let resolver = Resolver::new(&doc, ResolverConfig::default());
    let pages = resolver.pages().unwrap();
    let (tree, report) = resolver.outline(&pages).unwrap();
    assert_eq!(outline(&tree), vec![entry("Monographie", 1, 0)]);
    assert_eq!(report.dropped(), 0);
}
