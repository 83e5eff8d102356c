//! Benchmarks for METS resolution.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use mets_outline::{Resolver, ResolverConfig, XmlDocument};

const MONOGRAPH: &str = include_str!("../tests/fixtures/monograph.xml");

/// A print with `pages` pages, one chapter per ten pages and a section per
/// page, roughly the shape of a large digitized volume.
fn large_mets(pages: usize) -> String {
    let mut files = String::new();
    let mut ocr = String::new();
    let mut physical = String::new();
    let mut logical = String::new();
    let mut links = String::from(r#"<mets:smLink xlink:from="log" xlink:to="physroot"/>"#);

    for page in 0..pages {
        files.push_str(&format!(
            r#"<mets:file ID="max{page}" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="https://example.org/max/{page:08}.jpg"/></mets:file>"#
        ));
        ocr.push_str(&format!(
            r#"<mets:file ID="ocr{page}" MIMETYPE="application/alto+xml"><mets:FLocat LOCTYPE="URL" xlink:href="https://example.org/ocr/{page:08}.xml"/></mets:file>"#
        ));
        physical.push_str(&format!(
            r#"<mets:div ID="phys{page}" ORDER="{page}" ORDERLABEL="{page}" TYPE="page"><mets:fptr FILEID="max{page}"/><mets:fptr FILEID="ocr{page}"/></mets:div>"#
        ));
    }

    for chapter in 0..pages.div_ceil(10) {
        logical.push_str(&format!(r#"<mets:div ID="log{chapter}" TYPE="chapter">"#));
        let first = chapter * 10;
        links.push_str(&format!(
            r#"<mets:smLink xlink:from="log{chapter}" xlink:to="phys{first}"/>"#
        ));
        for page in first..(first + 10).min(pages) {
            logical.push_str(&format!(
                r#"<mets:div ID="log{chapter}_{page}" TYPE="section"/>"#
            ));
            links.push_str(&format!(
                r#"<mets:smLink xlink:from="log{chapter}_{page}" xlink:to="phys{page}"/>"#
            ));
        }
        logical.push_str("</mets:div>");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
<mets:dmdSec ID="dmd1"><mets:mdWrap><mets:xmlData><mods:mods>
<mods:titleInfo><mods:title>Benchmark</mods:title></mods:titleInfo>
<mods:recordInfo><mods:recordIdentifier source="bench">1</mods:recordIdentifier></mods:recordInfo>
</mods:mods></mets:xmlData></mets:mdWrap></mets:dmdSec>
<mets:fileSec><mets:fileGrp USE="MAX">{files}</mets:fileGrp><mets:fileGrp USE="FULLTEXT">{ocr}</mets:fileGrp></mets:fileSec>
<mets:structMap TYPE="PHYSICAL"><mets:div ID="physroot" TYPE="physSequence">{physical}</mets:div></mets:structMap>
<mets:structMap TYPE="LOGICAL"><mets:div ID="log" TYPE="monograph" DMDID="dmd1">{logical}</mets:div></mets:structMap>
<mets:structLink>{links}</mets:structLink>
</mets:mets>"#
    )
}

fn bench_parse(c: &mut Criterion) {
    let large = large_mets(500);
    let mut group = c.benchmark_group("parse");

    group.bench_function("monograph", |b| {
        b.iter(|| XmlDocument::parse(MONOGRAPH, "monograph.xml").unwrap())
    });
    group.bench_function("500_pages", |b| {
        b.iter(|| XmlDocument::parse(&large, "large.xml").unwrap())
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let monograph = XmlDocument::parse(MONOGRAPH, "monograph.xml").unwrap();
    let large = XmlDocument::parse(&large_mets(500), "large.xml").unwrap();
    let mut group = c.benchmark_group("resolve");

    group.bench_function("monograph", |b| {
        b.iter(|| {
            Resolver::new(&monograph, ResolverConfig::default())
                .resolve()
                .unwrap()
        })
    });
    group.bench_function("500_pages", |b| {
        b.iter(|| Resolver::new(&large, ResolverConfig::default()).resolve().unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_resolve);
criterion_main!(benches);
