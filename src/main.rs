//! mets-outline - resolve METS documents into record, pages and outline

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use mets_outline::{
    BibliographicRecord, CleanReport, OutlineEntry, OutlineTree, PhysicalPage, Resolver,
    ResolverConfig, XmlDocument,
};

#[derive(Parser)]
#[command(name = "mets-outline")]
#[command(version, about = "Resolve METS/MODS documents into record, pages and outline", long_about = None)]
#[command(after_help = "EXAMPLES:
    mets-outline mets.xml                      Show record and outline
    mets-outline mets.xml --json --pages       Full resolution as JSON
    mets-outline mets.xml --image-group DEFAULT
    mets-outline mets.xml --identifier-xpath \"//mods:identifier[@type='vd18']\"")]
struct Cli {
    /// METS file
    #[arg(value_name = "INPUT")]
    input: String,

    /// File group defining page order
    #[arg(long, value_name = "GROUP", default_value = mets_outline::mets::DEFAULT_IMAGE_GROUP)]
    image_group: String,

    /// File group holding full text
    #[arg(long, value_name = "GROUP", default_value = mets_outline::mets::DEFAULT_OCR_GROUP)]
    ocr_group: String,

    /// Path expression selecting the record identifier
    #[arg(long, value_name = "EXPR")]
    identifier_xpath: Option<String>,

    /// Print the resolution as JSON
    #[arg(long)]
    json: bool,

    /// Include the page list
    #[arg(long)]
    pages: bool,

    /// Log resolution steps to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'a str,
    record: &'a BibliographicRecord,
    page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<&'a [PhysicalPage]>,
    dropped: CleanReport,
    outline: OutlineEntry,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("warning: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), String> {
    let default = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "warn",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default))
        .map_err(|e| format!("build log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("initialize tracing subscriber: {e}"))
}

fn run(cli: &Cli) -> Result<(), String> {
    let doc = XmlDocument::open(&cli.input).map_err(|e| e.to_string())?;

    let mut config = ResolverConfig::new().with_image_group(&cli.image_group);
    config = if cli.ocr_group.is_empty() {
        config.without_ocr_group()
    } else {
        config.with_ocr_group(&cli.ocr_group)
    };
    if let Some(expr) = &cli.identifier_xpath {
        config = config.with_identifier_expression(expr);
    }

    let resolution = Resolver::new(&doc, config)
        .resolve()
        .map_err(|e| e.to_string())?;

    if cli.json {
        let report = Report {
            source: &cli.input,
            record: &resolution.record,
            page_count: resolution.pages.len(),
            pages: cli.pages.then_some(resolution.pages.as_slice()),
            dropped: resolution.report,
            outline: resolution.outline.to_entries(),
        };
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    println!("File: {}", cli.input);
    for (name, value) in resolution.record.fields() {
        println!("{name}: {value}");
    }
    println!("Pages: {}", resolution.pages.len());
    if resolution.report.dropped() > 0 {
        println!(
            "Dropped: {} unresolved, {} duplicate",
            resolution.report.invalid, resolution.report.duplicates
        );
    }

    if cli.pages {
        println!();
        for page in &resolution.pages {
            let label = page.label.as_deref().unwrap_or("-");
            let file = page.image().map(|f| f.local_name()).unwrap_or_default();
            println!("{:>5}  {:<12} {}", page.order, label, file);
        }
    }

    println!();
    print_outline(&resolution.outline);
    Ok(())
}

fn print_outline(tree: &OutlineTree) {
    for (index, depth) in tree.walk() {
        let Some(node) = tree.node(index) else {
            continue;
        };
        println!(
            "{}{} [{}] ... {}",
            "  ".repeat(depth),
            node.label,
            node.type_code,
            node.start_page
        );
    }
}
