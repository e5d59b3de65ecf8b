//! CLI binary for leaflet2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConverterConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use leaflet2md::{
    load_documents, write_markdown, ConversionResult, Converter, ConverterConfig, MediaMap,
    RenderMode, SourceDocument,
};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one document record to stdout
  leaflet2md post.json

  # Hugo shortcodes for embedded Bluesky posts
  leaflet2md --mode shortcode post.json -o content/posts/post.md

  # Pick one document out of a listRecords dump
  leaflet2md --record 3mbrxzvw36c22 records.json

  # Only documents of one publication, as JSON
  leaflet2md --publication at://did:plc:abc/pub.leaflet.publication/blog --json records.json

  # Point image links at already-downloaded files
  leaflet2md --media-map media.json post.json

INPUT:
  A JSON file holding either a bare pub.leaflet.document value, a single
  record ({"uri", "cid", "value"}), or a com.atproto.repo.listRecords page
  ({"records": [...]}). Records of other types are skipped.

MEDIA MAP:
  A JSON object mapping blob CIDs to the path written into the Markdown:
    {"bafkreiabc...": "/images/bafkreiabc.jpg"}

ENVIRONMENT VARIABLES:
  LEAFLET2MD_MODE          Post render mode (link, shortcode)
  LEAFLET2MD_PROFILE_BASE  Base URL for profile and post links
  LEAFLET2MD_MEDIA_MAP     Default media map file
  RUST_LOG                 Override log filter (e.g. leaflet2md=debug)
"#;

/// Convert Leaflet documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "leaflet2md",
    version,
    about = "Convert Leaflet documents (AT Protocol records) to Markdown",
    long_about = "Convert pub.leaflet.document records to Markdown for static site generators. \
Text, code, nested lists, images and embedded Bluesky posts are rendered; other block types \
are skipped.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JSON file with a document, a record, or a listRecords page.
    input: PathBuf,

    /// Write Markdown to this file instead of stdout (single document only).
    #[arg(short, long, env = "LEAFLET2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// How embedded Bluesky posts are rendered.
    #[arg(long, env = "LEAFLET2MD_MODE", value_enum, default_value = "link")]
    mode: ModeArg,

    /// Base URL for profile and post links.
    #[arg(
        long,
        env = "LEAFLET2MD_PROFILE_BASE",
        default_value = leaflet2md::config::DEFAULT_PROFILE_BASE
    )]
    profile_base: String,

    /// Only convert documents of this publication (AT-URI).
    #[arg(long, env = "LEAFLET2MD_PUBLICATION")]
    publication: Option<String>,

    /// Only convert the record with this key (or slug).
    #[arg(long)]
    record: Option<String>,

    /// JSON object mapping blob CIDs to image paths.
    #[arg(long, env = "LEAFLET2MD_MEDIA_MAP")]
    media_map: Option<PathBuf>,

    /// Output structured JSON instead of Markdown.
    #[arg(long, env = "LEAFLET2MD_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LEAFLET2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LEAFLET2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ModeArg {
    Link,
    Shortcode,
}

impl From<ModeArg> for RenderMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Link => RenderMode::Link,
            ModeArg::Shortcode => RenderMode::Shortcode,
        }
    }
}

/// One converted document, as printed by `--json`.
#[derive(Serialize)]
struct JsonDocument<'a> {
    uri: Option<&'a str>,
    slug: &'a str,
    title: &'a str,
    #[serde(rename = "publishedAt")]
    published_at: Option<&'a str>,
    tags: &'a [String],
    #[serde(flatten)]
    result: &'a ConversionResult,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = ConverterConfig::builder()
        .render_mode(cli.mode.clone().into())
        .profile_base(&cli.profile_base)
        .build()
        .context("Invalid configuration")?;
    let converter = Converter::new(config);

    let media = match cli.media_map {
        Some(ref path) => MediaMap::load(path).context("Failed to load media map")?,
        None => MediaMap::new(),
    };

    // ── Load and select documents ────────────────────────────────────────
    let mut docs = load_documents(&cli.input, cli.publication.as_deref())
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    if let Some(ref key) = cli.record {
        docs.retain(|d| matches_record(d, key));
        if docs.is_empty() {
            anyhow::bail!("No document with record key '{}' in {}", key, cli.input.display());
        }
    }

    if cli.output.is_some() && docs.len() > 1 {
        anyhow::bail!(
            "{} documents found; --output takes exactly one (use --record to pick)",
            docs.len()
        );
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let results: Vec<ConversionResult> = docs
        .iter()
        .map(|d| {
            let mut result = converter.convert(&d.document);
            result.markdown = media.apply(&result.markdown);
            result
        })
        .collect();

    if cli.json {
        let out: Vec<JsonDocument<'_>> = docs
            .iter()
            .zip(&results)
            .map(|(d, result)| JsonDocument {
                uri: d.uri.as_deref(),
                slug: &d.slug,
                title: &d.document.title,
                published_at: d.document.published_at.as_deref(),
                tags: &d.document.tags,
                result,
            })
            .collect();
        let json = serde_json::to_string_pretty(&out).context("Failed to serialise output")?;
        println!("{json}");
    } else if let Some(ref output_path) = cli.output {
        write_markdown(output_path, &results[0].markdown).context("Failed to write output")?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                handle
                    .write_all(b"\n---\n\n")
                    .context("Failed to write to stdout")?;
            }
            handle
                .write_all(result.markdown.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet && io::stderr().is_terminal() {
        for (d, result) in docs.iter().zip(&results) {
            let stats = &result.stats;
            eprintln!(
                "{} {}  {}",
                if stats.is_clean() { green("✔") } else { cyan("⚠") },
                d.slug,
                dim(&format!(
                    "{} blocks, {} images, {} skipped",
                    stats.blocks_rendered,
                    stats.images,
                    result.skipped.len()
                )),
            );
        }
        if let Some(ref output_path) = cli.output {
            eprintln!("   →  {}", output_path.display());
        }
    }

    Ok(())
}

/// A record matches by its key or its slug.
fn matches_record(doc: &SourceDocument, key: &str) -> bool {
    doc.slug == key
        || doc
            .uri
            .as_deref()
            .and_then(|u| u.rsplit('/').next())
            .is_some_and(|rkey| rkey == key)
}
