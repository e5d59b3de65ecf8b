//! # leaflet2md
//!
//! Convert [Leaflet](https://leaflet.pub) documents, stored as
//! `pub.leaflet.document` records in an AT Protocol repository, to Markdown
//! for static site generators such as Hugo.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON record
//!  │
//!  ├─ 1. Input     bare document, getRecord, or listRecords page
//!  ├─ 2. Decode    per block: read $type, then the payload it implies
//!  ├─ 3. Dispatch  text / code / list / image / bskyPost, unknown skipped
//!  ├─ 4. Facets    byte-range rich text → inline links and code
//!  ├─ 5. Output    Markdown + ordered image refs + skip log
//!  └─ 6. Media     caller swaps blob CIDs for local paths
//! ```
//!
//! Conversion never fails. A block that cannot be decoded, a list item with
//! unreadable content, or a facet overlapping an earlier one is skipped,
//! logged at `debug`, and recorded in [`ConversionResult::skipped`].
//!
//! ## Quick Start
//!
//! ```rust
//! use leaflet2md::{Converter, ConverterConfig, MediaMap, RenderMode};
//!
//! let config = ConverterConfig::builder()
//!     .render_mode(RenderMode::Shortcode)
//!     .build()
//!     .unwrap();
//! let converter = Converter::new(config);
//!
//! let result = converter.convert_str(r#"{
//!     "$type": "pub.leaflet.document",
//!     "title": "Photos",
//!     "pages": [{ "blocks": [{ "block": {
//!         "$type": "pub.leaflet.blocks.image",
//!         "alt": "Harbour",
//!         "image": { "ref": { "$link": "bafkreiharbour" }, "mimeType": "image/jpeg", "size": 1 }
//!     } }] }]
//! }"#).unwrap();
//!
//! let mut media = MediaMap::new();
//! for image in &result.images {
//!     media.insert(image.token(), format!("/images/{}.jpg", image.token()));
//! }
//! assert_eq!(media.apply(&result.markdown), "![Harbour](/images/bafkreiharbour.jpg)\n\n");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `leaflet2md` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod input;
pub mod media;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder, RenderMode};
pub use convert::{write_markdown, Converter};
pub use document::{BlockWrapper, Document, Page, Record, RecordPage};
pub use error::{BlockError, LeafletError, Unit};
pub use input::{load_documents, parse_documents, slugify, SourceDocument};
pub use media::{resolve_media, MediaMap};
pub use output::{Blob, BlobRef, ConversionResult, ConversionStats, ImageRef, SkippedUnit};
pub use pipeline::decode::Block;
