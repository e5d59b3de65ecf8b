//! Conversion entry points.
//!
//! [`Converter`] is the composition root: it walks pages and blocks in
//! document order and hands each block to the dispatcher. It holds nothing
//! but its configuration, so one instance can convert any number of
//! documents, from any number of threads.

use crate::config::ConverterConfig;
use crate::document::Document;
use crate::error::LeafletError;
use crate::output::ConversionResult;
use crate::pipeline::dispatch::DocumentSink;
use std::path::Path;
use tracing::info;

/// Converts Leaflet documents to Markdown.
///
/// # Example
/// ```rust
/// use leaflet2md::{Converter, ConverterConfig};
///
/// let converter = Converter::new(ConverterConfig::default());
/// let result = converter
///     .convert_str(r#"{
///         "$type": "pub.leaflet.document",
///         "title": "Hello",
///         "pages": [{ "blocks": [{ "block": {
///             "$type": "pub.leaflet.blocks.text",
///             "plaintext": "Hello world"
///         } }] }]
///     }"#)
///     .unwrap();
/// assert_eq!(result.markdown, "Hello world\n\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a decoded document.
    ///
    /// Never fails: undecodable or unsupported units are skipped and listed
    /// in [`ConversionResult::skipped`]. A document without pages yields an
    /// empty result.
    pub fn convert(&self, document: &Document) -> ConversionResult {
        let mut sink = DocumentSink::new(&self.config);
        for (idx, page) in document.pages.iter().enumerate() {
            sink.push_page(idx, &page.blocks);
        }
        let result = sink.finish();

        info!(
            "Converted '{}': {} blocks, {} images, {} skipped",
            document.title,
            result.stats.blocks_rendered,
            result.stats.images,
            result.skipped.len()
        );
        result
    }

    /// Decode a document record value from JSON and convert it.
    ///
    /// # Errors
    /// [`LeafletError::InvalidJson`] if `json` is not a document-shaped
    /// object. Problems inside individual blocks are not errors.
    pub fn convert_str(&self, json: &str) -> Result<ConversionResult, LeafletError> {
        let document: Document =
            serde_json::from_str(json).map_err(|source| LeafletError::InvalidJson {
                origin: "input".to_string(),
                source,
            })?;
        Ok(self.convert(&document))
    }
}

/// Write Markdown to `path`, creating parent directories.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn write_markdown(path: impl AsRef<Path>, markdown: &str) -> Result<(), LeafletError> {
    let path = path.as_ref();
    let fail = |source| LeafletError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, markdown).map_err(fail)?;
    std::fs::rename(&tmp_path, path).map_err(fail)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockWrapper, Page};
    use serde_json::json;

    fn text(s: &str) -> BlockWrapper {
        BlockWrapper::new(json!({ "$type": "pub.leaflet.blocks.text", "plaintext": s }))
    }

    #[test]
    fn empty_document_is_empty_result() {
        let r = Converter::default().convert(&Document::default());
        assert_eq!(r.markdown, "");
        assert!(r.images.is_empty());
        assert!(r.skipped.is_empty());
        assert_eq!(r.stats.pages, 0);
    }

    #[test]
    fn pages_render_in_order() {
        let doc = Document {
            pages: vec![
                Page {
                    page_type: None,
                    blocks: vec![text("one"), text("two")],
                },
                Page {
                    page_type: None,
                    blocks: vec![text("three")],
                },
            ],
            ..Default::default()
        };
        let r = Converter::default().convert(&doc);
        assert_eq!(r.markdown, "one\n\ntwo\n\nthree\n\n");
        assert_eq!(r.stats.pages, 2);
    }

    #[test]
    fn convert_str_rejects_non_object() {
        let err = Converter::default().convert_str("[1, 2]").unwrap_err();
        assert!(matches!(err, LeafletError::InvalidJson { .. }));
    }

    #[test]
    fn convert_str_tolerates_missing_pages() {
        let r = Converter::default()
            .convert_str(r#"{"$type":"pub.leaflet.document","title":"x"}"#)
            .unwrap();
        assert_eq!(r.markdown, "");
    }

    #[test]
    fn convert_str_treats_null_pages_as_empty() {
        let r = Converter::default()
            .convert_str(r#"{"$type":"pub.leaflet.document","title":"x","pages":null}"#)
            .unwrap();
        assert_eq!(r.markdown, "");
        assert!(r.skipped.is_empty());
        assert_eq!(r.stats.pages, 0);
    }

    #[test]
    fn null_blocks_page_renders_nothing() {
        let r = Converter::default()
            .convert_str(
                r#"{"pages":[{"blocks":null},{"blocks":[{"block":{"$type":"pub.leaflet.blocks.text","plaintext":"ok"}}]}]}"#,
            )
            .unwrap();
        assert_eq!(r.markdown, "ok\n\n");
        assert_eq!(r.stats.pages, 2);
    }
}
