//! Conversion output types.
//!
//! [`ConversionResult`] is created fresh by every call to
//! [`crate::Converter::convert`] and owned by the caller. Nothing in it is
//! shared with the converter afterwards.

use crate::document::null_as_default;
use crate::error::BlockError;
use serde::{Deserialize, Serialize};

/// The rendered Markdown plus everything the caller needs to finish the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Markdown for the whole document. Image targets are still the raw
    /// blob CIDs; see [`crate::media::MediaMap::apply`].
    pub markdown: String,
    /// Images in the order they appear in the document. Not deduplicated.
    pub images: Vec<ImageRef>,
    /// Units that were skipped while rendering, in encounter order.
    pub skipped: Vec<SkippedUnit>,
    pub stats: ConversionStats,
}

/// An image block's blob and alt text, as extracted during conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub blob: Blob,
    pub alt: String,
}

impl ImageRef {
    /// The content-address token written into the Markdown for this image.
    pub fn token(&self) -> &str {
        &self.blob.reference.link
    }
}

/// An AT Protocol blob reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "ref")]
    pub reference: BlobRef,
    #[serde(rename = "mimeType", default, deserialize_with = "null_as_default")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
}

/// CID link inside a [`Blob`] (`{"$link": "bafy..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    #[serde(rename = "$link")]
    pub link: String,
}

impl Blob {
    pub fn new(cid: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            reference: BlobRef { link: cid.into() },
            mime_type: mime_type.into(),
            size,
        }
    }
}

/// A block, list item or facet that was left out of the Markdown.
///
/// `page` and `block` are 0-indexed positions of the top-level block the
/// unit belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub page: usize,
    pub block: usize,
    pub error: BlockError,
}

/// Counters describing one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages walked.
    pub pages: usize,
    /// Top-level blocks that produced Markdown.
    pub blocks_rendered: usize,
    /// Top-level blocks skipped (undecodable or unsupported).
    pub blocks_skipped: usize,
    /// List items whose content could not be decoded.
    pub list_items_skipped: usize,
    /// Facets dropped because they overlapped earlier ones.
    pub facets_dropped: usize,
    /// Image references extracted.
    pub images: usize,
}

impl ConversionStats {
    /// True when every unit in the document rendered.
    pub fn is_clean(&self) -> bool {
        self.blocks_skipped == 0 && self.list_items_skipped == 0 && self.facets_dropped == 0
    }
}
