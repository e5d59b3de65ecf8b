//! Error types for the leaflet2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`LeafletError`] — **Fatal**: the input cannot be read at all (missing
//!   file, invalid JSON, no document records, bad configuration). Returned as
//!   `Err(LeafletError)` from the file and JSON entry points.
//!
//! * [`BlockError`] — **Non-fatal**: a single block, list item or facet could
//!   not be rendered. The unit is skipped, the rest of the document renders,
//!   and the error is recorded in [`crate::output::SkippedUnit`].
//!
//! [`crate::Converter::convert`] itself never fails; only the surrounding I/O
//! can.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the leaflet2md library.
#[derive(Debug, Error)]
pub enum LeafletError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading input.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not well-formed JSON, or not shaped like a document.
    #[error("Invalid JSON in {origin}: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single record was given but its `$type` is not a Leaflet document.
    #[error("Record type '{kind}' is not supported (expected pub.leaflet.document)")]
    UnsupportedRecord { kind: String },

    /// The input held records, but none survived type and publication filters.
    #[error("No Leaflet documents found in {origin}")]
    NoDocuments { origin: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Media errors ──────────────────────────────────────────────────────
    /// The token→path map file is not a JSON object of strings.
    #[error("Invalid media map '{path}': {detail}")]
    InvalidMediaMap { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The kind of unit a [`BlockError::DecodeFailure`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// A top-level block (discriminator or payload).
    Block,
    /// The content of an unordered-list item.
    ListItem,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Block => f.write_str("block"),
            Unit::ListItem => f.write_str("list item"),
        }
    }
}

/// A non-fatal error for a single unit of the document.
///
/// The converter absorbs these locally: the offending unit is skipped and
/// rendering carries on with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockError {
    /// The payload could not be decoded into its expected shape.
    #[error("{unit} could not be decoded: {detail}")]
    DecodeFailure { unit: Unit, detail: String },

    /// The discriminator names a block kind this converter does not render.
    #[error("unsupported block type '{tag}'")]
    UnknownVariant { tag: String },

    /// A facet starts before the end of the previously applied facet.
    /// `byte_start` is the offset as written in the record, before clamping.
    #[error("facet at byte {byte_start} overlaps text already emitted up to byte {cursor}")]
    FacetOrderViolation { byte_start: i64, cursor: usize },
}

impl BlockError {
    pub(crate) fn decode(unit: Unit, err: impl std::fmt::Display) -> Self {
        BlockError::DecodeFailure {
            unit,
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_record_display() {
        let e = LeafletError::UnsupportedRecord {
            kind: "com.whtwnd.blog.entry".into(),
        };
        assert!(e.to_string().contains("com.whtwnd.blog.entry"));
    }

    #[test]
    fn invalid_json_display_names_origin() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e = LeafletError::InvalidJson {
            origin: "post.json".into(),
            source,
        };
        assert!(e.to_string().starts_with("Invalid JSON in post.json"));
    }

    #[test]
    fn facet_violation_display() {
        let e = BlockError::FacetOrderViolation {
            byte_start: 3,
            cursor: 9,
        };
        let msg = e.to_string();
        assert!(msg.contains("byte 3"), "got: {msg}");
        assert!(msg.contains("byte 9"), "got: {msg}");
    }

    #[test]
    fn decode_failure_names_unit() {
        let e = BlockError::decode(Unit::ListItem, "missing field `plaintext`");
        assert_eq!(
            e.to_string(),
            "list item could not be decoded: missing field `plaintext`"
        );
    }

    #[test]
    fn block_error_serialises_with_kind_tag() {
        let e = BlockError::UnknownVariant {
            tag: "pub.leaflet.blocks.math".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "unknown_variant");
        assert_eq!(json["tag"], "pub.leaflet.blocks.math");
    }
}
