//! Serde model of a `pub.leaflet.document` record.
//!
//! Only the outer shell is decoded eagerly. Each block stays an opaque
//! [`serde_json::Value`] until its `$type` has been read, because the
//! payload shape depends entirely on that tag (see
//! [`crate::pipeline::decode`]).
//!
//! Every field is `#[serde(default)]`, and an explicit `null` counts as
//! absent: a record with no `pages` (or `"pages": null`) is simply a
//! document with nothing to render.

use serde::{Deserialize, Deserializer, Serialize};

/// `$type` of a Leaflet document record.
pub const DOCUMENT_TYPE: &str = "pub.leaflet.document";

/// A Leaflet document: metadata plus an ordered list of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// RFC 3339 timestamp, kept as the raw string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// AT-URI of the `pub.leaflet.publication` this document belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: Vec<Page>,
}

impl Document {
    /// Whether this document belongs to the publication at `uri`.
    pub fn belongs_to(&self, uri: &str) -> bool {
        self.publication.as_deref() == Some(uri)
    }
}

/// One page (`pub.leaflet.pages.linearDocument`): blocks in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub blocks: Vec<BlockWrapper>,
}

/// `pub.leaflet.pages.linearDocument#block`: holds the undecoded block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockWrapper {
    pub block: serde_json::Value,
}

impl BlockWrapper {
    pub fn new(block: serde_json::Value) -> Self {
        Self { block }
    }
}

/// A repository record as returned by `com.atproto.repo.getRecord` or
/// inside a `listRecords` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cid: String,
    pub value: serde_json::Value,
}

impl Record {
    /// `$type` of the record value, if present.
    pub fn record_type(&self) -> Option<&str> {
        self.value.get("$type").and_then(|t| t.as_str())
    }

    /// Record key: the last path segment of the AT-URI.
    pub fn rkey(&self) -> &str {
        last_path_segment(&self.uri)
    }
}

/// One page of `com.atproto.repo.listRecords` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<Record>,
}

/// Decode `null` the same as a missing field.
///
/// Pair with `#[serde(default)]` so the field may also be absent.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn last_path_segment(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}
