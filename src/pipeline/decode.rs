//! Two-phase block decoding.
//!
//! A block arrives as an opaque JSON value. Phase one reads only its
//! `$type`; phase two decodes the full payload into the shape that tag
//! implies. Either phase may fail, and a failure only costs that one block.
//!
//! Unknown tags are not failures: they become [`Block::Unknown`] so the
//! dispatcher can skip them without complaint.

use crate::document::null_as_default;
use crate::error::{BlockError, Unit};
use crate::output::Blob;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

// ── Lexicon identifiers ──────────────────────────────────────────────────

pub const TEXT_BLOCK: &str = "pub.leaflet.blocks.text";
pub const CODE_BLOCK: &str = "pub.leaflet.blocks.code";
pub const UNORDERED_LIST_BLOCK: &str = "pub.leaflet.blocks.unorderedList";
pub const IMAGE_BLOCK: &str = "pub.leaflet.blocks.image";
pub const BSKY_POST_BLOCK: &str = "pub.leaflet.blocks.bskyPost";

pub const LINK_FEATURE: &str = "pub.leaflet.richtext.facet#link";
pub const DID_MENTION_FEATURE: &str = "pub.leaflet.richtext.facet#didMention";
pub const CODE_FEATURE: &str = "pub.leaflet.richtext.facet#code";

/// A decoded block. Adding a block kind means adding a variant here and a
/// match arm in the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    Code(CodeBlock),
    UnorderedList(UnorderedListBlock),
    Image(ImageBlock),
    BskyPost(BskyPostBlock),
    /// Any other `$type`. Carries the tag for diagnostics.
    Unknown(String),
}

#[derive(Deserialize)]
struct Discriminator {
    #[serde(rename = "$type")]
    kind: String,
}

impl Block {
    /// Decode an opaque block value.
    ///
    /// # Errors
    /// [`BlockError::DecodeFailure`] when the value has no string `$type`, or
    /// when its payload does not match the shape its tag requires.
    pub fn decode(value: &Value) -> Result<Block, BlockError> {
        let tag = Discriminator::deserialize(value)
            .map_err(|e| BlockError::decode(Unit::Block, e))?
            .kind;

        let block = match tag.as_str() {
            TEXT_BLOCK => Block::Text(payload(value, Unit::Block)?),
            CODE_BLOCK => Block::Code(payload(value, Unit::Block)?),
            UNORDERED_LIST_BLOCK => Block::UnorderedList(payload(value, Unit::Block)?),
            IMAGE_BLOCK => Block::Image(payload(value, Unit::Block)?),
            BSKY_POST_BLOCK => Block::BskyPost(payload(value, Unit::Block)?),
            _ => Block::Unknown(tag),
        };
        Ok(block)
    }

    /// The lexicon `$type` this block was decoded from.
    pub fn tag(&self) -> &str {
        match self {
            Block::Text(_) => TEXT_BLOCK,
            Block::Code(_) => CODE_BLOCK,
            Block::UnorderedList(_) => UNORDERED_LIST_BLOCK,
            Block::Image(_) => IMAGE_BLOCK,
            Block::BskyPost(_) => BSKY_POST_BLOCK,
            Block::Unknown(tag) => tag,
        }
    }
}

pub(crate) fn payload<T: DeserializeOwned>(value: &Value, unit: Unit) -> Result<T, BlockError> {
    T::deserialize(value).map_err(|e| BlockError::decode(unit, e))
}

// ── Payload shapes ───────────────────────────────────────────────────────

/// `pub.leaflet.blocks.text`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub plaintext: String,
    #[serde(deserialize_with = "null_as_default")]
    pub facets: Vec<Facet>,
}

impl TextBlock {
    pub fn new(plaintext: impl Into<String>, facets: Vec<Facet>) -> Self {
        Self {
            plaintext: plaintext.into(),
            facets,
        }
    }
}

/// A rich-text annotation over a byte range of the plaintext.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Facet {
    #[serde(deserialize_with = "null_as_default")]
    pub index: ByteSlice,
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
}

impl Facet {
    pub fn new(byte_start: i64, byte_end: i64, features: Vec<Feature>) -> Self {
        Self {
            index: ByteSlice {
                byte_start,
                byte_end,
            },
            features,
        }
    }
}

/// Half-open byte range `[byte_start, byte_end)` into UTF-8 plaintext.
///
/// Signed so that negative offsets from a misbehaving writer decode and are
/// clamped rather than failing the whole text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ByteSlice {
    #[serde(deserialize_with = "null_as_default")]
    pub byte_start: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub byte_end: i64,
}

impl ByteSlice {
    /// Clamp to `0..=len` with `start <= end`.
    pub fn clamp_to(self, len: usize) -> (usize, usize) {
        let clamp = |v: i64| usize::try_from(v.max(0)).unwrap_or(usize::MAX).min(len);
        let start = clamp(self.byte_start);
        let end = clamp(self.byte_end).max(start);
        (start, end)
    }
}

/// One semantic feature of a facet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawFeature")]
pub enum Feature {
    Link { uri: String },
    DidMention { did: String },
    Code,
    /// Any other feature type (bold, italic, ...). Renders as plain text.
    Other(String),
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(rename = "$type", default, deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    did: Option<String>,
}

impl From<RawFeature> for Feature {
    fn from(raw: RawFeature) -> Self {
        match raw.kind.as_str() {
            LINK_FEATURE => Feature::Link {
                uri: raw.uri.unwrap_or_default(),
            },
            DID_MENTION_FEATURE => Feature::DidMention {
                did: raw.did.unwrap_or_default(),
            },
            CODE_FEATURE => Feature::Code,
            _ => Feature::Other(raw.kind),
        }
    }
}

/// `pub.leaflet.blocks.code`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeBlock {
    pub language: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub plaintext: String,
}

/// `pub.leaflet.blocks.unorderedList`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnorderedListBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<ListItem>,
}

/// `pub.leaflet.blocks.unorderedList#listItem`
///
/// `content` is decoded as a [`TextBlock`] only when the item is rendered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListItem {
    pub content: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<ListItem>,
}

/// `pub.leaflet.blocks.image`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageBlock {
    pub image: Blob,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alt: String,
}

/// `pub.leaflet.blocks.bskyPost`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BskyPostBlock {
    pub post_ref: StrongRef,
}

/// `com.atproto.repo.strongRef`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrongRef {
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cid: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_text_block_with_facets() {
        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.text",
            "plaintext": "hi there",
            "facets": [{
                "index": { "byteStart": 0, "byteEnd": 2 },
                "features": [{ "$type": "pub.leaflet.richtext.facet#bold" }]
            }]
        }))
        .unwrap();
        let Block::Text(text) = block else {
            panic!("expected text block, got {block:?}");
        };
        assert_eq!(text.plaintext, "hi there");
        assert_eq!(
            text.facets[0].features,
            vec![Feature::Other("pub.leaflet.richtext.facet#bold".into())]
        );
    }

    #[test]
    fn null_fields_decode_as_defaults() {
        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.text",
            "plaintext": "Hello",
            "facets": null
        }))
        .unwrap();
        assert_eq!(block, Block::Text(TextBlock::new("Hello", vec![])));

        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.text",
            "plaintext": null,
            "facets": [{ "index": { "byteStart": null, "byteEnd": 3 }, "features": null }]
        }))
        .unwrap();
        assert_eq!(
            block,
            Block::Text(TextBlock::new("", vec![Facet::new(0, 3, vec![])]))
        );

        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.image",
            "alt": null,
            "image": { "ref": { "$link": "bafy" } }
        }))
        .unwrap();
        let Block::Image(image) = block else {
            panic!("expected image block");
        };
        assert_eq!(image.alt, "");
    }

    #[test]
    fn null_list_children_decode_as_leaf() {
        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.unorderedList",
            "children": [
                { "content": { "$type": "pub.leaflet.blocks.text", "plaintext": "only" },
                  "children": null }
            ]
        }))
        .unwrap();
        let Block::UnorderedList(list) = block else {
            panic!("expected list block");
        };
        assert_eq!(list.children.len(), 1);
        assert!(list.children[0].children.is_empty());
    }

    #[test]
    fn missing_discriminator_is_decode_failure() {
        let err = Block::decode(&json!({ "plaintext": "orphan" })).unwrap_err();
        assert!(matches!(
            err,
            BlockError::DecodeFailure {
                unit: Unit::Block,
                ..
            }
        ));
    }

    #[test]
    fn non_object_block_is_decode_failure() {
        assert!(Block::decode(&json!("pub.leaflet.blocks.text")).is_err());
        assert!(Block::decode(&Value::Null).is_err());
    }

    #[test]
    fn unknown_tag_is_not_an_error() {
        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.math",
            "tex": "e^{i\\pi}"
        }))
        .unwrap();
        assert_eq!(block, Block::Unknown("pub.leaflet.blocks.math".into()));
        assert_eq!(block.tag(), "pub.leaflet.blocks.math");
    }

    #[test]
    fn known_tag_with_bad_payload_fails_in_phase_two() {
        // Image without a blob cannot be rendered.
        let err = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.image",
            "alt": "no blob"
        }))
        .unwrap_err();
        match err {
            BlockError::DecodeFailure { detail, .. } => assert!(detail.contains("image")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decodes_post_reference() {
        let block = Block::decode(&json!({
            "$type": "pub.leaflet.blocks.bskyPost",
            "postRef": {
                "uri": "at://did:plc:abc123/app.bsky.feed.post/3mbrxzvw36c22",
                "cid": "bafyreia"
            }
        }))
        .unwrap();
        let Block::BskyPost(post) = block else {
            panic!("expected post block");
        };
        assert_eq!(post.post_ref.cid, "bafyreia");
    }

    #[test]
    fn feature_payloads() {
        let features: Vec<Feature> = serde_json::from_value(json!([
            { "$type": "pub.leaflet.richtext.facet#link", "uri": "https://x.test" },
            { "$type": "pub.leaflet.richtext.facet#didMention", "did": "did:plc:a" },
            { "$type": "pub.leaflet.richtext.facet#code" },
            {},
            { "$type": null }
        ]))
        .unwrap();
        assert_eq!(
            features,
            vec![
                Feature::Link {
                    uri: "https://x.test".into()
                },
                Feature::DidMention {
                    did: "did:plc:a".into()
                },
                Feature::Code,
                Feature::Other(String::new()),
                Feature::Other(String::new()),
            ]
        );
    }

    #[test]
    fn byte_slice_clamping() {
        let s = |a, b| ByteSlice {
            byte_start: a,
            byte_end: b,
        };
        assert_eq!(s(2, 5).clamp_to(10), (2, 5));
        assert_eq!(s(-3, 4).clamp_to(10), (0, 4));
        assert_eq!(s(8, 50).clamp_to(10), (8, 10));
        assert_eq!(s(7, 3).clamp_to(10), (7, 7));
        assert_eq!(s(20, 30).clamp_to(10), (10, 10));
    }
}
