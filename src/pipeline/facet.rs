//! Facet rendering: rich-text byte ranges → inline Markdown.
//!
//! Facet offsets index the UTF-8 *bytes* of the plaintext, never chars or
//! graphemes. The renderer therefore works on `&[u8]` throughout and only
//! turns bytes back into a `String` at the end, so a facet edge that lands
//! inside a multi-byte sequence cannot panic; at worst the affected bytes
//! become U+FFFD.
//!
//! One cursor walks the text once. A facet starting before the cursor
//! (overlapping or out of order) is dropped and reported; the text it
//! covered is still emitted through the surrounding ranges.

use crate::config::ConverterConfig;
use crate::error::BlockError;
use crate::pipeline::decode::{Facet, Feature};

/// Render `text` with its facets applied.
///
/// Dropped facets are silently ignored; use [`render_facets_into`] to
/// collect them.
///
/// # Example
/// ```rust
/// use leaflet2md::pipeline::decode::{Facet, Feature};
/// use leaflet2md::pipeline::facet::render_facets;
/// use leaflet2md::ConverterConfig;
///
/// let facets = vec![Facet::new(10, 21, vec![Feature::Link {
///     uri: "https://example.com".into(),
/// }])];
/// let md = render_facets(
///     "Check out example.com for more info",
///     &facets,
///     &ConverterConfig::default(),
/// );
/// assert_eq!(md, "Check out [example.com](https://example.com) for more info");
/// ```
pub fn render_facets(text: &str, facets: &[Facet], config: &ConverterConfig) -> String {
    let mut dropped = Vec::new();
    render_facets_into(text, facets, config, &mut dropped)
}

/// Like [`render_facets`], pushing a [`BlockError::FacetOrderViolation`]
/// onto `dropped` for every facet that had to be skipped.
pub fn render_facets_into(
    text: &str,
    facets: &[Facet],
    config: &ConverterConfig,
    dropped: &mut Vec<BlockError>,
) -> String {
    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + facets.len() * 24);
    let mut cursor = 0usize;

    for facet in facets {
        let (start, end) = facet.index.clamp_to(bytes.len());
        if start < cursor {
            dropped.push(BlockError::FacetOrderViolation {
                byte_start: facet.index.byte_start,
                cursor,
            });
            continue;
        }

        out.extend_from_slice(&bytes[cursor..start]);

        let raw = &bytes[start..end];
        let span = String::from_utf8_lossy(raw);
        match replacement(&span, &facet.features, config) {
            Some(markup) => out.extend_from_slice(markup.as_bytes()),
            None => out.extend_from_slice(raw),
        }

        cursor = end;
    }

    out.extend_from_slice(&bytes[cursor..]);

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Evaluate features in order. Each recognised feature replaces the result
/// of the previous one; they do not nest.
fn replacement(span: &str, features: &[Feature], config: &ConverterConfig) -> Option<String> {
    features
        .iter()
        .fold(None, |current, feature| render_feature(span, feature, config).or(current))
}

fn render_feature(span: &str, feature: &Feature, config: &ConverterConfig) -> Option<String> {
    match feature {
        Feature::Link { uri } => Some(format!("[{}]({})", span, uri)),
        Feature::DidMention { did } => Some(format!("[{}]({})", span, config.profile_url(did))),
        Feature::Code => Some(format!("`{}`", span)),
        Feature::Other(_) => None,
    }
}
