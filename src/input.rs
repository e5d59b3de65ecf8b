//! Input resolution: turn a JSON file into the documents it contains.
//!
//! Three shapes are accepted, matching what the AT Protocol repository API
//! hands out:
//!
//! * a bare `pub.leaflet.document` value;
//! * a single record `{ "uri", "cid", "value" }` (`getRecord`);
//! * a page of records `{ "records": [...], "cursor" }` (`listRecords`).
//!
//! In a record page, records of other types are skipped; a lone record of
//! another type is an error. An optional publication URI narrows the set
//! further.

use crate::document::{Document, Record, RecordPage, DOCUMENT_TYPE};
use crate::error::LeafletError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static RE_SLUG_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._~-]+").unwrap());

/// A document together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// AT-URI of the record, when the input carried one.
    pub uri: Option<String>,
    /// Filename-safe identifier: the record key, else derived from the title.
    pub slug: String,
    pub document: Document,
}

/// Read `path` and extract its documents.
pub fn load_documents(
    path: impl AsRef<Path>,
    publication: Option<&str>,
) -> Result<Vec<SourceDocument>, LeafletError> {
    let path = path.as_ref();
    let raw = read_input(path)?;
    let docs = parse_documents(&raw, &path.display().to_string(), publication)?;
    info!("Loaded {} document(s) from {}", docs.len(), path.display());
    Ok(docs)
}

fn read_input(path: &Path) -> Result<String, LeafletError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LeafletError::FileNotFound {
            path: PathBuf::from(path),
        },
        std::io::ErrorKind::PermissionDenied => LeafletError::PermissionDenied {
            path: PathBuf::from(path),
        },
        _ => LeafletError::ReadFailed {
            path: PathBuf::from(path),
            source: e,
        },
    })
}

/// Extract documents from JSON text. `origin` names the input in errors.
pub fn parse_documents(
    json: &str,
    origin: &str,
    publication: Option<&str>,
) -> Result<Vec<SourceDocument>, LeafletError> {
    let invalid = |source| LeafletError::InvalidJson {
        origin: origin.to_string(),
        source,
    };
    let value: Value = serde_json::from_str(json).map_err(invalid)?;

    let docs = if value.get("records").is_some() {
        let page: RecordPage = serde_json::from_value(value).map_err(invalid)?;
        page.records.into_iter().filter_map(from_listed_record).collect()
    } else if value.get("uri").is_some() && value.get("value").is_some() {
        let record: Record = serde_json::from_value(value).map_err(invalid)?;
        match record.record_type() {
            Some(DOCUMENT_TYPE) | None => {}
            Some(other) => {
                return Err(LeafletError::UnsupportedRecord {
                    kind: other.to_string(),
                })
            }
        }
        vec![from_record(record).map_err(invalid)?]
    } else {
        match value.get("$type").and_then(Value::as_str) {
            Some(DOCUMENT_TYPE) | None => {}
            Some(other) => {
                return Err(LeafletError::UnsupportedRecord {
                    kind: other.to_string(),
                })
            }
        }
        let document: Document = serde_json::from_value(value).map_err(invalid)?;
        vec![SourceDocument {
            uri: None,
            slug: slugify(&document.title),
            document,
        }]
    };

    let docs: Vec<SourceDocument> = match publication {
        Some(uri) => docs
            .into_iter()
            .filter(|d| {
                let keep = d.document.belongs_to(uri);
                if !keep {
                    debug!("Skipping '{}': not in publication {}", d.slug, uri);
                }
                keep
            })
            .collect(),
        None => docs,
    };

    if docs.is_empty() {
        return Err(LeafletError::NoDocuments {
            origin: origin.to_string(),
        });
    }
    Ok(docs)
}

fn from_record(record: Record) -> Result<SourceDocument, serde_json::Error> {
    let slug = slugify(record.rkey());
    let document: Document = serde_json::from_value(record.value)?;
    Ok(SourceDocument {
        uri: Some(record.uri),
        slug,
        document,
    })
}

fn from_listed_record(record: Record) -> Option<SourceDocument> {
    if record.record_type() != Some(DOCUMENT_TYPE) {
        debug!(
            "Skipping record {} of type {:?}",
            record.uri,
            record.record_type()
        );
        return None;
    }
    let uri = record.uri.clone();
    match from_record(record) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Failed to decode record {}: {}", uri, e);
            None
        }
    }
}

/// Make `s` safe to use as a file stem.
///
/// Runs of characters outside `[A-Za-z0-9._~-]` collapse to a single `-`;
/// an empty result becomes `document`.
pub fn slugify(s: &str) -> String {
    let slug = RE_SLUG_UNSAFE.replace_all(s.trim(), "-");
    let slug = slug.trim_matches('-').to_lowercase();
    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        "document".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "$type": "pub.leaflet.document",
        "title": "Hello World",
        "publication": "at://did:plc:me/pub.leaflet.publication/blog",
        "pages": []
    }"#;

    #[test]
    fn bare_document_slug_from_title() {
        let docs = parse_documents(DOC, "test", None).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug, "hello-world");
        assert_eq!(docs[0].uri, None);
    }

    #[test]
    fn single_record_slug_from_rkey() {
        let json = format!(
            r#"{{"uri": "at://did:plc:me/pub.leaflet.document/3kabc", "cid": "x", "value": {DOC}}}"#
        );
        let docs = parse_documents(&json, "test", None).unwrap();
        assert_eq!(docs[0].slug, "3kabc");
        assert_eq!(
            docs[0].uri.as_deref(),
            Some("at://did:plc:me/pub.leaflet.document/3kabc")
        );
    }

    #[test]
    fn single_record_of_other_type_is_rejected() {
        let json = r#"{"uri": "at://did:plc:me/com.whtwnd.blog.entry/1", "value": {"$type": "com.whtwnd.blog.entry"}}"#;
        let err = parse_documents(json, "test", None).unwrap_err();
        assert!(matches!(err, LeafletError::UnsupportedRecord { .. }));
    }

    #[test]
    fn record_page_keeps_document_with_null_pages() {
        let json = r#"{"records": [
            {"uri": "at://did:plc:me/pub.leaflet.document/empty",
             "value": {"$type": "pub.leaflet.document", "title": "Draft", "pages": null}}
        ]}"#;
        let docs = parse_documents(json, "test", None).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug, "empty");
        assert!(docs[0].document.pages.is_empty());
    }

    #[test]
    fn record_page_filters_by_type_and_publication() {
        let json = format!(
            r#"{{
                "cursor": "next",
                "records": [
                    {{"uri": "at://did:plc:me/pub.leaflet.document/a", "value": {DOC}}},
                    {{"uri": "at://did:plc:me/pub.leaflet.publication/blog",
                      "value": {{"$type": "pub.leaflet.publication", "name": "Blog"}}}},
                    {{"uri": "at://did:plc:me/pub.leaflet.document/b",
                      "value": {{"$type": "pub.leaflet.document", "title": "Elsewhere",
                                 "publication": "at://did:plc:me/pub.leaflet.publication/other"}}}},
                    {{"uri": "at://did:plc:me/pub.leaflet.document/c",
                      "value": {{"$type": "pub.leaflet.document", "title": 42}}}}
                ]
            }}"#
        );
        let all = parse_documents(&json, "test", None).unwrap();
        let slugs: Vec<&str> = all.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);

        let blog =
            parse_documents(&json, "test", Some("at://did:plc:me/pub.leaflet.publication/blog"))
                .unwrap();
        assert_eq!(blog.len(), 1);
        assert_eq!(blog[0].document.title, "Hello World");
    }

    #[test]
    fn nothing_left_after_filter_is_an_error() {
        let err = parse_documents(DOC, "feed.json", Some("at://nope")).unwrap_err();
        assert!(err.to_string().contains("feed.json"));
    }

    #[test]
    fn invalid_json_reports_origin() {
        let err = parse_documents("{oops", "broken.json", None).unwrap_err();
        match err {
            LeafletError::InvalidJson { origin, .. } => assert_eq!(origin, "broken.json"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let err = load_documents("/definitely/not/here.json", None).unwrap_err();
        assert!(matches!(err, LeafletError::FileNotFound { .. }));
    }

    #[test]
    fn slugify_cases() {
        assert_eq!(slugify("3mbrxzvw36c22"), "3mbrxzvw36c22");
        assert_eq!(slugify("Rust & AT Protocol!"), "rust-at-protocol");
        assert_eq!(slugify("  "), "document");
        assert_eq!(slugify(".."), "document");
        assert_eq!(slugify("a/b"), "a-b");
        assert_eq!(slugify("Ünïcode title"), "n-code-title");
    }
}
