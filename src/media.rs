//! Blob token → local path substitution.
//!
//! The converter writes each image as `![alt](CID)`. Once the caller has
//! fetched the blobs, it knows where each one lives and builds a
//! [`MediaMap`]. [`MediaMap::apply`] then rewrites image targets in a
//! single pass over the Markdown.
//!
//! Only the target of an image link is rewritten, and only when it is
//! exactly a known token. The same CID appearing in prose or inside a code
//! block is left alone.

use crate::error::LeafletError;
use crate::output::ImageRef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// `![alt](target)`: prefix up to `(`, target, closing `)`.
///
/// Alt text may hold one level of balanced brackets but never an unmatched
/// `]`, so a match cannot run past the end of its own image.
static RE_IMAGE_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!\[(?:[^\[\]]|\[[^\[\]]*\])*\]\()([^()\s]*)(\))").unwrap());

/// Mapping from blob CID to the path the Markdown should reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMap {
    paths: HashMap<String, String>,
}

impl MediaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, path: impl Into<String>) {
        self.paths.insert(token.into(), path.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.paths.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Parse a JSON object of `{"<cid>": "<path>"}`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let paths: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(Self { paths })
    }

    /// Load a map written as a JSON object file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LeafletError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| LeafletError::InvalidMediaMap {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_json(&raw).map_err(|detail| LeafletError::InvalidMediaMap {
            path: path.to_path_buf(),
            detail,
        })
    }

    /// Rewrite every image target that is a known token.
    ///
    /// Targets without an entry are kept as-is and logged.
    pub fn apply(&self, markdown: &str) -> String {
        if self.is_empty() {
            return markdown.to_string();
        }
        RE_IMAGE_TARGET
            .replace_all(markdown, |caps: &regex::Captures<'_>| {
                let target = &caps[2];
                match self.get(target) {
                    Some(path) => format!("{}{}{}", &caps[1], path, &caps[3]),
                    None => {
                        debug!("No media path for image target '{}'", target);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

impl FromIterator<(String, String)> for MediaMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// Resolve each image once through `resolve` and collect the results.
///
/// `resolve` is the download step: given an image, it returns the path the
/// Markdown should point at. Failures are logged and the image is left
/// unresolved; repeated tokens are resolved only the first time.
pub fn resolve_media<F, E>(images: &[ImageRef], mut resolve: F) -> MediaMap
where
    F: FnMut(&ImageRef) -> Result<String, E>,
    E: fmt::Display,
{
    let mut map = MediaMap::new();
    for image in images {
        if map.get(image.token()).is_some() {
            continue;
        }
        match resolve(image) {
            Ok(path) => map.insert(image.token(), path),
            Err(e) => warn!("Failed to resolve image {}: {}", image.token(), e),
        }
    }
    map
}
