//! Configuration types for Leaflet-to-Markdown conversion.
//!
//! The converter has almost no knobs: the only behavioural switch is how
//! embedded Bluesky posts are rendered ([`RenderMode`]). Both settings are
//! fixed when the [`crate::Converter`] is constructed; nothing can be changed
//! per document or per block.

use crate::error::LeafletError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default base for profile and post URLs.
pub const DEFAULT_PROFILE_BASE: &str = "https://bsky.app/profile";

/// Configuration for a Leaflet-to-Markdown conversion.
///
/// Built via [`ConverterConfig::builder()`] or using
/// [`ConverterConfig::default()`].
///
/// # Example
/// ```rust
/// use leaflet2md::{ConverterConfig, RenderMode};
///
/// let config = ConverterConfig::builder()
///     .render_mode(RenderMode::Shortcode)
///     .build()
///     .unwrap();
/// assert_eq!(config.render_mode, RenderMode::Shortcode);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// How `pub.leaflet.blocks.bskyPost` blocks are rendered. Default: [`RenderMode::Link`].
    pub render_mode: RenderMode,

    /// Base URL for account profiles, without a trailing slash.
    /// Default: `https://bsky.app/profile`.
    ///
    /// Mentions link to `{profile_base}/{did}` and post references to
    /// `{profile_base}/{did}/post/{rkey}`.
    pub profile_base: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            profile_base: DEFAULT_PROFILE_BASE.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Profile URL for an account identifier.
    pub fn profile_url(&self, did: &str) -> String {
        format!("{}/{}", self.profile_base, did)
    }

    /// Web URL for a post owned by `did` with record key `rkey`.
    pub fn post_url(&self, did: &str, rkey: &str) -> String {
        format!("{}/{}/post/{}", self.profile_base, did, rkey)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.config.render_mode = mode;
        self
    }

    pub fn profile_base(mut self, base: impl Into<String>) -> Self {
        self.config.profile_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, LeafletError> {
        let base = &self.config.profile_base;
        let host = base
            .strip_prefix("https://")
            .or_else(|| base.strip_prefix("http://"));
        match host {
            Some(rest) if !rest.is_empty() => Ok(self.config),
            Some(_) => Err(LeafletError::InvalidConfig(format!(
                "profile base '{}' has no host",
                base
            ))),
            None => Err(LeafletError::InvalidConfig(format!(
                "profile base must be an http(s) URL, got '{}'",
                base
            ))),
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How an embedded Bluesky post is written into the Markdown.
///
/// | Mode | Output |
/// |------|--------|
/// | `link` | `> [View on Bluesky](https://bsky.app/profile/{did}/post/{rkey})` |
/// | `shortcode` | `{{< bsky did="{did}" postid="{rkey}" >}}` |
///
/// The shortcode form is meant for a Hugo site that ships a `bsky`
/// shortcode and expands it into a rich embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Blockquote with a plain link to the post. (default)
    #[default]
    Link,
    /// Hugo shortcode carrying the DID and record key as attributes.
    Shortcode,
}

impl FromStr for RenderMode {
    type Err = LeafletError;

    /// An empty string selects the default mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "link" => Ok(RenderMode::Link),
            "shortcode" => Ok(RenderMode::Shortcode),
            other => Err(LeafletError::InvalidConfig(format!(
                "unknown render mode '{}' (expected 'link' or 'shortcode')",
                other
            ))),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Link => f.write_str("link"),
            RenderMode::Shortcode => f.write_str("shortcode"),
        }
    }
}
