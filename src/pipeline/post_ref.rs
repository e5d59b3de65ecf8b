//! Embedded Bluesky post references.
//!
//! An AT-URI such as `at://did:plc:abc123/app.bsky.feed.post/3mbrxzvw36c22`
//! names the owning account (first path segment) and the record key (last
//! segment). The rendering depends on the converter-wide [`RenderMode`].

use crate::config::{ConverterConfig, RenderMode};

const AT_SCHEME: &str = "at://";

/// Owner and record key extracted from a post AT-URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostLocator<'a> {
    /// Account identifier (usually a DID, possibly a handle).
    pub did: &'a str,
    /// Record key of the post.
    pub rkey: &'a str,
}

impl<'a> PostLocator<'a> {
    /// Split `uri` into owner and record key.
    ///
    /// The `at://` prefix is optional. With a single path segment, owner and
    /// record key are the same string. Never fails.
    pub fn parse(uri: &'a str) -> Self {
        let rest = uri.strip_prefix(AT_SCHEME).unwrap_or(uri);
        let did = rest.split('/').next().unwrap_or(rest);
        let rkey = rest.rsplit('/').next().unwrap_or(rest);
        Self { did, rkey }
    }
}

/// Render a post reference without the trailing blank line.
pub fn render_post_ref(uri: &str, config: &ConverterConfig) -> String {
    let post = PostLocator::parse(uri);
    match config.render_mode {
        RenderMode::Link => format!(
            "> [View on Bluesky]({})",
            config.post_url(post.did, post.rkey)
        ),
        RenderMode::Shortcode => format!(
            "{{{{< bsky did=\"{}\" postid=\"{}\" >}}}}",
            post.did, post.rkey
        ),
    }
}
