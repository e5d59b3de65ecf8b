//! Block dispatch: one decoded block → Markdown appended to the document.
//!
//! [`DocumentSink`] is the single accumulator for one conversion. It owns the
//! Markdown buffer, the image list and the skip log, and it knows which
//! page/block is current so every skipped unit can be located later.

use crate::config::ConverterConfig;
use crate::document::BlockWrapper;
use crate::error::{BlockError, Unit};
use crate::output::{ConversionResult, ConversionStats, ImageRef, SkippedUnit};
use crate::pipeline::decode::{Block, CodeBlock, ImageBlock};
use crate::pipeline::facet::render_facets_into;
use crate::pipeline::list::render_list_into;
use crate::pipeline::post_ref::render_post_ref;
use tracing::debug;

const PARAGRAPH_BREAK: &str = "\n\n";
const DEFAULT_CODE_LANGUAGE: &str = "text";

/// Output accumulator for one document.
pub struct DocumentSink<'c> {
    config: &'c ConverterConfig,
    markdown: String,
    images: Vec<ImageRef>,
    skipped: Vec<SkippedUnit>,
    stats: ConversionStats,
    page: usize,
    block: usize,
}

impl<'c> DocumentSink<'c> {
    pub fn new(config: &'c ConverterConfig) -> Self {
        Self {
            config,
            markdown: String::new(),
            images: Vec::new(),
            skipped: Vec::new(),
            stats: ConversionStats::default(),
            page: 0,
            block: 0,
        }
    }

    /// Render every block of page `page` in order.
    pub fn push_page(&mut self, page: usize, blocks: &[BlockWrapper]) {
        self.stats.pages += 1;
        for (idx, wrapper) in blocks.iter().enumerate() {
            self.page = page;
            self.block = idx;
            match Block::decode(&wrapper.block) {
                Ok(block) => {
                    debug!(page, block = idx, tag = block.tag(), "Rendering block");
                    self.push_block(&block);
                }
                Err(e) => {
                    self.stats.blocks_skipped += 1;
                    self.skip(e);
                }
            }
        }
    }

    /// Render one decoded block at the current position.
    pub fn push_block(&mut self, block: &Block) {
        match block {
            Block::Text(text) => {
                let mut issues = Vec::new();
                let md = render_facets_into(&text.plaintext, &text.facets, self.config, &mut issues);
                self.markdown.push_str(&md);
                self.markdown.push_str(PARAGRAPH_BREAK);
                self.absorb(issues);
            }
            Block::Code(code) => self.push_code(code),
            Block::UnorderedList(list) => {
                let mut issues = Vec::new();
                render_list_into(&mut self.markdown, &list.children, 0, self.config, &mut issues);
                self.markdown.push('\n');
                self.absorb(issues);
            }
            Block::Image(image) => self.push_image(image),
            Block::BskyPost(post) => {
                self.markdown
                    .push_str(&render_post_ref(&post.post_ref.uri, self.config));
                self.markdown.push_str(PARAGRAPH_BREAK);
            }
            Block::Unknown(_) => {
                self.stats.blocks_skipped += 1;
                self.skip(BlockError::UnknownVariant {
                    tag: block.tag().to_string(),
                });
                return;
            }
        }
        self.stats.blocks_rendered += 1;
    }

    /// Fenced block; content is written verbatim, fences inside it are not escaped.
    fn push_code(&mut self, code: &CodeBlock) {
        let lang = code
            .language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_CODE_LANGUAGE);
        self.markdown.push_str("\n```");
        self.markdown.push_str(lang);
        self.markdown.push('\n');
        self.markdown.push_str(&code.plaintext);
        self.markdown.push_str("\n```");
        self.markdown.push_str(PARAGRAPH_BREAK);
    }

    /// The blob CID stands in for the image URL until the caller substitutes it.
    fn push_image(&mut self, image: &ImageBlock) {
        self.markdown.push_str("![");
        self.markdown.push_str(&image.alt);
        self.markdown.push_str("](");
        self.markdown.push_str(&image.image.reference.link);
        self.markdown.push(')');
        self.markdown.push_str(PARAGRAPH_BREAK);
        self.images.push(ImageRef {
            blob: image.image.clone(),
            alt: image.alt.clone(),
        });
        self.stats.images += 1;
    }

    fn absorb(&mut self, issues: Vec<BlockError>) {
        for issue in issues {
            match &issue {
                BlockError::FacetOrderViolation { .. } => self.stats.facets_dropped += 1,
                BlockError::DecodeFailure {
                    unit: Unit::ListItem,
                    ..
                } => self.stats.list_items_skipped += 1,
                _ => {}
            }
            self.skip(issue);
        }
    }

    fn skip(&mut self, error: BlockError) {
        debug!(
            page = self.page,
            block = self.block,
            "Skipping unit: {}",
            error
        );
        self.skipped.push(SkippedUnit {
            page: self.page,
            block: self.block,
            error,
        });
    }

    pub fn finish(self) -> ConversionResult {
        ConversionResult {
            markdown: self.markdown,
            images: self.images,
            skipped: self.skipped,
            stats: self.stats,
        }
    }
}
