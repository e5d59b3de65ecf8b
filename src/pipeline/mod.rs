//! Pipeline stages for Leaflet-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step. The leaf
//! stages are pure functions over borrowed input; only [`dispatch`] keeps
//! an accumulator, and it lives for a single document.
//!
//! ## Data Flow
//!
//! ```text
//! block value ──▶ decode ──▶ dispatch ──┬─▶ facet     (text blocks)
//!  (opaque JSON)  ($type,    (per tag)  ├─▶ list ─▶ facet
//!                 payload)              ├─▶ post_ref  (embedded posts)
//!                                       └─▶ code / image (inline)
//! ```
//!
//! 1. [`decode`]   — read `$type`, then the payload shape it implies
//! 2. [`dispatch`] — route each block, collect images and skipped units
//! 3. [`facet`]    — apply byte-range annotations to plaintext
//! 4. [`list`]     — nested unordered lists, depth-first
//! 5. [`post_ref`] — AT-URI → link or shortcode

pub mod decode;
pub mod dispatch;
pub mod facet;
pub mod list;
pub mod post_ref;
