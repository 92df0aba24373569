//! # mdpad-render: debounced markdown preview
//!
//! Turns the raw buffer text into sanitized HTML for the preview pane.
//!
//! ```text
//!  keystroke ──► RenderPipeline::input()
//!                      │  Debouncer (100ms quiet, 1000ms max wait)
//!                      ▼
//!               MarkdownRenderer::render()
//!                 1. pulldown-cmark (html, linkify, typographer)
//!                 2. syntect highlight per fenced block
//!                 3. emoji, footnotes, ~sub~, ^sup^
//!                 4. ammonia sanitize
//!                      │
//!                      ▼
//!               RenderSurface (keeps last good output on failure)
//! ```
//!
//! ## Modules
//!
//! - [`debounce`]: deadline-driven debouncer with max wait
//! - [`markdown`]: the markdown → HTML transformation
//! - [`highlight`]: syntect code block highlighting
//! - [`emoji`]: `:shortcode:` expansion
//! - [`linkify`]: bare URL detection
//! - [`pipeline`]: debouncer + renderer + surface
//! - [`preview`]: standalone preview page with theme stylesheet

pub mod debounce;
pub mod emoji;
pub mod highlight;
pub mod linkify;
pub mod markdown;
pub mod pipeline;
pub mod preview;

pub use debounce::Debouncer;
pub use highlight::Highlighter;
pub use markdown::{MarkdownRenderer, RenderError, Transform};
pub use pipeline::{RenderConfig, RenderPipeline, RenderSurface};
pub use preview::preview_document;
