//! Turning raw exercise files into standalone, sandbox-ready documents
//!
//! `dialect` classifies a file, `rewrite` applies textual compatibility
//! shims, `synthesize` builds the final document, and `live_reload` adds
//! the optional polling augmentation.

pub mod dialect;
pub mod live_reload;
pub mod rewrite;
pub mod synthesize;

pub use dialect::Dialect;
pub use synthesize::{DocumentSynthesizer, html_escape, inject_ui_runtime};
