//! MDAST-based Markdown to Typst renderer.
//!
//! # Module Structure
//!
//! - `context` - Rendering state (buffer, scopes, figure counter, heading flag)
//! - `render` - AST node rendering functions
//! - `images` - Figure emission for image paragraphs

mod context;
mod images;
pub mod render;

pub use context::{Context, Scope};

use crate::layout::ImageSize;
use presto_core::{ParserPipeline, PrestoError};
use render::render_node;
use std::collections::HashMap;

/// Rendering options.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Whether ASCII punctuation in body text becomes full-width.
    #[serde(default = "default_normalize_punctuation")]
    pub normalize_punctuation: bool,
    /// Natural image sizes in centimetres, keyed by the path as written in
    /// the document. Paragraphs whose images are all listed get a static
    /// layout instead of a render-time measuring script.
    #[serde(default)]
    pub image_sizes: HashMap<String, ImageSize>,
}

fn default_normalize_punctuation() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            normalize_punctuation: default_normalize_punctuation(),
            image_sizes: HashMap::new(),
        }
    }
}

/// Output of one body render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyResult {
    /// Typst markup for the body.
    pub typst: String,
    /// Figures numbered while rendering.
    pub figure_count: usize,
}

/// Renders a Markdown body (front matter already removed) to Typst.
///
/// # Examples
///
/// ```
/// use presto_typst::renderer::{render_body, Options};
///
/// let result = render_body("## 概述\n\n正文", &Options::default()).unwrap();
/// assert!(result.typst.starts_with("== 概述\n\n"));
/// ```
pub fn render_body(body: &str, options: &Options) -> Result<BodyResult, PrestoError> {
    // 1. Rewrite no-indent fences to sentinels, then parse
    let tree = ParserPipeline::document().parse(body)?;

    // 2. Traverse with a fresh context
    let mut ctx = Context::new(options);
    render_node(&tree, &mut ctx);

    Ok(ctx.finish())
}
