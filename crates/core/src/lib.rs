#![deny(missing_docs)]
//! presto core: front matter, punctuation normalization, markers, Typst
//! escaping, and Markdown parsing.

/// Code fence detection utilities.
pub mod code_fence;
/// Core error types.
pub mod error;
/// Typst string and content escaping.
pub mod escape;
/// YAML front matter extraction.
pub mod frontmatter;
/// Paragraph, trailing, and block markers.
pub mod markers;
/// Markdown parsing utilities and preprocessing hooks.
pub mod parse;
/// Full-width punctuation normalization.
pub mod punctuation;

pub use error::{PrestoError, SourceLocation};
pub use escape::{escape_content, escape_string};
pub use frontmatter::{
    AUTHOR_SEPARATOR, FrontMatter, FrontmatterError, MetaValue, PLACEHOLDER, parse_front_matter,
};
pub use markers::{ParagraphMarker, TrailingMarker, paragraph_marker, split_trailing_marker};
pub use parse::{ParseOptions, ParserPipeline, TextTransform, parse_mdast};
pub use punctuation::normalize_punctuation;

pub use code_fence::{FenceState, LineOutcome, advance_fence_state};
