#![deny(missing_docs)]
//! Typst back end for presto: the Markdown renderer, image layout, document
//! templates and assembly.
//!
//! ```
//! use presto_typst::{convert, templates::Gongwen};
//!
//! let typst = convert(&Gongwen, "---\ntitle: 通知\n---\n\n正文");
//! assert!(typst.contains("#let autoTitle = \"通知\""));
//! ```

/// Whole-document assembly and the top-level conversion entry points.
pub mod assemble;
/// Image sizing and row packing.
pub mod layout;
/// Markdown AST to Typst rendering.
pub mod renderer;
/// Built-in document templates.
pub mod templates;

pub use assemble::{assemble, convert, convert_with_options, format_date};
pub use layout::{ImageGroup, ImageRef, ImageRow, ImageSize};
pub use renderer::{BodyResult, Options, render_body};
pub use templates::{Gongwen, Jiaoan, TEMPLATE_IDS, Template, template_by_id};
