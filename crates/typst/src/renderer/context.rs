//! Rendering context for the Typst renderer.

use super::{BodyResult, Options};
use crate::layout::{ImageRef, ImageSize};
use presto_core::{escape_content, normalize_punctuation};
use std::collections::HashMap;

/// Block containers that change how their children render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A `::: {.noindent}` region.
    NoIndent,
    /// A block quote; its output is split into one quote per line.
    Quote,
}

/// State carried through one render pass.
///
/// Created fresh per document, so figure numbering and the heading flag
/// never leak between conversions.
pub struct Context<'a> {
    /// Output buffer for the block or capture currently being rendered.
    pub current: String,

    options: &'a Options,

    /// Last figure number handed out.
    figure_counter: usize,
    /// Set by the first heading.
    has_seen_header: bool,
    /// Set once the first text paragraph has been rendered.
    leading_paragraph_done: bool,
    stack: Vec<Scope>,

    /// Link reference definitions, keyed by normalized identifier.
    definitions: HashMap<String, String>,
}

impl<'a> Context<'a> {
    /// Creates a new context.
    pub fn new(options: &'a Options) -> Self {
        Self {
            current: String::with_capacity(4096),
            options,
            figure_counter: 0,
            has_seen_header: false,
            leading_paragraph_done: false,
            stack: Vec::new(),
            definitions: HashMap::new(),
        }
    }

    /// Writes Typst to the buffer without escaping.
    pub fn push_raw(&mut self, s: &str) {
        self.current.push_str(s);
    }

    /// Writes document text: punctuation normalized, then escaped for markup.
    pub fn push_text(&mut self, s: &str) {
        let text = if self.options.normalize_punctuation {
            normalize_punctuation(s)
        } else {
            s.into()
        };
        let escaped = escape_content(&text);

        // `#f[..]` followed by `(` or `.` would continue the call
        if self.current.ends_with([']', ')']) && escaped.starts_with(['(', '.']) {
            self.current.push('\\');
        }
        self.current.push_str(&escaped);
    }

    /// Runs `f` against an empty buffer and returns what it wrote.
    pub fn capture(&mut self, f: impl FnOnce(&mut Self)) -> String {
        let saved = std::mem::take(&mut self.current);
        f(self);
        std::mem::replace(&mut self.current, saved)
    }

    /// Hands out the next figure number.
    pub fn next_figure(&mut self) -> usize {
        self.figure_counter += 1;
        self.figure_counter
    }

    /// Records a heading of any level, including a dropped level one.
    pub fn saw_heading(&mut self) {
        self.has_seen_header = true;
    }

    /// Whether any heading has been seen.
    pub fn has_seen_header(&self) -> bool {
        self.has_seen_header
    }

    /// Whether the next text paragraph is the document's first.
    pub fn is_leading_paragraph(&self) -> bool {
        !self.leading_paragraph_done
    }

    /// Marks the leading paragraph as rendered.
    pub fn finish_leading_paragraph(&mut self) {
        self.leading_paragraph_done = true;
    }

    /// Returns the innermost scope, if any.
    pub fn current_scope(&self) -> Option<Scope> {
        self.stack.last().copied()
    }

    /// Returns whether rendering happens anywhere inside a block quote.
    pub fn is_in_quote(&self) -> bool {
        self.stack.contains(&Scope::Quote)
    }

    /// Pushes a new scope onto the stack.
    pub fn enter(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    /// Pops the current scope.
    pub fn exit(&mut self) -> Option<Scope> {
        self.stack.pop()
    }

    /// Registers a link reference definition; the first one wins.
    pub fn define(&mut self, identifier: &str, url: &str) {
        self.definitions
            .entry(identifier.to_string())
            .or_insert_with(|| url.to_string());
    }

    /// Looks up a link reference definition.
    pub fn definition(&self, identifier: &str) -> Option<&str> {
        self.definitions.get(identifier).map(String::as_str)
    }

    /// Known natural sizes for all of `images`, or `None` if any is missing
    /// or unusable.
    pub fn known_sizes(&self, images: &[ImageRef]) -> Option<Vec<ImageSize>> {
        images
            .iter()
            .map(|img| {
                self.options
                    .image_sizes
                    .get(&img.path)
                    .copied()
                    .filter(ImageSize::is_usable)
            })
            .collect()
    }

    /// Consumes the context and returns the rendered body.
    pub fn finish(self) -> BodyResult {
        BodyResult {
            typst: self.current,
            figure_count: self.figure_counter,
        }
    }
}
