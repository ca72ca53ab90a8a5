//! Markdown parsing with text-level preprocessing hooks.

use crate::markers::rewrite_noindent_fences;
use crate::{PrestoError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};
use std::borrow::Cow;

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Keep raw HTML as `Html` nodes (required for no-indent sentinels).
    pub raw_html: bool,
    /// Turn bare `www.`/`http://` text into links.
    pub autolink_literals: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
}

impl ParseOptions {
    /// CommonMark as the document templates expect it.
    pub const fn document() -> Self {
        Self {
            raw_html: true,
            autolink_literals: false,
            code_indented: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        markdown::ParseOptions {
            constructs: markdown::Constructs {
                // Front matter is split off before parsing.
                frontmatter: false,
                code_indented: self.code_indented,
                html_flow: self.raw_html,
                html_text: self.raw_html,
                gfm_autolink_literal: self.autolink_literals,
                ..markdown::Constructs::default()
            },
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::document()
    }
}

/// Trait for preprocessing raw markdown text before parsing.
pub trait TextTransform {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Configurable parsing pipeline with optional text transforms.
pub struct ParserPipeline {
    options: markdown::ParseOptions,
    text_transforms: Vec<Box<dyn TextTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline from markdown-rs parse options.
    pub fn new(options: markdown::ParseOptions) -> Self {
        Self {
            options,
            text_transforms: Vec::new(),
        }
    }

    /// The pipeline used for document bodies: marker pre-pass, then CommonMark.
    pub fn document() -> Self {
        let mut pipeline = Self::new(ParseOptions::document().to_markdown());
        pipeline.add_text_transform(rewrite_noindent_fences);
        pipeline
    }

    /// Add a text preprocessor transform.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Parse markdown into MDAST using the configured pipeline.
    pub fn parse(&self, input: &str) -> Result<Node, PrestoError> {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }

        parse_mdast_with_options(&current, &self.options)
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, PrestoError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, PrestoError> {
    markdown::to_mdast(input, options).map_err(|err| PrestoError::MarkdownAdapter {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}
