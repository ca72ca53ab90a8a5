//! Inline and block markers layered on top of Markdown.
//!
//! - Paragraph markers replace a whole paragraph: `{v}`, `{v:N}`,
//!   `{pagebreak}`, `{pagebreak:weak}`.
//! - Trailing markers adjust a paragraph or heading: `{.noindent}`, `{indent}`.
//! - Fenced no-indent regions (`::: {.noindent}` … `:::`) are rewritten to
//!   HTML comment sentinels before parsing so they survive as `Html` nodes.

use crate::code_fence::{FenceState, advance_fence_state};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Sentinel emitted for a `::: {.noindent}` opener line.
pub const NOINDENT_START: &str = "<!-- noindent-start -->";
/// Sentinel emitted for a `:::` closer line.
pub const NOINDENT_END: &str = "<!-- noindent-end -->";

/// Largest `N` accepted in `{v:N}`; larger counts stay plain text.
pub const MAX_LINE_BREAKS: usize = 100;

const NOINDENT_SUFFIX: &str = "{.noindent}";
const INDENT_SUFFIX: &str = "{indent}";

static V_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{v(?::(\d+))?\}$").expect("v marker pattern is valid"));

/// A marker that stands in for an entire paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphMarker {
    /// `{v}` / `{v:N}`: N forced line breaks.
    LineBreaks(usize),
    /// `{pagebreak}`.
    PageBreak,
    /// `{pagebreak:weak}`: no-op at a page boundary.
    WeakPageBreak,
}

impl ParagraphMarker {
    /// Typst emitted in place of the paragraph.
    pub fn to_typst(self) -> String {
        match self {
            ParagraphMarker::LineBreaks(count) => {
                "#linebreak(justify: false)\n".repeat(count.min(MAX_LINE_BREAKS))
            }
            ParagraphMarker::PageBreak => "#pagebreak()\n".to_string(),
            ParagraphMarker::WeakPageBreak => "#pagebreak(weak: true)\n".to_string(),
        }
    }
}

/// Recognizes a paragraph whose whole trimmed plain text is a marker.
pub fn paragraph_marker(plain: &str) -> Option<ParagraphMarker> {
    let text = plain.trim();
    match text {
        "{pagebreak}" => return Some(ParagraphMarker::PageBreak),
        "{pagebreak:weak}" => return Some(ParagraphMarker::WeakPageBreak),
        _ => {}
    }

    let caps = V_MARKER.captures(text)?;
    let count = match caps.get(1) {
        None => 1,
        Some(n) => match n.as_str().parse::<usize>() {
            Ok(n @ 1..=MAX_LINE_BREAKS) => n,
            _ => return None,
        },
    };
    Some(ParagraphMarker::LineBreaks(count))
}

/// A marker at the end of a paragraph or heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingMarker {
    /// `{.noindent}`: render without first-line indent.
    NoIndent,
    /// `{indent}`: render with the inherited indent.
    Indent,
}

impl TrailingMarker {
    fn suffix(self) -> &'static str {
        match self {
            TrailingMarker::NoIndent => NOINDENT_SUFFIX,
            TrailingMarker::Indent => INDENT_SUFFIX,
        }
    }
}

/// Detects a trailing marker and returns the text without it.
///
/// Trailing spaces before and after the marker are dropped.
pub fn split_trailing_marker(text: &str) -> (&str, Option<TrailingMarker>) {
    let text = text.trim_end_matches(' ');
    for marker in [TrailingMarker::NoIndent, TrailingMarker::Indent] {
        if let Some(stripped) = text.strip_suffix(marker.suffix()) {
            return (stripped.trim_end_matches(' '), Some(marker));
        }
    }
    (text, None)
}

/// Removes a known trailing marker from already-rendered content.
pub fn strip_rendered_marker(content: &str, marker: TrailingMarker) -> &str {
    let content = content.trim_end_matches([' ', '\n']);
    content
        .strip_suffix(marker.suffix())
        .unwrap_or(content)
        .trim_end_matches(' ')
}

/// Rewrites `::: {.noindent}` / `:::` lines into sentinels.
///
/// Lines inside fenced code blocks are copied unchanged.
pub fn rewrite_noindent_fences(body: &str) -> Cow<'_, str> {
    if !body.contains(":::") {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len() + 32);
    let mut state = FenceState::default();

    for line in body.split_inclusive('\n') {
        let outcome = advance_fence_state(line.trim_end_matches('\n'), state);
        state = outcome.next_state;

        let replacement = if outcome.in_code {
            None
        } else {
            fence_sentinel(line)
        };

        match replacement {
            Some(sentinel) => {
                out.push_str(sentinel);
                if line.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str(line),
        }
    }

    Cow::Owned(out)
}

fn fence_sentinel(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_end();
    if trimmed == "::: {.noindent}" {
        Some(NOINDENT_START)
    } else if trimmed == ":::" {
        Some(NOINDENT_END)
    } else {
        None
    }
}

/// Whether an HTML node opens a no-indent region.
pub fn is_noindent_start(html: &str) -> bool {
    first_line(html).contains("noindent-start")
}

/// Whether an HTML node closes a no-indent region.
pub fn is_noindent_end(html: &str) -> bool {
    first_line(html).contains("noindent-end")
}

fn first_line(html: &str) -> &str {
    html.lines().next().unwrap_or("")
}

/// Whether rendered paragraph text reads as a label line (`敬启者：`).
pub fn ends_with_colon(rendered: &str) -> bool {
    let trimmed = rendered.trim();
    trimmed.ends_with('：') || trimmed.ends_with(':')
}
