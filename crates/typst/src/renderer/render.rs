//! Rendering functions for the Typst renderer.

use super::context::{Context, Scope};
use super::images::render_images;
use crate::layout::ImageRef;
use markdown::mdast::Node;
use presto_core::escape_string;
use presto_core::markers::{
    ends_with_colon, is_noindent_end, is_noindent_start, strip_rendered_marker,
};
use presto_core::{TrailingMarker, paragraph_marker, split_trailing_marker};

const NOINDENT_OPEN: &str = "#block[#set par(first-line-indent: 0pt)\n";

/// Extracts the plain text of inline nodes for marker detection.
///
/// Soft line breaks read as spaces; inline code and image alt text count as
/// text.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        plain_text_of(node, &mut text);
    }
    text
}

fn plain_text_of(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value.replace('\n', " ")),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Image(img) => buffer.push_str(&img.alt),
        Node::ImageReference(img) => buffer.push_str(&img.alt),
        Node::Break(_) => buffer.push(' '),
        Node::Html(_) => {}
        other => {
            if let Some(children) = other.children() {
                for child in children {
                    plain_text_of(child, buffer);
                }
            }
        }
    }
}

/// Wraps rendered content in the zero-indent container.
fn noindent_block(content: &str) -> String {
    format!("{NOINDENT_OPEN}#block[\n{content}\n\n]\n]\n")
}

/// Renders the document root, handling no-indent regions.
///
/// A region opened by a start sentinel runs to the matching end sentinel,
/// or to the end of the document when it is never closed.
pub fn render_root(root: &markdown::mdast::Root, ctx: &mut Context) {
    collect_definitions(&root.children, ctx);

    let mut children = root.children.iter();
    while let Some(child) = children.next() {
        let opens_region = matches!(child, Node::Html(html) if is_noindent_start(&html.value));
        if !opens_region {
            render_node(child, ctx);
            continue;
        }

        ctx.enter(Scope::NoIndent);
        let inner = ctx.capture(|ctx| {
            for child in children.by_ref() {
                if matches!(child, Node::Html(html) if is_noindent_end(&html.value)) {
                    break;
                }
                render_node(child, ctx);
            }
        });
        ctx.exit();

        ctx.push_raw(NOINDENT_OPEN);
        ctx.push_raw("#block[\n");
        ctx.push_raw(&inner);
        ctx.push_raw("]\n]\n");
    }
}

fn collect_definitions(nodes: &[Node], ctx: &mut Context) {
    for node in nodes {
        match node {
            Node::Definition(def) => ctx.define(&def.identifier, &def.url),
            other => {
                if let Some(children) = other.children() {
                    collect_definitions(children, ctx);
                }
            }
        }
    }
}

/// Images directly inside a paragraph.
fn collect_images(nodes: &[Node], ctx: &Context) -> Vec<ImageRef> {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Image(img) => Some(ImageRef::new(img.url.as_str(), img.alt.as_str())),
            Node::ImageReference(img) => ctx
                .definition(&img.identifier)
                .map(|url| ImageRef::new(url, img.alt.as_str())),
            _ => None,
        })
        .collect()
}

fn render_paragraph(para: &markdown::mdast::Paragraph, ctx: &mut Context) {
    let images = collect_images(&para.children, ctx);
    if !images.is_empty() {
        render_images(&images, ctx);
        ctx.push_raw("\n");
        return;
    }

    let plain = plain_text(&para.children);
    if let Some(marker) = paragraph_marker(&plain) {
        ctx.push_raw(&marker.to_typst());
        return;
    }

    // a quote splits its output per line, so no multi-line wrappers there
    let in_quote = ctx.is_in_quote();
    let leading = !in_quote && ctx.is_leading_paragraph() && !ctx.has_seen_header();
    if !in_quote {
        ctx.finish_leading_paragraph();
    }

    let content = ctx.capture(|ctx| render_inlines(&para.children, ctx));
    let (_, trailing) = split_trailing_marker(plain.trim());

    match trailing {
        Some(TrailingMarker::NoIndent) if !in_quote => {
            let stripped = strip_rendered_marker(&content, TrailingMarker::NoIndent);
            ctx.push_raw(&noindent_block(stripped));
        }
        Some(marker) => {
            ctx.push_raw(strip_rendered_marker(&content, marker));
            ctx.push_raw("\n\n");
        }
        None if leading && ends_with_colon(&content) => {
            ctx.push_raw(&noindent_block(&content));
        }
        None => {
            ctx.push_raw(&content);
            ctx.push_raw("\n\n");
        }
    }
}

fn render_heading(heading: &markdown::mdast::Heading, ctx: &mut Context) {
    ctx.saw_heading();

    // the title comes from front matter
    if heading.depth == 1 {
        return;
    }

    let plain = plain_text(&heading.children);
    let (_, trailing) = split_trailing_marker(plain.trim());
    let content = ctx
        .capture(|ctx| render_inlines(&heading.children, ctx))
        .replace('\n', " ");
    let prefix = "=".repeat(usize::from(heading.depth));

    match trailing {
        Some(TrailingMarker::NoIndent) => {
            let stripped = strip_rendered_marker(&content, TrailingMarker::NoIndent);
            ctx.push_raw(&format!("{NOINDENT_OPEN}{prefix} {stripped}\n]\n\n"));
        }
        Some(marker) => {
            let stripped = strip_rendered_marker(&content, marker);
            ctx.push_raw(&format!("{prefix} {stripped}\n\n"));
        }
        None => ctx.push_raw(&format!("{prefix} {}\n\n", content.trim_end())),
    }
}

/// Renders a list as `-` / `+` items.
///
/// Ordered lists that do not start at 1 get explicit numbers so Typst keeps
/// the source numbering.
fn render_list(list: &markdown::mdast::List, ctx: &mut Context, nested: bool) {
    let explicit_start = list
        .ordered
        .then(|| list.start.unwrap_or(1))
        .filter(|start| *start != 1);

    let mut body = String::new();
    let items = list.children.iter().filter_map(|child| match child {
        Node::ListItem(item) => Some(item),
        _ => None,
    });
    for (index, item) in items.enumerate() {
        match explicit_start {
            Some(start) => body.push_str(&format!("{}. ", start as usize + index)),
            None if list.ordered => body.push_str("+ "),
            None => body.push_str("- "),
        }
        body.push_str(&render_list_item(item, ctx));
        body.push('\n');
    }
    if !nested {
        body.push('\n');
    }

    if ctx.current_scope() == Some(Scope::NoIndent) && !nested {
        ctx.push_raw(NOINDENT_OPEN);
        ctx.push_raw(&body);
        ctx.push_raw("]\n");
    } else {
        ctx.push_raw(&body);
    }
}

/// Renders one item's parts joined by newlines, continuation lines indented
/// under the marker.
fn render_list_item(item: &markdown::mdast::ListItem, ctx: &mut Context) -> String {
    let mut parts = Vec::new();
    for child in &item.children {
        let part = match child {
            Node::Paragraph(para) => ctx.capture(|ctx| render_inlines(&para.children, ctx)),
            Node::List(list) => ctx.capture(|ctx| render_list(list, ctx, true)),
            other => ctx.capture(|ctx| render_node(other, ctx)),
        };
        let part = part.trim_end_matches('\n');
        if !part.is_empty() {
            parts.push(part.to_string());
        }
    }

    let joined = parts.join("\n");
    let mut out = String::with_capacity(joined.len());
    for (i, line) in joined.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str("  ");
            }
        }
        out.push_str(line);
    }
    out
}

fn longest_backtick_run(code: &str) -> usize {
    code.split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

fn is_language_tag(lang: &str) -> bool {
    lang.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.' | '#'))
}

/// Renders a fenced or indented code block verbatim.
fn render_code(code: &markdown::mdast::Code, ctx: &mut Context) {
    let fence = "`".repeat(longest_backtick_run(&code.value).max(2) + 1);
    let lang = code
        .lang
        .as_deref()
        .filter(|lang| is_language_tag(lang))
        .unwrap_or("");

    ctx.push_raw(&fence);
    ctx.push_raw(lang);
    ctx.push_raw("\n");
    if !code.value.is_empty() {
        ctx.push_raw(&code.value);
        ctx.push_raw("\n");
    }
    ctx.push_raw(&fence);
    ctx.push_raw("\n\n");
}

/// Renders each line of each quoted block as its own quote.
fn render_blockquote(quote: &markdown::mdast::Blockquote, ctx: &mut Context) {
    ctx.enter(Scope::Quote);
    let contents: Vec<String> = quote
        .children
        .iter()
        .map(|child| ctx.capture(|ctx| render_node(child, ctx)))
        .collect();
    ctx.exit();

    for content in contents {
        for line in content.trim_end_matches('\n').split('\n') {
            if line.is_empty() {
                continue;
            }
            ctx.push_raw("#quote[");
            ctx.push_raw(line);
            ctx.push_raw("]\n");
        }
    }
    ctx.push_raw("\n");
}

fn render_html(html: &markdown::mdast::Html) {
    if !is_noindent_start(&html.value) && !is_noindent_end(&html.value) {
        log::debug!(
            "Dropping raw HTML: {}",
            html.value.chars().take(40).collect::<String>()
        );
    }
}

/// Renders inline children into the current buffer.
pub fn render_inlines(nodes: &[Node], ctx: &mut Context) {
    for node in nodes {
        render_inline(node, ctx);
    }
}

fn is_autolink(link: &markdown::mdast::Link) -> bool {
    match link.children.as_slice() {
        [Node::Text(text)] => {
            text.value == link.url
                || link
                    .url
                    .strip_prefix("mailto:")
                    .is_some_and(|address| address == text.value)
        }
        _ => false,
    }
}

fn render_link(url: &str, children: &[Node], autolink: bool, ctx: &mut Context) {
    ctx.push_raw("#link(\"");
    ctx.push_raw(&escape_string(url));
    ctx.push_raw("\")");
    if !autolink {
        ctx.push_raw("[");
        render_inlines(children, ctx);
        ctx.push_raw("]");
    }
}

fn render_inline_code(value: &str, ctx: &mut Context) {
    if value.contains('`') {
        ctx.push_raw("#raw(\"");
        ctx.push_raw(&escape_string(value));
        ctx.push_raw("\")");
    } else {
        ctx.push_raw("`");
        ctx.push_raw(value);
        ctx.push_raw("`");
    }
}

fn render_inline(node: &Node, ctx: &mut Context) {
    match node {
        Node::Text(text) => ctx.push_text(&text.value),
        Node::Emphasis(emphasis) => {
            ctx.push_raw("#emph[");
            render_inlines(&emphasis.children, ctx);
            ctx.push_raw("]");
        }
        Node::Strong(strong) => {
            ctx.push_raw("#strong[");
            render_inlines(&strong.children, ctx);
            ctx.push_raw("]");
        }
        Node::InlineCode(code) => render_inline_code(&code.value, ctx),
        Node::Link(link) => render_link(&link.url, &link.children, is_autolink(link), ctx),
        Node::LinkReference(reference) => match ctx.definition(&reference.identifier) {
            Some(url) => {
                let url = url.to_string();
                render_link(&url, &reference.children, false, ctx);
            }
            None => render_inlines(&reference.children, ctx),
        },
        Node::Break(_) => ctx.push_raw(" \\\n"),
        Node::Image(_) | Node::ImageReference(_) => {}
        Node::Html(html) => render_html(html),
        other => {
            log::warn!("Unhandled inline node type: {:?}", other);
            if let Some(children) = other.children() {
                render_inlines(children, ctx);
            }
        }
    }
}

/// Renders a block node into the current buffer.
pub fn render_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Root(root) => render_root(root, ctx),
        Node::Paragraph(para) => render_paragraph(para, ctx),
        Node::Heading(heading) => render_heading(heading, ctx),
        Node::List(list) => render_list(list, ctx, false),
        Node::Code(code) => render_code(code, ctx),
        Node::Blockquote(quote) => render_blockquote(quote, ctx),
        Node::ThematicBreak(_) => ctx.push_raw("#line(length: 100%)\n\n"),
        Node::Html(html) => render_html(html),
        // collected up front
        Node::Definition(_) => {}
        Node::ListItem(item) => {
            let item = render_list_item(item, ctx);
            ctx.push_raw(&item);
        }
        _ => {
            log::warn!("Unhandled markdown node type: {:?}", node);
            if let Some(children) = node.children() {
                for child in children {
                    render_node(child, ctx);
                }
            }
        }
    }
}
