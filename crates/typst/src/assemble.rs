//! Whole-document assembly: template preamble, metadata bindings, body.

use crate::renderer::{Options, render_body};
use crate::templates::Template;
use once_cell::sync::Lazy;
use presto_core::{FrontMatter, escape_content, escape_string, parse_front_matter};
use regex::Regex;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$").expect("date pattern is valid")
});

/// Formats the front-matter date as a Typst expression.
///
/// `YYYY-MM-DD` (one or two digit month and day) with a plausible month and
/// day becomes a `datetime(..)` constructor; anything else is kept as a
/// string literal.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return "\"\"".to_string();
    }

    let parts = DATE_PATTERN.captures(date).and_then(|caps| {
        let year: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some((year, month, day))
    });

    match parts {
        Some((year, month, day)) => {
            format!("datetime(\n  year: {year},\n  month: {month},\n  day: {day},\n)")
        }
        None => format!("\"{}\"", escape_string(date)),
    }
}

/// Assembles a complete Typst document around an already rendered body.
pub fn assemble(template: &dyn Template, front_matter: &FrontMatter, body: &str) -> String {
    let preamble = template.preamble();
    let mut out = String::with_capacity(preamble.len() + body.len() + 1024);

    out.push_str(preamble);
    if !preamble.is_empty() && !preamble.ends_with('\n') {
        out.push('\n');
    }

    out.push_str(&format!(
        "#let autoTitle = \"{}\"\n\n",
        escape_string(&front_matter.title)
    ));
    out.push_str(&format!(
        "#let autoAuthor = \"{}\"\n\n",
        escape_string(&front_matter.author)
    ));
    out.push_str(&format!(
        "#let autoDate = {}\n\n",
        format_date(&front_matter.date)
    ));

    out.push_str(&format!(
        "#set document(\n  title: autoTitle.replace(\"|\", \" \"),\n  author: autoAuthor,\n  keywords: \"{}\",\n  date: auto,\n)\n\n",
        escape_string(template.keywords())
    ));

    template.write_header(&mut out, front_matter);
    out.push_str(body);
    template.write_footer(&mut out, front_matter);

    out
}

/// Converts a Markdown document (with optional front matter) to Typst.
///
/// Never fails: malformed front matter falls back to defaults, and a body
/// that cannot be parsed is emitted as escaped text.
pub fn convert(template: &dyn Template, input: &str) -> String {
    convert_with_options(template, input, &Options::default())
}

/// [`convert`] with explicit rendering options.
pub fn convert_with_options(template: &dyn Template, input: &str, options: &Options) -> String {
    let (front_matter, body) = parse_front_matter(input);

    let rendered = match render_body(&body, options) {
        Ok(result) => {
            log::debug!(
                "rendered {} body with {} figures",
                template.id(),
                result.figure_count
            );
            result.typst
        }
        Err(err) => {
            log::warn!("emitting body verbatim: {err}");
            let mut text = escape_content(&body);
            text.push('\n');
            text
        }
    };

    assemble(template, &front_matter, &rendered)
}
