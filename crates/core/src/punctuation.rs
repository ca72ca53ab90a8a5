//! Full-width punctuation for Chinese prose.
//!
//! ASCII `,` `;` `?` `(` `)` and `:` are rewritten to their full-width forms.
//! A colon between two digits (`12:30`) is kept. URL-like spans and `{...}`
//! markers are excluded from every substitution.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://\S+|ftp://\S+|mailto:\S+").expect("url pattern is valid")
});

static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}\n]*\}").expect("marker pattern is valid"));

/// Byte ranges that must be copied through unchanged.
///
/// Built once per input from the URL and marker scans; ranges are sorted and
/// merged so lookups during the forward pass only ever advance.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    spans: Vec<Range<usize>>,
}

impl ExclusionSet {
    /// Scans `text` for URL-like spans and `{...}` markers.
    pub fn scan(text: &str) -> Self {
        let mut spans: Vec<Range<usize>> = URL_PATTERN
            .find_iter(text)
            .chain(MARKER_PATTERN.find_iter(text))
            .map(|m| m.range())
            .collect();
        spans.sort_by_key(|span| span.start);

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }

        Self { spans: merged }
    }

    /// The merged spans in ascending order.
    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    fn cursor(&self) -> ExclusionCursor<'_> {
        ExclusionCursor {
            spans: &self.spans,
            index: 0,
        }
    }
}

/// Forward-only membership test over an [`ExclusionSet`].
struct ExclusionCursor<'a> {
    spans: &'a [Range<usize>],
    index: usize,
}

impl ExclusionCursor<'_> {
    /// Offsets must be queried in non-decreasing order.
    fn contains(&mut self, offset: usize) -> bool {
        while let Some(span) = self.spans.get(self.index) {
            if offset < span.end {
                return offset >= span.start;
            }
            self.index += 1;
        }
        false
    }
}

fn full_width(c: char) -> Option<char> {
    match c {
        ',' => Some('，'),
        ';' => Some('；'),
        '?' => Some('？'),
        '(' => Some('（'),
        ')' => Some('）'),
        ':' => Some('：'),
        _ => None,
    }
}

/// Rewrites half-width punctuation to full-width outside excluded spans.
///
/// Returns the input unchanged (borrowed) when there is nothing to rewrite.
pub fn normalize_punctuation(text: &str) -> Cow<'_, str> {
    if !text.contains([',', ';', '?', '(', ')', ':']) {
        return Cow::Borrowed(text);
    }

    let exclusions = ExclusionSet::scan(text);
    let mut cursor = exclusions.cursor();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = String::with_capacity(text.len() + 8);

    for (i, &(offset, c)) in chars.iter().enumerate() {
        if cursor.contains(offset) {
            out.push(c);
            continue;
        }

        match full_width(c) {
            Some(_) if c == ':' && between_digits(&chars, i) => out.push(c),
            Some(replacement) => out.push(replacement),
            None => out.push(c),
        }
    }

    if out == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(out)
    }
}

fn between_digits(chars: &[(usize, char)], i: usize) -> bool {
    let prev = i.checked_sub(1).and_then(|p| chars.get(p));
    let next = chars.get(i + 1);
    matches!((prev, next), (Some((_, a)), Some((_, b))) if is_digit(*a) && is_digit(*b))
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn converts_basic_punctuation() {
        assert_eq!(normalize_punctuation("a,b?c"), "a，b？c");
        assert_eq!(normalize_punctuation("甲;乙(丙)"), "甲；乙（丙）");
        assert_eq!(normalize_punctuation("注意:"), "注意：");
    }

    #[test]
    fn keeps_time_like_colons() {
        assert_eq!(normalize_punctuation("12:30"), "12:30");
        assert_eq!(normalize_punctuation("会议于9:00开始,请准时"), "会议于9:00开始，请准时");
        assert_eq!(normalize_punctuation("第1:"), "第1：");
    }

    #[test]
    fn leaves_urls_untouched() {
        assert_eq!(
            normalize_punctuation("见 http://a.com/x,y"),
            "见 http://a.com/x,y"
        );
        assert_eq!(
            normalize_punctuation("邮件:mailto:a@b.c,谢谢 再见,"),
            "邮件：mailto:a@b.c,谢谢 再见，"
        );
        assert_eq!(
            normalize_punctuation("(ftp://x.org/a?b)"),
            "（ftp://x.org/a?b)"
        );
    }

    #[test]
    fn leaves_markers_untouched() {
        assert_eq!(normalize_punctuation("{v:3}"), "{v:3}");
        assert_eq!(normalize_punctuation("好,{pagebreak:weak}"), "好，{pagebreak:weak}");
    }

    #[test]
    fn markers_do_not_span_lines() {
        assert_eq!(normalize_punctuation("{a,\nb}"), "{a，\nb}");
    }

    #[test]
    fn merges_overlapping_spans() {
        let set = ExclusionSet::scan("see {http://a.b/c} and http://x/{y}");
        assert_eq!(set.spans(), &[4..18, 23..35]);
    }

    #[test]
    fn borrows_when_unchanged() {
        assert!(matches!(normalize_punctuation("纯中文"), Cow::Borrowed(_)));
        assert!(matches!(normalize_punctuation("12:30"), Cow::Borrowed(_)));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[a-z0-9:,;?() {}/.\\u{4e00}-\\u{4e10}]{0,40}") {
            let once = normalize_punctuation(&s).into_owned();
            let twice = normalize_punctuation(&once).into_owned();
            prop_assert_eq!(once, twice);
        }
    }
}
