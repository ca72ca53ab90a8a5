//! Escaping for text interpolated into generated Typst.
//!
//! Every piece of user-controlled text that reaches the output goes through
//! one of these two functions, chosen by the syntactic position it lands in.

/// Escapes `s` for a Typst string literal (`"..."`).
///
/// Backslash and quote are escaped so the literal cannot be closed early;
/// line breaks and tabs use their escape sequences so the literal stays on
/// one line.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Characters with markup meaning anywhere in a line.
fn is_markup_special(c: char) -> bool {
    matches!(
        c,
        '\\' | '#' | '[' | ']' | '*' | '_' | '`' | '$' | '<' | '>' | '@' | '~'
    )
}

/// Escapes `s` for Typst markup, including content blocks (`[...]`).
///
/// Besides the inline control characters, list, enum, heading and term
/// starters at the beginning of a line are escaped, as is the second slash
/// of a `//` comment opener.
pub fn escape_content(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut chars = s.chars().peekable();
    let mut at_line_start = true;
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        if at_line_start {
            match c {
                ' ' | '\t' => {
                    out.push(c);
                    prev = Some(c);
                    continue;
                }
                '=' | '-' | '+' | '/' => {
                    out.push('\\');
                    out.push(c);
                    at_line_start = false;
                    prev = Some(c);
                    continue;
                }
                d if d.is_ascii_digit() => {
                    out.push(d);
                    while let Some(&next) = chars.peek() {
                        if !next.is_ascii_digit() {
                            break;
                        }
                        out.push(next);
                        chars.next();
                    }
                    if chars.peek() == Some(&'.') {
                        chars.next();
                        out.push_str("\\.");
                        prev = Some('.');
                    } else {
                        prev = Some(d);
                    }
                    at_line_start = false;
                    continue;
                }
                _ => at_line_start = false,
            }
        }

        if c == '\n' {
            out.push(c);
            at_line_start = true;
        } else if is_markup_special(c) || (c == '/' && prev == Some('/')) {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
        prev = Some(c);
    }

    out
}
