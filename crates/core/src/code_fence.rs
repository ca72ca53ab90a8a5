//! Fenced code block tracking for line-based rewrites.
//!
//! The marker pre-pass works on raw lines before Markdown parsing; this
//! tracker tells it which lines belong to a fenced code block so literal
//! `:::` lines in code samples are left alone.

/// Open fence captured at its opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    /// Fence marker character (`` ` `` or `~`).
    pub marker: char,
    /// Number of marker characters in the opener.
    pub length: usize,
}

/// Fence state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// The currently open fence, if any.
    pub open: Option<OpenFence>,
}

impl FenceState {
    /// Whether the state is inside a fenced code block.
    pub fn is_inside(&self) -> bool {
        self.open.is_some()
    }
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether this line is part of a fence (opener, content or closer).
    pub in_code: bool,
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineOutcome {
    let (columns, offset) = leading_whitespace(line);
    let rest = &line[offset..];

    match state.open {
        None => {
            // CommonMark: 4+ columns of indentation is an indented code block.
            let opened = (columns <= 3)
                .then(|| fence_run(rest))
                .flatten()
                .map(|(marker, length)| OpenFence { marker, length });
            LineOutcome {
                next_state: FenceState { open: opened },
                in_code: opened.is_some(),
            }
        }
        Some(open) => {
            let closes = columns <= 3
                && is_bare_fence(rest)
                && fence_run(rest)
                    .is_some_and(|(marker, len)| marker == open.marker && len >= open.length);
            LineOutcome {
                next_state: if closes { FenceState::default() } else { state },
                in_code: true,
            }
        }
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace, tabs
/// expanding to the next multiple of four.
fn leading_whitespace(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => col += 1,
            b'\t' => col += 4 - (col % 4),
            _ => break,
        }
        bytes += 1;
    }
    (col, bytes)
}

fn fence_run(rest: &str) -> Option<(char, usize)> {
    let first = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = rest.chars().take_while(|c| *c == first).count();
    (run >= 3).then_some((first, run))
}

/// A closer carries no info string: markers then optional whitespace.
fn is_bare_fence(rest: &str) -> bool {
    let Some(first) = rest.chars().next() else {
        return false;
    };
    rest.trim_start_matches(first).trim().is_empty()
}
