use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while converting a document.
///
/// The public `convert` surface never returns these; they are used between
/// pipeline stages and degrade to a logged fallback at the top.
#[derive(Debug, Error)]
pub enum PrestoError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_displays_location() {
        let err = PrestoError::MarkdownAdapter {
            message: "unexpected end".into(),
            location: SourceLocation::new(3, 7),
        };
        assert_eq!(err.to_string(), "Parse error at 3:7: unexpected end");
    }
}
