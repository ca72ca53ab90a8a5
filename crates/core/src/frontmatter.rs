use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Placeholder used for `title` and `author` when the document omits them.
pub const PLACEHOLDER: &str = "请输入文字";

/// Separator used when `author` is given as a sequence.
pub const AUTHOR_SEPARATOR: &str = "、";

/// Document metadata derived from the leading YAML block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    /// Document title, `|` separates title lines.
    pub title: String,
    /// Author, multiple authors joined with [`AUTHOR_SEPARATOR`].
    pub author: String,
    /// Raw date text; formatting happens at assembly time.
    pub date: String,
    /// Whether the document ends with a signature block.
    pub signature: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: PLACEHOLDER.to_string(),
            author: PLACEHOLDER.to_string(),
            date: String::new(),
            signature: false,
        }
    }
}

/// Shape of a metadata value as far as the recognized keys care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// A YAML string.
    Text(String),
    /// A YAML number, kept in its textual form.
    Number(String),
    /// A sequence of scalars, each stringified.
    List(Vec<String>),
    /// A YAML boolean.
    Bool(bool),
    /// Missing, null, or a shape no key accepts (mappings).
    Absent,
}

impl MetaValue {
    /// Classifies an optional YAML value.
    pub fn from_yaml(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) | Some(Value::Mapping(_)) => MetaValue::Absent,
            Some(Value::String(s)) => MetaValue::Text(s.clone()),
            Some(Value::Number(n)) => MetaValue::Number(n.to_string()),
            Some(Value::Bool(b)) => MetaValue::Bool(*b),
            Some(Value::Sequence(items)) => {
                MetaValue::List(items.iter().filter_map(scalar_to_string).collect())
            }
            Some(Value::Tagged(tagged)) => MetaValue::from_yaml(Some(&tagged.value)),
        }
    }

    /// Scalar values rendered as text; sequences and absent values yield `None`.
    fn scalar_text(&self) -> Option<String> {
        match self {
            MetaValue::Text(s) | MetaValue::Number(s) => Some(s.clone()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::List(_) | MetaValue::Absent => None,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

impl FrontMatter {
    /// Decodes the recognized keys of a metadata mapping, falling back to the
    /// per-key default. Unknown keys are ignored.
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let get = |key: &str| MetaValue::from_yaml(mapping.get(key));
        let mut fm = FrontMatter::default();

        if let Some(title) = get("title").scalar_text() {
            fm.title = title;
        }

        match get("author") {
            MetaValue::Text(author) => fm.author = author,
            MetaValue::List(authors) => fm.author = authors.join(AUTHOR_SEPARATOR),
            _ => {}
        }

        if let Some(date) = get("date").scalar_text() {
            fm.date = date;
        }

        fm.signature = match get("signature") {
            MetaValue::Bool(b) => b,
            MetaValue::Text(s) => {
                let lower = s.to_lowercase();
                lower == "true" || lower == "yes"
            }
            _ => false,
        };

        fm
    }
}

/// A located front-matter block.
#[derive(Debug, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    /// Raw YAML between the delimiters.
    pub yaml: &'a str,
    /// Byte offset inside the searched text where the body begins.
    pub body_start: usize,
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits metadata from the body, never failing.
///
/// Line endings are normalized first. A missing or unterminated block yields
/// defaults and the whole text; an unparseable block yields defaults and the
/// body that follows it. The body loses its single leading blank line.
pub fn parse_front_matter(input: &str) -> (FrontMatter, String) {
    let normalized = input.replace("\r\n", "\n");

    let block = match find_yaml_block(&normalized) {
        Ok(Some(block)) => block,
        Ok(None) => return (FrontMatter::default(), normalized),
        Err(err) => {
            log::debug!("treating document as body only: {err}");
            return (FrontMatter::default(), normalized);
        }
    };

    let rest = &normalized[block.body_start..];
    let body = rest.strip_prefix('\n').unwrap_or(rest).to_string();

    match parse_yaml_block(block.yaml) {
        Ok(mapping) => (FrontMatter::from_mapping(&mapping), body),
        Err(err) => {
            log::warn!("ignoring malformed front matter: {err}");
            (FrontMatter::default(), body)
        }
    }
}

/// Parses the YAML between the delimiters into a mapping.
pub fn parse_yaml_block(block: &str) -> Result<Mapping, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Locates a `---` delimited block that starts on the first line.
pub fn find_yaml_block(input: &str) -> Result<Option<FrontmatterBlock<'_>>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);

    let Some((first, block_start)) = next_line(without_bom, 0) else {
        return Ok(None);
    };
    if !is_yaml_fence(first) {
        return Ok(None);
    }

    let mut scan_cursor = block_start;
    loop {
        match next_line(without_bom, scan_cursor) {
            Some((line, next_cursor)) => {
                if is_yaml_fence(line) {
                    let raw_block = &without_bom[block_start..scan_cursor];
                    return Ok(Some(FrontmatterBlock {
                        yaml: raw_block.trim_end_matches(['\r', '\n']),
                        body_start: bom_len + next_cursor,
                    }));
                }
                scan_cursor = next_cursor;
            }
            None => return Err(FrontmatterError::Unterminated),
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        Some((&input[start..line_end], line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_defaults_when_no_frontmatter() {
        let input = "# 标题\n\n正文";
        let (fm, body) = parse_front_matter(input);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, input);
    }

    #[test]
    fn parses_basic_fields() {
        let input = "---\ntitle: 测试\nauthor: 王五\ndate: 2024-03-01\n---\n\n你好\n";
        let (fm, body) = parse_front_matter(input);
        assert_eq!(fm.title, "测试");
        assert_eq!(fm.author, "王五");
        assert_eq!(fm.date, "2024-03-01");
        assert!(!fm.signature);
        assert_eq!(body, "你好\n");
    }

    #[test]
    fn joins_author_list() {
        let input = "---\nauthor:\n  - 张三\n  - 李四\n---\nbody";
        let (fm, _) = parse_front_matter(input);
        assert_eq!(fm.author, "张三、李四");
    }

    #[test]
    fn ignores_author_of_other_shape() {
        let input = "---\nauthor:\n  name: 张三\n---\nbody";
        let (fm, _) = parse_front_matter(input);
        assert_eq!(fm.author, PLACEHOLDER);

        let input = "---\nauthor: true\n---\nbody";
        let (fm, _) = parse_front_matter(input);
        assert_eq!(fm.author, PLACEHOLDER);
    }

    #[test]
    fn stringifies_scalar_title() {
        let (fm, _) = parse_front_matter("---\ntitle: 2024\n---\n");
        assert_eq!(fm.title, "2024");
    }

    #[test]
    fn signature_accepts_bool_and_yes() {
        for (raw, expected) in [
            ("true", true),
            ("false", false),
            ("\"yes\"", true),
            ("\"YES\"", true),
            ("\"True\"", true),
            ("\"no\"", false),
            ("\"on\"", false),
            ("1", false),
        ] {
            let input = format!("---\nsignature: {raw}\n---\nbody");
            let (fm, _) = parse_front_matter(&input);
            assert_eq!(fm.signature, expected, "signature: {raw}");
        }

        let (fm, _) = parse_front_matter("---\ntitle: x\n---\nbody");
        assert!(!fm.signature);
    }

    #[test]
    fn unterminated_block_is_treated_as_body() {
        let input = "---\ntitle: 测试\n正文";
        let (fm, body) = parse_front_matter(input);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, input);
    }

    #[test]
    fn malformed_yaml_keeps_body() {
        let input = "---\ntitle: [unterminated\n---\n正文\n";
        let (fm, body) = parse_front_matter(input);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "正文\n");
    }

    #[test]
    fn non_mapping_root_keeps_body() {
        let input = "---\n- a\n- b\n---\n正文";
        let (fm, body) = parse_front_matter(input);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "正文");
    }

    #[test]
    fn normalizes_crlf_before_search() {
        let input = "---\r\ntitle: 测试\r\n---\r\n\r\n正文\r\n";
        let (fm, body) = parse_front_matter(input);
        assert_eq!(fm.title, "测试");
        assert_eq!(body, "正文\n");
    }

    #[test]
    fn handles_empty_block() {
        let (fm, body) = parse_front_matter("---\n---\n正文");
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "正文");
    }

    #[test]
    fn locates_block_after_bom() {
        let input = "\u{feff}---\nfoo: bar\n---\nBody";
        let block = find_yaml_block(input).unwrap().expect("block should exist");
        assert_eq!(block.yaml, "foo: bar");
        assert_eq!(block.body_start, input.find("Body").unwrap());
    }

    #[test]
    fn delimiter_must_be_first_line() {
        let input = "\n---\ntitle: x\n---\n";
        assert!(find_yaml_block(input).unwrap().is_none());
    }

    #[test]
    fn errors_on_unterminated_block() {
        let err = find_yaml_block("---\ntitle: test").unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (fm, _) = parse_front_matter("---\ntitle: 标题\ntags: [a, b]\n---\n");
        assert_eq!(fm.title, "标题");
        assert_eq!(fm.author, PLACEHOLDER);
    }
}
