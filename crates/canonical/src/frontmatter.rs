//! YAML frontmatter handling for rule and agent files.
//!
//! Frontmatter is a block delimited by `---` lines at the top of a file.
//! Parsing is lenient: YAML that `serde_yaml` rejects falls back to a
//! line-oriented `key: value` reader so a sloppy header still yields fields.

use serde_yaml::{Mapping, Value as YamlValue};
use std::fmt::Write as _;
use tracing::warn;

/// Parsed frontmatter fields, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    fields: Mapping,
}

impl Frontmatter {
    /// Parses a frontmatter body (without the `---` delimiters).
    pub fn parse(yaml: &str) -> Self {
        if yaml.trim().is_empty() {
            return Self::default();
        }
        match serde_yaml::from_str::<YamlValue>(yaml) {
            Ok(YamlValue::Mapping(fields)) => Self { fields },
            Ok(YamlValue::Null) => Self::default(),
            Ok(_) => {
                warn!("Frontmatter is not a mapping, reading it line by line");
                Self::parse_lines(yaml)
            }
            Err(e) => {
                warn!(error = %e, "Invalid YAML frontmatter, reading it line by line");
                Self::parse_lines(yaml)
            }
        }
    }

    /// Line-oriented fallback: `key: value` pairs and `- item` lists under an
    /// empty key. Everything is read as strings.
    fn parse_lines(yaml: &str) -> Self {
        let mut fields = Mapping::new();
        let mut list_key: Option<String> = None;

        for line in yaml.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let (Some(key), Some(item)) = (&list_key, trimmed.strip_prefix("- ")) {
                let entry = fields
                    .entry(YamlValue::String(key.clone()))
                    .or_insert_with(|| YamlValue::Sequence(Vec::new()));
                if let YamlValue::Sequence(items) = entry {
                    items.push(YamlValue::String(unquote(item).to_string()));
                }
                continue;
            }
            if line.starts_with([' ', '\t']) {
                continue;
            }
            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_string();
            let value = unquote(value.trim());
            if value.is_empty() {
                list_key = Some(key);
            } else {
                list_key = None;
                fields.insert(
                    YamlValue::String(key),
                    YamlValue::String(value.to_string()),
                );
            }
        }

        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&YamlValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().filter_map(YamlValue::as_str)
    }

    /// A scalar field rendered as a trimmed, non-empty string.
    pub fn str(&self, key: &str) -> Option<String> {
        scalar_string(self.get(key)?)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// A boolean field, accepting YAML booleans and `"true"`/`"false"` strings.
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            YamlValue::Bool(b) => Some(*b),
            YamlValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// A list field. Accepts a YAML sequence of scalars or a comma-separated
    /// string; empty entries are dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(YamlValue::Sequence(items)) => items
                .iter()
                .filter_map(scalar_string)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(value) => scalar_string(value)
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// A single field converted to JSON, for carrying verbatim in metadata.
    pub fn json(&self, key: &str) -> Option<serde_json::Value> {
        serde_json::to_value(self.get(key)?).ok()
    }
}

fn scalar_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Splits a comma-separated list, trimming entries and dropping empties.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| unquote(s.trim()).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// A file split into its optional header and body.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Parsed frontmatter, if a complete header was present.
    pub frontmatter: Option<Frontmatter>,
    /// Raw frontmatter text between the delimiters.
    pub raw_frontmatter: Option<String>,
    /// Content after the header.
    pub body: String,
    /// Line number where the body starts (1-indexed).
    pub body_start_line: usize,
}

impl ParsedDocument {
    /// The frontmatter, or an empty one when absent.
    pub fn fields(&self) -> Frontmatter {
        self.frontmatter.clone().unwrap_or_default()
    }
}

/// Check if content opens with a frontmatter delimiter.
pub fn has_frontmatter(content: &str) -> bool {
    content
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim_end() == "---")
}

/// Check if content starts with a complete `---` ... `---` header block.
pub fn has_complete_frontmatter(content: &str) -> bool {
    content.starts_with("---\n") && header_end(content).is_some()
}

/// Locates the header block: (yaml start, closing delimiter start, body start)
/// as byte offsets. Leading blank lines before the opening `---` are allowed.
fn header_end(content: &str) -> Option<(usize, usize, usize)> {
    let mut offset = 0;
    let mut yaml_start = None;
    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let bare = line.trim_end_matches(['\n', '\r']).trim_end();
        match yaml_start {
            None if bare.trim_start().is_empty() => continue,
            None if bare == "---" => yaml_start = Some(offset),
            None => return None,
            Some(start) if bare == "---" => return Some((start, line_start, offset)),
            Some(_) => {}
        }
    }
    None
}

/// Split content into frontmatter and body.
///
/// Returns (frontmatter_yaml, body_content, body_start_line). Content with an
/// opening delimiter but no closing one is treated as all body.
pub fn split_frontmatter(content: &str) -> (Option<String>, String, usize) {
    let Some((yaml_start, yaml_end, body_start)) = header_end(content) else {
        return (None, content.to_string(), 1);
    };
    let yaml = content[yaml_start..yaml_end].trim_end_matches(['\r', '\n']);
    let rest = &content[body_start..];
    let trimmed_rest = rest.trim_start_matches(['\r', '\n']);
    let skipped_blank = rest[..rest.len() - trimmed_rest.len()].matches('\n').count();
    let header_lines = content[..body_start].matches('\n').count();
    (
        Some(yaml.to_string()),
        trimmed_rest.to_string(),
        header_lines + skipped_blank + 1,
    )
}

/// Split and parse a document in one step.
pub fn parse_document(content: &str) -> ParsedDocument {
    let (raw, body, body_start_line) = split_frontmatter(content);
    ParsedDocument {
        frontmatter: raw.as_deref().map(Frontmatter::parse),
        raw_frontmatter: raw,
        body,
        body_start_line,
    }
}

/// Quote a YAML scalar when plain style would change its meaning.
pub fn yaml_scalar(value: &str) -> String {
    if needs_quotes(value) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    const INDICATORS: &[char] = &[
        '*', '&', '!', '|', '>', '\'', '"', '%', '@', '`', '#', '[', ']', '{', '}', ',', '?',
        '-', ':',
    ];
    value.is_empty()
        || value != value.trim()
        || value.starts_with(INDICATORS)
        || value.contains(": ")
        || value.contains(" #")
        || value.ends_with(':')
        || matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
        )
        || value.parse::<f64>().is_ok()
}

/// Builds a frontmatter block field by field, in insertion order.
///
/// ```
/// use prpm_canonical::frontmatter::FrontmatterWriter;
///
/// let header = FrontmatterWriter::new()
///     .field("name", "my-rule")
///     .list("globs", &["**/*.ts".to_string()])
///     .flag("alwaysApply", false)
///     .finish();
/// assert_eq!(header, "---\nname: my-rule\nglobs:\n  - \"**/*.ts\"\nalwaysApply: false\n---\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrontmatterWriter {
    out: String,
}

impl FrontmatterWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A string field. Multi-line values use a literal block scalar with an
    /// explicit indentation indicator, so a leading space on the first line
    /// survives.
    pub fn field(mut self, key: &str, value: &str) -> Self {
        if value.contains('\n') {
            let _ = writeln!(self.out, "{key}: |2");
            for line in value.lines() {
                let _ = writeln!(self.out, "  {line}");
            }
        } else {
            let _ = writeln!(self.out, "{key}: {}", yaml_scalar(value));
        }
        self
    }

    /// A string field written only when present and non-empty.
    pub fn opt_field(self, key: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    pub fn flag(mut self, key: &str, value: bool) -> Self {
        let _ = writeln!(self.out, "{key}: {value}");
        self
    }

    /// A block sequence of strings.
    pub fn list(mut self, key: &str, items: &[String]) -> Self {
        let _ = writeln!(self.out, "{key}:");
        for item in items {
            let _ = writeln!(self.out, "  - {}", yaml_scalar(item));
        }
        self
    }

    /// An arbitrary JSON value, for fields carried verbatim from a source file.
    pub fn value(mut self, key: &str, value: &serde_json::Value) -> Result<Self, serde_yaml::Error> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(self),
            Value::String(s) => Ok(self.field(key, s)),
            Value::Bool(b) => Ok(self.flag(key, *b)),
            Value::Number(n) => {
                let _ = writeln!(self.out, "{key}: {n}");
                Ok(self)
            }
            Value::Array(items) if items.iter().all(Value::is_string) => {
                let items: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                Ok(self.list(key, &items))
            }
            other => {
                let rendered = serde_yaml::to_string(other)?;
                let _ = writeln!(self.out, "{key}:");
                for line in rendered.lines() {
                    let _ = writeln!(self.out, "  {line}");
                }
                Ok(self)
            }
        }
    }

    pub fn finish(self) -> String {
        format!("---\n{}---\n", self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_frontmatter() {
        assert!(has_frontmatter("---\nname: test\n---\n# Content"));
        assert!(has_frontmatter("\n---\nname: test\n---\n# Content"));
        assert!(!has_frontmatter("# No frontmatter"));
        assert!(!has_frontmatter("-- not quite"));
    }

    #[test]
    fn test_has_complete_frontmatter() {
        assert!(has_complete_frontmatter("---\nname: x\n---\nbody"));
        assert!(has_complete_frontmatter("---\n---\n"));
        assert!(!has_complete_frontmatter("---\nname: x\nno closing"));
        assert!(!has_complete_frontmatter("# Title\n---\n"));
    }

    #[test]
    fn test_split_frontmatter() {
        let content = "---\nname: test\ndescription: A test rule\n---\n# Heading\nBody";
        let (yaml, body, line) = split_frontmatter(content);

        assert_eq!(yaml.as_deref(), Some("name: test\ndescription: A test rule"));
        assert!(body.starts_with("# Heading"));
        assert_eq!(line, 5);
    }

    #[test]
    fn test_split_empty_frontmatter() {
        let (yaml, body, _) = split_frontmatter("---\n---\n# Title\n");
        assert_eq!(yaml.as_deref(), Some(""));
        assert_eq!(body, "# Title\n");
    }

    #[test]
    fn test_split_skips_blank_lines_after_header() {
        let (_, body, line) = split_frontmatter("---\na: b\n---\n\n\nBody");
        assert_eq!(body, "Body");
        assert_eq!(line, 6);
    }

    #[test]
    fn test_split_no_frontmatter() {
        let content = "# Just markdown\nNo frontmatter here.";
        let (yaml, body, line) = split_frontmatter(content);

        assert!(yaml.is_none());
        assert_eq!(body, content);
        assert_eq!(line, 1);
    }

    #[test]
    fn test_split_unclosed_is_body() {
        let content = "---\nname: x\n# body";
        let (yaml, body, _) = split_frontmatter(content);
        assert!(yaml.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_typed_fields() {
        let fm = Frontmatter::parse(
            "name: reviewer\ntools: Read, Grep ,Glob\nglobs:\n  - '*.ts'\n  - '*.tsx'\nalwaysApply: true\nversion: 2",
        );
        assert_eq!(fm.str("name").as_deref(), Some("reviewer"));
        assert_eq!(fm.list("tools"), vec!["Read", "Grep", "Glob"]);
        assert_eq!(fm.list("globs"), vec!["*.ts", "*.tsx"]);
        assert_eq!(fm.bool("alwaysApply"), Some(true));
        assert_eq!(fm.str("version").as_deref(), Some("2"));
        assert_eq!(fm.keys().collect::<Vec<_>>(), ["name", "tools", "globs", "alwaysApply", "version"]);
    }

    #[test]
    fn test_invalid_yaml_falls_back_to_lines() {
        // Unquoted glob starting with `*` is an alias in YAML.
        let fm = Frontmatter::parse("description: Style rules\nglobs: **/*.ts\napplyTo:\n  - src/**");
        assert_eq!(fm.str("description").as_deref(), Some("Style rules"));
        assert_eq!(fm.list("globs"), vec!["**/*.ts"]);
        assert_eq!(fm.list("applyTo"), vec!["src/**"]);
    }

    #[test]
    fn test_empty_string_fields_read_as_absent() {
        let fm = Frontmatter::parse("name: ''\ndescription:   ");
        assert!(fm.str("name").is_none());
        assert!(fm.str("description").is_none());
    }

    #[test]
    fn test_yaml_scalar_quoting() {
        assert_eq!(yaml_scalar("plain"), "plain");
        assert_eq!(yaml_scalar("1.0.0"), "1.0.0");
        assert_eq!(yaml_scalar("**/*"), "\"**/*\"");
        assert_eq!(yaml_scalar("Contains: colon"), "\"Contains: colon\"");
        assert_eq!(yaml_scalar("true"), "\"true\"");
        assert_eq!(yaml_scalar("1.5"), "\"1.5\"");
        assert_eq!(yaml_scalar(""), "\"\"");
        assert_eq!(yaml_scalar("say \"hi\": now"), "\"say \\\"hi\\\": now\"");
    }

    #[test]
    fn test_writer_round_trips_through_parser() {
        let header = FrontmatterWriter::new()
            .field("name", "skill:name")
            .field("description", "Line one\nLine two")
            .list("globs", &["**/*".to_string()])
            .flag("alwaysApply", false)
            .finish();
        let (yaml, _, _) = split_frontmatter(&header);
        let fm = Frontmatter::parse(&yaml.unwrap());
        assert_eq!(fm.str("name").as_deref(), Some("skill:name"));
        assert_eq!(fm.str("description").as_deref(), Some("Line one\nLine two"));
        assert_eq!(fm.list("globs"), vec!["**/*"]);
        assert_eq!(fm.bool("alwaysApply"), Some(false));
    }

    #[test]
    fn test_writer_keeps_indented_first_line() {
        let header = FrontmatterWriter::new()
            .field("description", "  indented first\nsecond")
            .finish();
        assert_eq!(header, "---\ndescription: |2\n    indented first\n  second\n---\n");
        let (yaml, _, _) = split_frontmatter(&header);
        let fm = Frontmatter::parse(&yaml.unwrap());
        assert_eq!(
            fm.get("description").and_then(YamlValue::as_str).map(str::trim_end),
            Some("  indented first\nsecond")
        );
    }

    #[test]
    fn test_writer_nested_value() {
        let header = FrontmatterWriter::new()
            .value("hooks", &serde_json::json!({"pre": "lint"}))
            .unwrap()
            .finish();
        let (yaml, _, _) = split_frontmatter(&header);
        let fm = Frontmatter::parse(&yaml.unwrap());
        assert_eq!(fm.json("hooks"), Some(serde_json::json!({"pre": "lint"})));
    }
}
