//! Heuristic format sniffers.
//!
//! Each sniffer answers from structural signals only: the header's keys, an
//! H1 heading, JSON shape. They can disagree, so [`detect_format`] applies
//! them in a fixed priority order. Prefer an explicit format when one is known.

use prpm_canonical::frontmatter::has_frontmatter;
use prpm_canonical::{parse_document, Format, Frontmatter};
use tracing::debug;

use crate::markdown::blocks::{heading, FenceState};

const CLAUDE_KEYS: [&str; 7] = [
    "tools",
    "allowed-tools",
    "model",
    "argument-hint",
    "agentType",
    "skillType",
    "commandType",
];

const CONTINUE_KEYS: [&str; 2] = ["invokable", "regex"];

fn header(content: &str) -> Option<Frontmatter> {
    if !has_frontmatter(content) {
        return None;
    }
    parse_document(content).frontmatter
}

fn header_has_any(content: &str, keys: &[&str]) -> bool {
    header(content).is_some_and(|fm| keys.iter().any(|k| fm.contains(k)))
}

fn has_h1(content: &str) -> bool {
    let mut fence = FenceState::default();
    content
        .lines()
        .filter(|line| !fence.consume(line))
        .any(|line| heading(line, 1).is_some_and(|text| !text.is_empty()))
}

/// JSON with an `mcpServers` object.
pub fn is_mcp_format(content: &str) -> bool {
    let trimmed = content.trim_start();
    if !trimmed.starts_with('{') {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .is_some_and(|v| v.get("mcpServers").is_some_and(|s| s.is_object()))
}

/// Kiro steering: header declares `inclusion`.
pub fn is_kiro_format(content: &str) -> bool {
    header_has_any(content, &["inclusion"])
}

/// Path-specific Copilot instructions: header declares `applyTo`.
pub fn is_copilot_format(content: &str) -> bool {
    header_has_any(content, &["applyTo"])
}

/// Cursor MDC: header declares `globs` or `alwaysApply`.
pub fn is_cursor_format(content: &str) -> bool {
    header_has_any(content, &["globs", "alwaysApply"])
}

/// Claude: header declares tool permissions, a model or a subtype marker.
pub fn is_claude_format(content: &str) -> bool {
    header_has_any(content, &CLAUDE_KEYS)
}

/// Continue: header declares `invokable` (prompts) or `regex` (rules).
pub fn is_continue_format(content: &str) -> bool {
    header_has_any(content, &CONTINUE_KEYS)
}

/// Windsurf: plain markdown with an H1 and no header.
pub fn is_windsurf_format(content: &str) -> bool {
    !has_frontmatter(content) && !content.trim_start().starts_with('{') && has_h1(content)
}

/// Sniffers in the order [`detect_format`] consults them.
const SNIFFERS: [(Format, fn(&str) -> bool); 7] = [
    (Format::Mcp, is_mcp_format),
    (Format::Kiro, is_kiro_format),
    (Format::Copilot, is_copilot_format),
    (Format::Claude, is_claude_format),
    (Format::Cursor, is_cursor_format),
    (Format::Continue, is_continue_format),
    (Format::Windsurf, is_windsurf_format),
];

/// First format whose sniffer accepts `content`.
pub fn detect_format(content: &str) -> Option<Format> {
    let detected = SNIFFERS
        .iter()
        .find(|(_, sniff)| sniff(content))
        .map(|(format, _)| *format);
    debug!(format = ?detected, "Sniffed content format");
    detected
}

/// The explicit format when given, else the sniffed one, else generic.
pub fn resolve_format(explicit: Option<Format>, content: &str) -> Format {
    explicit
        .or_else(|| detect_format(content))
        .unwrap_or(Format::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_each_format() {
        assert!(is_mcp_format(r#"{"mcpServers": {"fs": {"command": "npx"}}}"#));
        assert!(is_kiro_format("---\ninclusion: always\n---\nBody"));
        assert!(is_copilot_format("---\napplyTo: \"**/*.ts\"\n---\nBody"));
        assert!(is_cursor_format("---\nglobs: \"*.ts\"\n---\nBody"));
        assert!(is_claude_format("---\nname: x\ntools: Read\n---\nBody"));
        assert!(is_continue_format("---\nname: x\ninvokable: true\n---\nBody"));
        assert!(is_windsurf_format("# Rules\n\n- Be nice\n"));
    }

    #[test]
    fn rejects_near_misses() {
        assert!(!is_mcp_format(r#"{"servers": {}}"#));
        assert!(!is_mcp_format("# {mcpServers}"));
        assert!(!is_cursor_format("globs: \"*.ts\"\n"));
        assert!(!is_windsurf_format("---\ndescription: x\n---\n# Rules\n"));
        assert!(!is_windsurf_format("No heading here.\n"));
        assert!(!is_windsurf_format("```md\n# inside a fence\n```\n"));
    }

    #[test]
    fn claude_outranks_cursor() {
        let content = "---\nglobs: \"*.ts\"\nmodel: sonnet\n---\nBody";
        assert!(is_cursor_format(content));
        assert_eq!(detect_format(content), Some(Format::Claude));
    }

    #[test]
    fn resolve_prefers_explicit() {
        let content = "---\ninclusion: always\n---\nBody";
        assert_eq!(resolve_format(None, content), Format::Kiro);
        assert_eq!(resolve_format(Some(Format::Cursor), content), Format::Cursor);
        assert_eq!(resolve_format(None, "plain text"), Format::Generic);
    }
}
