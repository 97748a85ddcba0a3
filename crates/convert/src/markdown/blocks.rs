//! Line-level markdown scanning: fences, headings and paragraphs.

use regex::Regex;
use std::sync::LazyLock;

/// Top-level list item: `- x`, `* x`, `+ x`, `1. x` or `1) x`.
pub(crate) static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+]|(\d+)[.)])\s+(.*)$").expect("valid regex"));

/// Tracks whether a line sits inside a fenced code block.
#[derive(Debug, Default)]
pub(crate) struct FenceState {
    open: Option<&'static str>,
}

impl FenceState {
    /// Feeds one line. Returns true when the line is a fence delimiter or
    /// belongs to a fenced block.
    pub(crate) fn consume(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.open {
            Some(marker) => {
                let closes = trimmed
                    .strip_prefix(marker)
                    .is_some_and(|rest| rest.trim_matches(['`', '~']).trim().is_empty());
                if closes {
                    self.open = None;
                }
                true
            }
            None => match fence_marker(trimmed) {
                Some(marker) => {
                    self.open = Some(marker);
                    true
                }
                None => false,
            },
        }
    }
}

/// The fence marker a line opens with, if any.
pub(crate) fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

/// Language tag of an opening fence line.
pub(crate) fn fence_language(line: &str) -> Option<String> {
    let marker = fence_marker(line)?;
    let info = line.trim_start()[marker.len()..].trim_start_matches(['`', '~']).trim();
    info.split_whitespace().next().map(str::to_string)
}

/// A heading line at exactly `level`, outside any fence.
pub(crate) fn heading(line: &str, level: usize) -> Option<&str> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes != level {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix([' ', '\t']).map(str::trim)
}

/// One `##` block: heading text plus the lines under it.
#[derive(Debug, Clone)]
pub(crate) struct Chunk<'a> {
    pub heading: &'a str,
    pub lines: Vec<&'a str>,
}

impl Chunk<'_> {
    /// Body text with surrounding blank lines removed.
    pub(crate) fn body(&self) -> String {
        trim_blank_lines(&self.lines).join("\n")
    }
}

/// A document split at its level-2 headings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outline<'a> {
    pub preamble: Vec<&'a str>,
    pub chunks: Vec<Chunk<'a>>,
}

/// Splits a body at `##` headings, ignoring headings inside code fences.
pub(crate) fn outline(body: &str) -> Outline<'_> {
    let mut out = Outline::default();
    let mut fence = FenceState::default();

    for line in body.lines() {
        let fenced = fence.consume(line);
        if !fenced {
            if let Some(text) = heading(line, 2) {
                out.chunks.push(Chunk {
                    heading: text,
                    lines: Vec::new(),
                });
                continue;
            }
        }
        match out.chunks.last_mut() {
            Some(chunk) => chunk.lines.push(line),
            None => out.preamble.push(line),
        }
    }
    out
}

/// Drops leading and trailing blank lines.
pub(crate) fn trim_blank_lines<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    &lines[start..end.max(start)]
}

/// Blank-line separated paragraphs. A fenced block is never split.
pub(crate) fn paragraphs(lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence = FenceState::default();

    for line in lines {
        let fenced = fence.consume(line);
        if !fenced && line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// Whether a paragraph is plain prose (not a list, fence, heading, quote or table).
pub(crate) fn is_prose(paragraph: &str) -> bool {
    let first = paragraph.trim_start();
    !(first.is_empty()
        || first.starts_with('#')
        || first.starts_with('>')
        || first.starts_with('|')
        || fence_marker(first).is_some()
        || LIST_ITEM_RE.is_match(first.lines().next().unwrap_or_default()))
}

/// Removes one layer of backticks around an inline code span.
pub(crate) fn strip_code_span(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('`')
        .and_then(|t| t.strip_suffix('`'))
        .unwrap_or(text)
}
