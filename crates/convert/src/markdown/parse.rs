//! Decomposes a markdown body into canonical sections.
//!
//! The preamble (everything before the first `##` heading) yields the title,
//! description and an optional persona. Each `##` block is classified by its
//! heading text and shape; anything unrecognised becomes instructions, so no
//! body text is ever dropped.

use prpm_canonical::{
    Example, InstructionsSection, PersonaData, Priority, Rule, RulesSection, Section,
};
use regex::Regex;
use std::sync::LazyLock;

use super::blocks::{
    fence_language, fence_marker, heading, is_prose, outline, paragraphs, strip_code_span,
    trim_blank_lines, Chunk, FenceState, LIST_ITEM_RE,
};

static PERSONA_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(role|persona|identity)\b").expect("valid regex"));

static CONTEXT_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(context|background|reference|references|about)\b").expect("valid regex")
});

static TOOLS_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(tools|capabilities)\b").expect("valid regex"));

/// `🤖 **Name** - role` with every part optional except the bold name.
static PERSONA_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<icon>\S+)\s+)?\*\*(?P<name>[^*]+)\*\*(?:\s+-\s+(?P<role>.+))?$")
        .expect("valid regex")
});

pub(crate) const IMPORTANT_MARKER: &str = "**IMPORTANT:**";
pub(crate) const STYLE_MARKER: &str = "**Style:**";
pub(crate) const EXPERTISE_MARKER: &str = "**Expertise:**";
pub(crate) const EXAMPLE_PREFIX: &str = "Example:";

/// Result of decomposing a markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decomposed {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    /// Body sections, excluding metadata.
    pub sections: Vec<Section>,
}

/// Decomposes `body`.
///
/// When `known_description` is `None` the first prose paragraph of the
/// preamble becomes the description. When it is set, a first paragraph
/// repeating it is dropped and anything else stays in the body.
pub fn decompose(body: &str, known_description: Option<&str>) -> Decomposed {
    let outline = outline(body);
    let mut out = Decomposed::default();

    let mut preamble = outline.preamble;
    if let Some(idx) = first_h1(&preamble) {
        let text = heading(preamble[idx], 1).unwrap_or_default();
        let (icon, title) = split_icon(text);
        out.icon = icon;
        out.title = Some(title).filter(|t| !t.is_empty());
        preamble.remove(idx);
    }

    let mut pending: Vec<String> = Vec::new();
    let mut persona_seen = false;
    for (idx, paragraph) in paragraphs(&preamble).into_iter().enumerate() {
        let trimmed = paragraph.trim();
        if idx == 0 && is_prose(trimmed) && !is_persona_intro(trimmed) {
            match known_description {
                None => {
                    out.description = Some(trimmed.to_string());
                    continue;
                }
                Some(known) if known.trim() == trimmed => continue,
                Some(_) => {}
            }
        }
        if !persona_seen && is_persona_intro(trimmed) {
            persona_seen = true;
            flush_instructions(&mut pending, &mut out.sections);
            out.sections.push(Section::persona(PersonaData {
                role: Some(trimmed.to_string()),
                ..Default::default()
            }));
            continue;
        }
        let lines: Vec<&str> = paragraph.lines().collect();
        if let Some((items, ordered)) = parse_rules(&lines) {
            flush_instructions(&mut pending, &mut out.sections);
            out.sections.push(rules("", items, ordered));
            continue;
        }
        pending.push(paragraph);
    }
    flush_instructions(&mut pending, &mut out.sections);

    for chunk in &outline.chunks {
        out.sections.extend(classify(chunk));
    }
    out
}

fn first_h1(lines: &[&str]) -> Option<usize> {
    let mut fence = FenceState::default();
    lines
        .iter()
        .position(|line| !fence.consume(line) && heading(line, 1).is_some())
}

fn is_persona_intro(paragraph: &str) -> bool {
    paragraph.starts_with("You are ")
}

/// Splits a leading emoji token off a title.
fn split_icon(text: &str) -> (Option<String>, String) {
    let text = text.trim();
    if let Some((first, rest)) = text.split_once(char::is_whitespace) {
        let symbolic = !first
            .chars()
            .any(|c| c.is_alphanumeric() || c.is_ascii_punctuation());
        if symbolic && !rest.trim().is_empty() {
            return (Some(first.to_string()), rest.trim().to_string());
        }
    }
    (None, text.to_string())
}

fn flush_instructions(pending: &mut Vec<String>, sections: &mut Vec<Section>) {
    if pending.is_empty() {
        return;
    }
    let content = pending.join("\n\n");
    pending.clear();
    sections.push(instructions("", &content));
}

fn instructions(title: &str, content: &str) -> Section {
    let trimmed = content.trim();
    let (content, priority) = match trimmed.strip_prefix(IMPORTANT_MARKER) {
        Some(rest) => (rest.trim(), Some(Priority::High)),
        None => (trimmed, None),
    };
    Section::Instructions(InstructionsSection {
        title: title.to_string(),
        content: content.to_string(),
        priority,
    })
}

fn rules(title: &str, items: Vec<Rule>, ordered: bool) -> Section {
    Section::Rules(RulesSection {
        title: title.to_string(),
        items,
        ordered,
    })
}

/// Maps one `##` block to sections by heading text and body shape.
fn classify(chunk: &Chunk<'_>) -> Vec<Section> {
    let title = chunk.heading.trim();
    if title.to_lowercase().contains("example") {
        let lines = trim_blank_lines(&chunk.lines);
        if let Some((examples, trailing)) = parse_examples(lines) {
            let mut sections = vec![Section::examples(title, examples)];
            if let Some(trailing) = trailing {
                sections.push(instructions("", &trailing));
            }
            return sections;
        }
    }
    vec![classify_block(chunk)]
}

fn classify_block(chunk: &Chunk<'_>) -> Section {
    let title = chunk.heading.trim();
    let lower = title.to_lowercase();
    let lines = trim_blank_lines(&chunk.lines);

    if PERSONA_HEADING_RE.is_match(&lower) {
        if let Some(persona) = parse_persona(lines) {
            return Section::persona(persona);
        }
    }
    if TOOLS_HEADING_RE.is_match(&lower) {
        if let Some(section) = parse_tools(lines) {
            return section;
        }
    }
    if let Some((items, ordered)) = parse_rules(lines) {
        return rules(title, items, ordered);
    }
    if CONTEXT_HEADING_RE.is_match(&lower) {
        return Section::context(title, chunk.body());
    }
    instructions(title, &chunk.body())
}

fn parse_persona(lines: &[&str]) -> Option<PersonaData> {
    #[derive(PartialEq)]
    enum Part {
        Identity,
        Style,
        Expertise,
    }

    let mut persona = PersonaData::default();
    let mut prose: Vec<&str> = Vec::new();
    let mut part = Part::Identity;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(STYLE_MARKER) {
            part = Part::Style;
            continue;
        }
        if trimmed.starts_with(EXPERTISE_MARKER) {
            part = Part::Expertise;
            continue;
        }
        let item = LIST_ITEM_RE
            .captures(trimmed)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str().trim().to_string());
        match (&part, item) {
            (Part::Style, Some(item)) => persona.style.push(item),
            (Part::Expertise, Some(item)) => persona.expertise.push(item),
            (Part::Identity, _) => prose.push(trimmed),
            _ => return None,
        }
    }

    if let Some(first) = prose.first() {
        match PERSONA_LINE_RE.captures(first) {
            Some(caps) => {
                persona.icon = caps.name("icon").map(|m| m.as_str().to_string());
                persona.name = caps.name("name").map(|m| m.as_str().trim().to_string());
                let mut role: Vec<&str> = caps.name("role").map(|m| m.as_str()).into_iter().collect();
                role.extend(&prose[1..]);
                persona.role = Some(role.join(" ")).filter(|r| !r.is_empty());
            }
            None => persona.role = Some(prose.join(" ")),
        }
    }

    (!persona.is_empty()).then_some(persona)
}

fn parse_tools(lines: &[&str]) -> Option<Section> {
    let mut tools = Vec::new();
    let mut prose = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match LIST_ITEM_RE.captures(trimmed).and_then(|caps| caps.get(2)) {
            Some(item) => tools.push(tool_name(item.as_str())),
            None => prose.push(trimmed),
        }
    }
    tools.retain(|t: &String| !t.is_empty());
    if tools.is_empty() {
        return None;
    }
    let mut section = Section::tools(tools);
    if let Section::Tools(inner) = &mut section {
        inner.description = Some(prose.join(" ")).filter(|d| !d.is_empty());
    }
    Some(section)
}

/// `` `Read` - reads files `` and `Read: reads files` both name `Read`.
fn tool_name(item: &str) -> String {
    let item = item.trim();
    if let Some(rest) = item.strip_prefix('`') {
        if let Some(end) = rest.find('`') {
            return rest[..end].trim().to_string();
        }
    }
    let end = [item.find(" - "), item.find(':')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(item.len());
    item[..end].trim().to_string()
}

/// Reads `### description` / prose lines followed by fenced code blocks.
///
/// Prose after the last closing fence comes back as trailing text. Returns
/// `None` when there is no complete example or a fence is never closed.
fn parse_examples(lines: &[&str]) -> Option<(Vec<Example>, Option<String>)> {
    let mut examples = Vec::new();
    let mut description: Vec<String> = Vec::new();
    let mut since_fence: Vec<&str> = Vec::new();
    let mut code: Option<(Option<String>, Vec<&str>, &'static str)> = None;

    for line in lines {
        if let Some((language, body, marker)) = &mut code {
            let trimmed = line.trim_start();
            if trimmed.starts_with(*marker) && trimmed.trim_matches(['`', '~']).trim().is_empty() {
                let (text, good) = example_marker(&description.join(" "));
                examples.push(Example {
                    description: text,
                    code: body.join("\n"),
                    language: language.take(),
                    good,
                });
                description.clear();
                since_fence.clear();
                code = None;
            } else {
                body.push(line);
            }
            continue;
        }
        if let Some(marker) = fence_marker(line) {
            code = Some((fence_language(line), Vec::new(), marker));
            continue;
        }
        since_fence.push(line);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let text = heading(trimmed, 3).unwrap_or(trimmed);
        description.push(text.to_string());
    }

    if code.is_some() || examples.is_empty() {
        return None;
    }
    let trailing = Some(trim_blank_lines(&since_fence).join("\n")).filter(|t| !t.is_empty());
    Some((examples, trailing))
}

/// Strips a good/bad marker from an example description.
fn example_marker(text: &str) -> (String, Option<bool>) {
    let mut text = text.trim();
    let mut good = None;
    for (prefix, flag) in [("✅", true), ("❌", false)] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
            good = Some(flag);
        }
    }
    for (prefix, flag) in [("Good:", true), ("Bad:", false), ("**Good:**", true), ("**Bad:**", false)] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
            good = good.or(Some(flag));
        }
    }
    (text.to_string(), good)
}

/// Parses a body made only of list items into rules. Returns `None` when any
/// top-level line is not a list item.
fn parse_rules(lines: &[&str]) -> Option<(Vec<Rule>, bool)> {
    let mut items: Vec<Rule> = Vec::new();
    let mut ordered = false;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let indented = line.starts_with([' ', '\t']);
        if !indented {
            let caps = LIST_ITEM_RE.captures(line)?;
            if items.is_empty() {
                ordered = caps.get(1).is_some();
            }
            let content = caps.get(2).map_or("", |m| m.as_str()).trim();
            items.push(Rule::new(content));
            continue;
        }

        let rule = items.last_mut()?;
        let trimmed = line.trim();
        let nested = LIST_ITEM_RE
            .captures(trimmed)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str().trim());
        if let Some(example) = nested.and_then(|n| n.strip_prefix(EXAMPLE_PREFIX)) {
            rule.examples.push(strip_code_span(example).to_string());
        } else if let Some(rationale) = italic(trimmed) {
            rule.rationale = Some(rationale.to_string());
        } else if let Some(nested) = nested {
            rule.examples.push(nested.to_string());
        } else {
            rule.content.push(' ');
            rule.content.push_str(trimmed);
        }
    }

    (!items.is_empty()).then_some((items, ordered))
}

fn italic(text: &str) -> Option<&str> {
    let inner = text
        .strip_prefix('*')
        .and_then(|t| t.strip_suffix('*'))
        .or_else(|| text.strip_prefix('_').and_then(|t| t.strip_suffix('_')))?;
    (!inner.is_empty() && !inner.starts_with('*')).then_some(inner.trim())
}
