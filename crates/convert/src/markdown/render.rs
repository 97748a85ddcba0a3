//! Renders canonical sections back into markdown.

use prpm_canonical::{
    CanonicalPackage, ExamplesSection, InstructionsSection, PersonaData, Priority, RulesSection,
    Section, SectionKind, ToolsSection,
};
use std::fmt::Write as _;

use super::parse::{EXAMPLE_PREFIX, EXPERTISE_MARKER, IMPORTANT_MARKER, STYLE_MARKER};
use crate::error::{ConvertError, Result};
use crate::formats::SectionSupport;
use crate::report::{ConversionWarning, RenderReport};

/// Renders the package body in section order.
///
/// A title block is emitted at the metadata section's position, or first when
/// there is none. Sections `support` excludes are skipped with a warning.
pub(crate) fn render_body(
    pkg: &CanonicalPackage,
    support: &SectionSupport,
    report: &mut RenderReport,
) -> Result<String> {
    let metadata_count = pkg.content.count(SectionKind::Metadata);
    if metadata_count > 1 {
        return Err(ConvertError::DuplicateMetadata(metadata_count));
    }

    let target = report.format();
    let mut blocks: Vec<String> = Vec::new();
    if metadata_count == 0 {
        blocks.push(title_block(pkg.title(), None, pkg.description_text()));
    }

    for section in &pkg.content {
        let block = match section {
            Section::Metadata(meta) => Some(title_block(
                pkg.title(),
                meta.icon.as_deref(),
                pkg.description_text(),
            )),
            Section::Instructions(s) => Some(render_instructions(s)),
            Section::Rules(s) if support.rules => Some(render_rules(s)),
            Section::Examples(s) if support.examples => Some(render_examples(s)),
            Section::Persona(s) if support.persona => Some(render_persona(&s.data)),
            Section::Context(s) if support.context => Some(titled(&s.title, &s.content)),
            Section::Tools(_) if support.tools && support.tools_in_header => None,
            Section::Tools(s) if support.tools => Some(render_tools(s)),
            Section::Custom(s) if s.applies_to(target) => Some(s.content.trim().to_string()),
            Section::Custom(s) => {
                if let Some(editor) = s.editor_type {
                    report.warn(ConversionWarning::ForeignCustom { editor, target });
                }
                None
            }
            Section::Unknown { kind, .. } => {
                tracing::debug!(section = %kind, target = %target, "Unknown section type");
                report.warn(ConversionWarning::UnknownSection { kind: kind.clone() });
                None
            }
            other => {
                if let Some(kind) = other.kind() {
                    report.skip_section(kind);
                }
                None
            }
        };
        if let Some(block) = block.filter(|b| !b.trim().is_empty()) {
            blocks.push(block);
        }
    }

    Ok(format!("{}\n", blocks.join("\n\n")))
}

/// `# icon title` followed by the description paragraph.
pub(crate) fn title_block(title: &str, icon: Option<&str>, description: Option<&str>) -> String {
    let mut out = match icon.filter(|i| !i.trim().is_empty()) {
        Some(icon) => format!("# {icon} {title}"),
        None => format!("# {title}"),
    };
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        let _ = write!(out, "\n\n{}", description.trim());
    }
    out
}

/// `## title` then content. An empty title emits the content alone.
fn titled(title: &str, content: &str) -> String {
    let content = content.trim();
    match (title.trim(), content.is_empty()) {
        ("", _) => content.to_string(),
        (title, true) => format!("## {title}"),
        (title, false) => format!("## {title}\n\n{content}"),
    }
}

fn render_instructions(section: &InstructionsSection) -> String {
    let content = section.content.trim();
    if section.priority == Some(Priority::High) && !content.is_empty() {
        titled(&section.title, &format!("{IMPORTANT_MARKER} {content}"))
    } else {
        titled(&section.title, content)
    }
}

pub(crate) fn render_rules(section: &RulesSection) -> String {
    let mut list = String::new();
    for (idx, rule) in section.items.iter().enumerate() {
        let bullet = if section.ordered {
            format!("{}.", idx + 1)
        } else {
            "-".to_string()
        };
        let mut lines = rule.content.trim().lines();
        let _ = writeln!(list, "{bullet} {}", lines.next().unwrap_or_default());
        for continuation in lines {
            let _ = writeln!(list, "  {}", continuation.trim());
        }
        if let Some(rationale) = rule.rationale.as_deref().filter(|r| !r.trim().is_empty()) {
            let _ = writeln!(list, "  *{}*", rationale.trim());
        }
        for example in &rule.examples {
            let _ = writeln!(list, "  - {EXAMPLE_PREFIX} {}", example.trim());
        }
    }
    titled(&section.title, &list)
}

pub(crate) fn render_examples(section: &ExamplesSection) -> String {
    let mut blocks = Vec::with_capacity(section.examples.len());
    for example in &section.examples {
        let description = example.description.trim();
        let label = match example.good {
            Some(true) => format!("### ✅ Good: {description}"),
            Some(false) => format!("### ❌ Bad: {description}"),
            None if description.is_empty() => String::new(),
            None => format!("### {description}"),
        };
        let language = example.language.as_deref().unwrap_or_default();
        let fence = format!("```{language}\n{}\n```", example.code.trim_end());
        if label.is_empty() {
            blocks.push(fence);
        } else {
            blocks.push(format!("{}\n\n{fence}", label.trim_end()));
        }
    }
    titled(&section.title, &blocks.join("\n\n"))
}

/// `## Role` with identity line and optional style/expertise lists.
pub(crate) fn render_persona(persona: &PersonaData) -> String {
    let mut identity: Vec<String> = Vec::new();
    if let Some(icon) = persona.icon.as_deref() {
        identity.push(icon.to_string());
    }
    match (persona.name.as_deref(), persona.role.as_deref()) {
        (Some(name), Some(role)) => identity.push(format!("**{name}** - {role}")),
        (Some(name), None) => identity.push(format!("**{name}**")),
        (None, Some(role)) => identity.push(role.to_string()),
        (None, None) => {}
    }

    let mut blocks = Vec::new();
    if !identity.is_empty() {
        blocks.push(identity.join(" "));
    }
    for (marker, items) in [
        (STYLE_MARKER, &persona.style),
        (EXPERTISE_MARKER, &persona.expertise),
    ] {
        if !items.is_empty() {
            let list: Vec<String> = items.iter().map(|i| format!("- {i}")).collect();
            blocks.push(format!("{marker}\n{}", list.join("\n")));
        }
    }
    titled("Role", &blocks.join("\n\n"))
}

fn render_tools(section: &ToolsSection) -> String {
    let mut out = String::new();
    if let Some(description) = section.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = write!(out, "{}\n\n", description.trim());
    }
    let list: Vec<String> = section.tools.iter().map(|t| format!("- {t}")).collect();
    out.push_str(&list.join("\n"));
    titled("Tools", &out)
}
