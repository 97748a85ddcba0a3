//! Subtype detection and legacy compound-type mapping.
//!
//! Subtype detection runs in strict priority order:
//! 1. an explicit caller hint (e.g. the file lives under `.claude/agents/`)
//! 2. frontmatter type fields: `type`, then `agentType`, `skillType`, `commandType`
//! 3. format-specific structural inference
//! 4. the format's default subtype
//!
//! Resolution never fails. An unrecognized frontmatter shape falls through to
//! the default so a minimal file still ingests as a plain rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::format::{Format, Subtype};
use crate::frontmatter::Frontmatter;

/// A `(format, subtype)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Taxonomy {
    pub format: Format,
    pub subtype: Subtype,
}

impl Taxonomy {
    pub fn new(format: Format, subtype: Subtype) -> Self {
        Self { format, subtype }
    }

    pub fn legacy_type(&self) -> String {
        to_legacy_type(self.format, Some(self.subtype))
    }
}

/// Which detection rule decided a subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtypeSource {
    /// Caller-supplied hint.
    Explicit,
    /// Generic `type` frontmatter field.
    TypeField,
    /// Legacy `agentType: agent`.
    AgentType,
    /// Legacy `skillType: skill`.
    SkillType,
    /// Legacy `commandType: slash-command`.
    CommandType,
    /// Format-specific structural inference.
    Structural,
    /// Format default.
    Default,
}

impl fmt::Display for SubtypeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubtypeSource::Explicit => "explicit",
            SubtypeSource::TypeField => "type field",
            SubtypeSource::AgentType => "agentType",
            SubtypeSource::SkillType => "skillType",
            SubtypeSource::CommandType => "commandType",
            SubtypeSource::Structural => "structural",
            SubtypeSource::Default => "default",
        };
        f.write_str(label)
    }
}

/// A detected subtype and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtypeResolution {
    pub subtype: Subtype,
    pub source: SubtypeSource,
}

/// Frontmatter keys that encode the subtype and carry no other meaning.
pub const SUBTYPE_MARKER_KEYS: [&str; 4] = ["type", "agentType", "skillType", "commandType"];

/// Resolve a subtype, reporting which rule fired.
pub fn resolve_subtype(
    format: Format,
    frontmatter: &Frontmatter,
    hint: Option<Subtype>,
) -> SubtypeResolution {
    let resolution = resolve_inner(format, frontmatter, hint);
    debug!(
        format = %format,
        subtype = %resolution.subtype,
        source = %resolution.source,
        "Resolved package subtype"
    );
    resolution
}

/// Resolve a subtype. See the module docs for the priority order.
pub fn detect_subtype(format: Format, frontmatter: &Frontmatter, hint: Option<Subtype>) -> Subtype {
    resolve_subtype(format, frontmatter, hint).subtype
}

fn resolve_inner(
    format: Format,
    frontmatter: &Frontmatter,
    hint: Option<Subtype>,
) -> SubtypeResolution {
    let found = |subtype, source| SubtypeResolution { subtype, source };

    if let Some(subtype) = hint {
        return found(subtype, SubtypeSource::Explicit);
    }

    // The generic `type` field is consulted before the legacy per-kind fields,
    // so `type: agent` beats `skillType: skill` when both are present.
    match frontmatter.str("type").as_deref() {
        Some("agent") => return found(Subtype::Agent, SubtypeSource::TypeField),
        Some("skill") => return found(Subtype::Skill, SubtypeSource::TypeField),
        Some("slash-command") => return found(Subtype::SlashCommand, SubtypeSource::TypeField),
        _ => {}
    }
    if frontmatter.str("agentType").as_deref() == Some("agent") {
        return found(Subtype::Agent, SubtypeSource::AgentType);
    }
    if frontmatter.str("skillType").as_deref() == Some("skill") {
        return found(Subtype::Skill, SubtypeSource::SkillType);
    }
    if frontmatter.str("commandType").as_deref() == Some("slash-command") {
        return found(Subtype::SlashCommand, SubtypeSource::CommandType);
    }

    if let Some(subtype) = structural_subtype(format, frontmatter) {
        return found(subtype, SubtypeSource::Structural);
    }

    found(format.default_subtype(), SubtypeSource::Default)
}

fn structural_subtype(format: Format, frontmatter: &Frontmatter) -> Option<Subtype> {
    if !frontmatter.list("tools").is_empty() {
        return Some(Subtype::Agent);
    }
    match format {
        Format::Claude if frontmatter.contains("argument-hint") => Some(Subtype::SlashCommand),
        // Skills carry a `name`; slash commands are named by their file.
        Format::Claude if frontmatter.contains("allowed-tools") => {
            if frontmatter.contains("name") {
                Some(Subtype::Skill)
            } else {
                Some(Subtype::SlashCommand)
            }
        }
        Format::Continue if frontmatter.contains("globs") || frontmatter.contains("alwaysApply") => {
            Some(Subtype::Rule)
        }
        _ => None,
    }
}

/// Compound legacy type for a `(format, subtype)` pair.
///
/// ```
/// use prpm_canonical::{to_legacy_type, Format, Subtype};
///
/// assert_eq!(to_legacy_type(Format::Claude, Some(Subtype::Skill)), "claude-skill");
/// assert_eq!(to_legacy_type(Format::Windsurf, Some(Subtype::Agent)), "windsurf");
/// assert_eq!(to_legacy_type(Format::Kiro, Some(Subtype::Collection)), "collection");
/// ```
pub fn to_legacy_type(format: Format, subtype: Option<Subtype>) -> String {
    match (format, subtype) {
        (_, Some(Subtype::Collection)) => "collection".to_string(),
        (_, None | Some(Subtype::Rule) | Some(Subtype::Prompt)) => format.as_str().to_string(),
        (Format::Cursor | Format::Claude, Some(Subtype::Agent)) => format!("{format}-agent"),
        (Format::Claude, Some(Subtype::Skill)) => "claude-skill".to_string(),
        (Format::Cursor | Format::Claude, Some(Subtype::SlashCommand)) => {
            format!("{format}-slash-command")
        }
        _ => format.as_str().to_string(),
    }
}

/// Split a legacy type back into `(format, subtype)`.
///
/// Only the compounds [`to_legacy_type`] produces are recognised. A bare
/// format collapses to `rule`; anything unrecognised becomes `generic`/`rule`.
pub fn from_legacy_type(legacy: &str) -> Taxonomy {
    let legacy = legacy.trim();
    if legacy == "collection" {
        return Taxonomy::new(Format::Generic, Subtype::Collection);
    }
    if let Ok(format) = legacy.parse::<Format>() {
        return Taxonomy::new(format, Subtype::Rule);
    }

    let compound = legacy.split_once('-').and_then(|(head, tail)| {
        let format = head.parse::<Format>().ok()?;
        let subtype = match (format, tail) {
            (Format::Cursor | Format::Claude, "agent") => Subtype::Agent,
            (Format::Claude, "skill") => Subtype::Skill,
            (Format::Cursor | Format::Claude, "slash-command") => Subtype::SlashCommand,
            _ => return None,
        };
        Some(Taxonomy::new(format, subtype))
    });

    compound.unwrap_or_else(|| {
        debug!(legacy, "Unrecognised legacy type, defaulting to generic rule");
        Taxonomy::new(Format::Generic, Subtype::Rule)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fm(yaml: &str) -> Frontmatter {
        Frontmatter::parse(yaml)
    }

    #[test]
    fn explicit_hint_beats_every_marker() {
        let markers = fm("agentType: agent\nskillType: skill\ntype: agent\ntools: Read");
        let resolved = resolve_subtype(Format::Claude, &markers, Some(Subtype::SlashCommand));
        assert_eq!(resolved.subtype, Subtype::SlashCommand);
        assert_eq!(resolved.source, SubtypeSource::Explicit);
    }

    #[test]
    fn generic_type_field_wins_tie_break() {
        let markers = fm("skillType: skill\ntype: agent");
        let resolved = resolve_subtype(Format::Claude, &markers, None);
        assert_eq!(resolved.subtype, Subtype::Agent);
        assert_eq!(resolved.source, SubtypeSource::TypeField);
    }

    #[test]
    fn legacy_fields_checked_in_order() {
        let both = fm("skillType: skill\nagentType: agent");
        assert_eq!(detect_subtype(Format::Claude, &both, None), Subtype::Agent);

        let skill_and_command = fm("commandType: slash-command\nskillType: skill");
        assert_eq!(
            detect_subtype(Format::Claude, &skill_and_command, None),
            Subtype::Skill
        );

        let command = fm("commandType: slash-command");
        assert_eq!(
            detect_subtype(Format::Cursor, &command, None),
            Subtype::SlashCommand
        );
    }

    #[test]
    fn legacy_field_with_wrong_value_is_ignored() {
        let markers = fm("agentType: helper\ntype: rule-ish");
        let resolved = resolve_subtype(Format::Claude, &markers, None);
        assert_eq!(resolved.source, SubtypeSource::Default);
        assert_eq!(resolved.subtype, Subtype::Rule);
    }

    #[test]
    fn tools_imply_agent() {
        let markers = fm("name: helper\ntools: Read, Write");
        let resolved = resolve_subtype(Format::Claude, &markers, None);
        assert_eq!(resolved.subtype, Subtype::Agent);
        assert_eq!(resolved.source, SubtypeSource::Structural);

        let empty_tools = fm("tools: ''");
        assert_eq!(detect_subtype(Format::Claude, &empty_tools, None), Subtype::Rule);
    }

    #[test]
    fn claude_command_structure() {
        let markers = fm("description: Commit\nargument-hint: '[message]'");
        assert_eq!(
            detect_subtype(Format::Claude, &markers, None),
            Subtype::SlashCommand
        );
        // Same field means nothing to Cursor.
        assert_eq!(detect_subtype(Format::Cursor, &markers, None), Subtype::Rule);
    }

    #[test]
    fn claude_allowed_tools_split_skills_from_commands() {
        let skill = fm("name: pdf-tools
description: PDFs
allowed-tools: Read, Bash");
        assert_eq!(detect_subtype(Format::Claude, &skill, None), Subtype::Skill);

        let command = fm("description: Commit
allowed-tools: Bash(git:*)");
        assert_eq!(detect_subtype(Format::Claude, &command, None), Subtype::SlashCommand);
    }

    #[test]
    fn defaults_per_format() {
        let empty = Frontmatter::default();
        assert_eq!(detect_subtype(Format::Claude, &empty, None), Subtype::Rule);
        assert_eq!(detect_subtype(Format::Cursor, &empty, None), Subtype::Rule);
        assert_eq!(detect_subtype(Format::Continue, &empty, None), Subtype::Prompt);
        assert_eq!(
            detect_subtype(Format::Continue, &fm("alwaysApply: true"), None),
            Subtype::Rule
        );
    }

    #[test]
    fn legacy_type_table() {
        assert_eq!(to_legacy_type(Format::Cursor, None), "cursor");
        assert_eq!(to_legacy_type(Format::Continue, Some(Subtype::Prompt)), "continue");
        assert_eq!(to_legacy_type(Format::Cursor, Some(Subtype::Agent)), "cursor-agent");
        assert_eq!(to_legacy_type(Format::Claude, Some(Subtype::Agent)), "claude-agent");
        assert_eq!(to_legacy_type(Format::Claude, Some(Subtype::Skill)), "claude-skill");
        assert_eq!(to_legacy_type(Format::Cursor, Some(Subtype::Skill)), "cursor");
        assert_eq!(
            to_legacy_type(Format::Cursor, Some(Subtype::SlashCommand)),
            "cursor-slash-command"
        );
        assert_eq!(
            to_legacy_type(Format::Claude, Some(Subtype::SlashCommand)),
            "claude-slash-command"
        );
        assert_eq!(to_legacy_type(Format::Kiro, Some(Subtype::Agent)), "kiro");
        assert_eq!(to_legacy_type(Format::Claude, Some(Subtype::Collection)), "collection");
    }

    #[test]
    fn from_legacy_type_splits_on_first_hyphen() {
        assert_eq!(
            from_legacy_type("claude-slash-command"),
            Taxonomy::new(Format::Claude, Subtype::SlashCommand)
        );
        assert_eq!(
            from_legacy_type("cursor-agent"),
            Taxonomy::new(Format::Cursor, Subtype::Agent)
        );
        assert_eq!(
            from_legacy_type("windsurf"),
            Taxonomy::new(Format::Windsurf, Subtype::Rule)
        );
        assert_eq!(
            from_legacy_type("collection"),
            Taxonomy::new(Format::Generic, Subtype::Collection)
        );
    }

    #[test]
    fn from_legacy_type_rejects_unproduced_compounds() {
        assert_eq!(
            from_legacy_type("cursor-skill"),
            Taxonomy::new(Format::Generic, Subtype::Rule)
        );
        assert_eq!(
            from_legacy_type("nonsense"),
            Taxonomy::new(Format::Generic, Subtype::Rule)
        );
    }

    #[test]
    fn legacy_round_trip_is_consistent() {
        for format in Format::ALL {
            for subtype in Subtype::ALL {
                let legacy = to_legacy_type(format, Some(subtype));
                let back = from_legacy_type(&legacy);
                assert_eq!(back.legacy_type(), legacy, "{format}/{subtype}");
                if subtype == Subtype::Collection {
                    assert_eq!(back.subtype, Subtype::Collection);
                } else {
                    assert_eq!(back.format, format, "{format}/{subtype}");
                }
                if legacy.contains('-') {
                    assert_eq!(back.subtype, subtype, "{format}/{subtype}");
                }
            }
        }
    }
}
