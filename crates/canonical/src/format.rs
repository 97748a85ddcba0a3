use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CanonicalError;

/// An editor ecosystem a package can be parsed from or rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Cursor MDC rules (`.cursor/rules/*.mdc`).
    Cursor,
    /// Claude Code agents, skills, commands and rules.
    Claude,
    /// Continue rules and prompts.
    Continue,
    /// Windsurf rules (`.windsurfrules`).
    Windsurf,
    /// GitHub Copilot instructions.
    Copilot,
    /// Kiro steering files.
    Kiro,
    /// Plain markdown with optional frontmatter.
    Generic,
    /// MCP server packages.
    Mcp,
}

impl Format {
    /// Every format, in declaration order.
    pub const ALL: [Format; 8] = [
        Format::Cursor,
        Format::Claude,
        Format::Continue,
        Format::Windsurf,
        Format::Copilot,
        Format::Kiro,
        Format::Generic,
        Format::Mcp,
    ];

    /// Returns the stable lowercase label for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Cursor => "cursor",
            Format::Claude => "claude",
            Format::Continue => "continue",
            Format::Windsurf => "windsurf",
            Format::Copilot => "copilot",
            Format::Kiro => "kiro",
            Format::Generic => "generic",
            Format::Mcp => "mcp",
        }
    }

    /// Subtype assumed when nothing in a file says otherwise.
    ///
    /// Continue's primary unit is a prompt; everything else defaults to a rule.
    pub fn default_subtype(&self) -> Subtype {
        match self {
            Format::Continue => Subtype::Prompt,
            _ => Subtype::Rule,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = CanonicalError;

    /// ```
    /// use prpm_canonical::Format;
    ///
    /// assert_eq!("Cursor".parse::<Format>().unwrap(), Format::Cursor);
    /// assert!("vim".parse::<Format>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Format::ALL
            .into_iter()
            .find(|f| key.eq_ignore_ascii_case(f.as_str()))
            .ok_or_else(|| CanonicalError::UnknownFormat(s.to_string()))
    }
}

/// The functional role of a package within its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subtype {
    Rule,
    Agent,
    Skill,
    SlashCommand,
    Prompt,
    Workflow,
    Tool,
    Template,
    Collection,
}

impl Subtype {
    /// Every subtype, in declaration order.
    pub const ALL: [Subtype; 9] = [
        Subtype::Rule,
        Subtype::Agent,
        Subtype::Skill,
        Subtype::SlashCommand,
        Subtype::Prompt,
        Subtype::Workflow,
        Subtype::Tool,
        Subtype::Template,
        Subtype::Collection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Rule => "rule",
            Subtype::Agent => "agent",
            Subtype::Skill => "skill",
            Subtype::SlashCommand => "slash-command",
            Subtype::Prompt => "prompt",
            Subtype::Workflow => "workflow",
            Subtype::Tool => "tool",
            Subtype::Template => "template",
            Subtype::Collection => "collection",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Subtype::ALL
            .into_iter()
            .find(|t| key.eq_ignore_ascii_case(t.as_str()))
            .ok_or_else(|| CanonicalError::UnknownSubtype(s.to_string()))
    }
}
