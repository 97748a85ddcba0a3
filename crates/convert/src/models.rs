//! Claude model name normalisation.
//!
//! Agent and command frontmatter accepts the shorthand aliases Claude Code
//! understands. Full model IDs carried in package metadata are collapsed to
//! those aliases on render.

/// Claude model shorthand names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaudeModel {
    Opus,
    Sonnet,
    Haiku,
    /// Use whatever model the parent conversation runs on.
    Inherit,
}

impl ClaudeModel {
    /// Parse a Claude model string into the enum variant.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        // Match both shorthand and full model IDs
        if lower.contains("opus") {
            Some(Self::Opus)
        } else if lower.contains("sonnet") {
            Some(Self::Sonnet)
        } else if lower.contains("haiku") {
            Some(Self::Haiku)
        } else if lower == "inherit" {
            Some(Self::Inherit)
        } else {
            None
        }
    }

    /// Get the canonical shorthand name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opus => "opus",
            Self::Sonnet => "sonnet",
            Self::Haiku => "haiku",
            Self::Inherit => "inherit",
        }
    }
}

/// Collapse a model name to its alias. Unrecognized names pass through.
pub fn normalize_model(model: &str) -> String {
    match ClaudeModel::parse(model) {
        Some(known) => known.as_str().to_string(),
        None => model.trim().to_string(),
    }
}
