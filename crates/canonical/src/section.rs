//! Semantic section types every format is decomposed into.
//!
//! Sections serialize as JSON objects tagged by a `type` field. A known `type`
//! must carry exactly the payload fields for that kind; anything else is a
//! decode error. An unrecognized `type` decodes into [`Section::Unknown`] so
//! packages written by newer producers still load and degrade gracefully.

use serde::de::{DeserializeOwned, Error as DeError};
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::CanonicalError;
use crate::format::Format;

/// Emphasis level for an instructions block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Package title block. At most one per package, conventionally first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MetadataSection {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Free-text guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct InstructionsSection {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A single rule with optional rationale and inline examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Rule {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl Rule {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rationale: None,
            examples: Vec::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}

/// A list of rules, bulleted or numbered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RulesSection {
    pub title: String,
    pub items: Vec<Rule>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ordered: bool,
}

/// A code example. `good: Some(false)` marks an anti-pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Example {
    pub description: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good: Option<bool>,
}

impl Example {
    pub fn new(description: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            code: code.into(),
            language: None,
            good: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn good(mut self) -> Self {
        self.good = Some(true);
        self
    }

    pub fn bad(mut self) -> Self {
        self.good = Some(false);
        self
    }

    /// True only for examples explicitly flagged as anti-patterns.
    pub fn is_anti_pattern(&self) -> bool {
        self.good == Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ExamplesSection {
    pub title: String,
    pub examples: Vec<Example>,
}

/// Who the assistant should be.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PersonaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expertise: Vec<String>,
}

impl PersonaData {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.icon.is_none()
            && self.style.is_empty()
            && self.expertise.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PersonaSection {
    pub data: PersonaData,
}

/// Background or reference material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ContextSection {
    pub title: String,
    pub content: String,
}

/// Capability declarations, meaningful only to agent-capable formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ToolsSection {
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Format-specific content that only round-trips into its own editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CustomSection {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_type: Option<Format>,
}

impl CustomSection {
    /// Whether this block may be emitted verbatim into `target`.
    ///
    /// Unset and `generic` editor types pass through everywhere.
    pub fn applies_to(&self, target: Format) -> bool {
        match self.editor_type {
            None | Some(Format::Generic) => true,
            Some(editor) => editor == target,
        }
    }
}

/// Discriminant of the section kinds this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Metadata,
    Instructions,
    Rules,
    Examples,
    Persona,
    Context,
    Tools,
    Custom,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Metadata,
        SectionKind::Instructions,
        SectionKind::Rules,
        SectionKind::Examples,
        SectionKind::Persona,
        SectionKind::Context,
        SectionKind::Tools,
        SectionKind::Custom,
    ];

    /// The wire discriminant (`type` field value).
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Metadata => "metadata",
            SectionKind::Instructions => "instructions",
            SectionKind::Rules => "rules",
            SectionKind::Examples => "examples",
            SectionKind::Persona => "persona",
            SectionKind::Context => "context",
            SectionKind::Tools => "tools",
            SectionKind::Custom => "custom",
        }
    }

    /// Human-facing label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Metadata => "Metadata",
            SectionKind::Instructions => "Instructions",
            SectionKind::Rules => "Rules",
            SectionKind::Examples => "Examples",
            SectionKind::Persona => "Persona",
            SectionKind::Context => "Context",
            SectionKind::Tools => "Tools",
            SectionKind::Custom => "Custom",
        }
    }

    fn parse(key: &str) -> Option<Self> {
        SectionKind::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic block of a canonical package.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Metadata(MetadataSection),
    Instructions(InstructionsSection),
    Rules(RulesSection),
    Examples(ExamplesSection),
    Persona(PersonaSection),
    Context(ContextSection),
    Tools(ToolsSection),
    Custom(CustomSection),
    /// A section kind this version does not know, kept verbatim.
    Unknown {
        kind: String,
        payload: Map<String, Value>,
    },
}

impl Section {
    pub fn metadata(title: impl Into<String>, description: impl Into<String>) -> Self {
        Section::Metadata(MetadataSection {
            title: title.into(),
            description: description.into(),
            icon: None,
        })
    }

    pub fn instructions(title: impl Into<String>, content: impl Into<String>) -> Self {
        Section::Instructions(InstructionsSection {
            title: title.into(),
            content: content.into(),
            priority: None,
        })
    }

    pub fn rules(title: impl Into<String>, items: Vec<Rule>) -> Self {
        Section::Rules(RulesSection {
            title: title.into(),
            items,
            ordered: false,
        })
    }

    pub fn examples(title: impl Into<String>, examples: Vec<Example>) -> Self {
        Section::Examples(ExamplesSection {
            title: title.into(),
            examples,
        })
    }

    pub fn persona(data: PersonaData) -> Self {
        Section::Persona(PersonaSection { data })
    }

    pub fn context(title: impl Into<String>, content: impl Into<String>) -> Self {
        Section::Context(ContextSection {
            title: title.into(),
            content: content.into(),
        })
    }

    pub fn tools(tools: Vec<String>) -> Self {
        Section::Tools(ToolsSection {
            tools,
            description: None,
        })
    }

    pub fn custom(content: impl Into<String>, editor_type: Option<Format>) -> Self {
        Section::Custom(CustomSection {
            content: content.into(),
            editor_type,
        })
    }

    /// Known kind of this section, `None` for [`Section::Unknown`].
    pub fn kind(&self) -> Option<SectionKind> {
        match self {
            Section::Metadata(_) => Some(SectionKind::Metadata),
            Section::Instructions(_) => Some(SectionKind::Instructions),
            Section::Rules(_) => Some(SectionKind::Rules),
            Section::Examples(_) => Some(SectionKind::Examples),
            Section::Persona(_) => Some(SectionKind::Persona),
            Section::Context(_) => Some(SectionKind::Context),
            Section::Tools(_) => Some(SectionKind::Tools),
            Section::Custom(_) => Some(SectionKind::Custom),
            Section::Unknown { .. } => None,
        }
    }

    /// The wire discriminant, including unknown ones.
    pub fn type_name(&self) -> &str {
        match self {
            Section::Unknown { kind, .. } => kind,
            known => known.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Builds a section from its discriminant and remaining payload fields.
    pub fn from_parts(kind: &str, payload: Map<String, Value>) -> Result<Self, CanonicalError> {
        let Some(known) = SectionKind::parse(kind) else {
            return Ok(Section::Unknown {
                kind: kind.to_string(),
                payload,
            });
        };
        let value = Value::Object(payload);
        let section = match known {
            SectionKind::Metadata => Section::Metadata(decode(kind, value)?),
            SectionKind::Instructions => Section::Instructions(decode(kind, value)?),
            SectionKind::Rules => Section::Rules(decode(kind, value)?),
            SectionKind::Examples => Section::Examples(decode(kind, value)?),
            SectionKind::Persona => Section::Persona(decode(kind, value)?),
            SectionKind::Context => Section::Context(decode(kind, value)?),
            SectionKind::Tools => Section::Tools(decode(kind, value)?),
            SectionKind::Custom => Section::Custom(decode(kind, value)?),
        };
        Ok(section)
    }

    fn payload(&self) -> serde_json::Result<Map<String, Value>> {
        let value = match self {
            Section::Metadata(s) => serde_json::to_value(s)?,
            Section::Instructions(s) => serde_json::to_value(s)?,
            Section::Rules(s) => serde_json::to_value(s)?,
            Section::Examples(s) => serde_json::to_value(s)?,
            Section::Persona(s) => serde_json::to_value(s)?,
            Section::Context(s) => serde_json::to_value(s)?,
            Section::Tools(s) => serde_json::to_value(s)?,
            Section::Custom(s) => serde_json::to_value(s)?,
            Section::Unknown { payload, .. } => return Ok(payload.clone()),
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

fn decode<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T, CanonicalError> {
    serde_json::from_value(value).map_err(|e| CanonicalError::InvalidSection {
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = self.payload().map_err(S::Error::custom)?;
        map.insert("type".to_string(), Value::String(self.type_name().to_string()));
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let kind = match map.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(D::Error::custom(CanonicalError::MissingSectionType)),
        };
        Section::from_parts(&kind, map).map_err(D::Error::custom)
    }
}

/// Ordered section sequence. Insertion order is render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalContent {
    pub sections: Vec<Section>,
}

impl CanonicalContent {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The first metadata section, if any.
    pub fn metadata(&self) -> Option<&MetadataSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Metadata(m) => Some(m),
            _ => None,
        })
    }

    /// The first persona, if any.
    pub fn persona(&self) -> Option<&PersonaData> {
        self.sections.iter().find_map(|s| match s {
            Section::Persona(p) => Some(&p.data),
            _ => None,
        })
    }

    /// All tool names across tools sections, in order.
    pub fn tools(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                Section::Tools(t) => Some(t.tools.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn has(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind() == Some(kind))
    }

    pub fn count(&self, kind: SectionKind) -> usize {
        self.sections
            .iter()
            .filter(|s| s.kind() == Some(kind))
            .count()
    }
}

impl<'a> IntoIterator for &'a CanonicalContent {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
