//! The canonical package: the sole interchange point between formats.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::format::{Format, Subtype};
use crate::section::{CanonicalContent, Section};
use crate::taxonomy::to_legacy_type;

/// Default package version when none is supplied.
pub const DEFAULT_VERSION: &str = "1.0.0";

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Package-level metadata.
///
/// Format-specific configuration blobs (`cursorConfig`, `claudeConfig`,
/// `copilotConfig`, `kiroConfig`, `continueConfig`) are kept as raw JSON so
/// storage can round-trip them verbatim; converters decode them on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self {
            author: None,
            version: default_version(),
            tags: Vec::new(),
            config: Map::new(),
        }
    }
}

impl PackageMetadata {
    /// Raw config blob stored under `key`.
    pub fn config_blob(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    /// Stores a config blob, replacing any previous value.
    pub fn set_config<T: Serialize>(&mut self, key: &str, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.config.insert(key.to_string(), value);
        Ok(())
    }
}

/// Caller-supplied package facts that accompany raw file text on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInput {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: default_version(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The package name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// Raw text a package was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceText {
    pub format: Format,
    pub raw: String,
}

/// Format-neutral package representation.
///
/// The legacy `type` string is always derived from `(format, subtype)`; it is
/// emitted on serialization and ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPackage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: PackageMetadata,
    format: Format,
    subtype: Subtype,
    #[serde(default)]
    pub content: CanonicalContent,
    #[serde(default)]
    pub source: Option<SourceText>,
}

impl CanonicalPackage {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        format: Format,
        subtype: Subtype,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            metadata: PackageMetadata::default(),
            format,
            subtype,
            content: CanonicalContent::default(),
            source: None,
        }
    }

    /// Seeds a package from caller input.
    pub fn from_input(input: &PackageInput, format: Format, subtype: Subtype) -> Self {
        let mut pkg = Self::new(input.id.clone(), input.display_name(), format, subtype);
        pkg.description = input.description.clone().unwrap_or_default();
        pkg.metadata.author = input.author.clone();
        if !input.version.trim().is_empty() {
            pkg.metadata.version = input.version.clone();
        }
        pkg.metadata.tags = input.tags.clone();
        pkg
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.content = CanonicalContent::new(sections);
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.content.sections.push(section);
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn subtype(&self) -> Subtype {
        self.subtype
    }

    /// Sets both taxonomy fields together; the legacy type follows.
    pub fn set_taxonomy(&mut self, format: Format, subtype: Subtype) {
        self.format = format;
        self.subtype = subtype;
    }

    /// Backward-compatible compound type, e.g. `claude-skill`.
    pub fn legacy_type(&self) -> String {
        to_legacy_type(self.format, Some(self.subtype))
    }

    /// Title from the metadata section, else the package name.
    pub fn title(&self) -> &str {
        self.content
            .metadata()
            .map(|m| m.title.as_str())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Description from the metadata section, else the package description.
    pub fn description_text(&self) -> Option<&str> {
        self.content
            .metadata()
            .map(|m| m.description.as_str())
            .filter(|d| !d.trim().is_empty())
            .or_else(|| Some(self.description.as_str()).filter(|d| !d.trim().is_empty()))
    }
}

impl Serialize for CanonicalPackage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.source.is_some() { 9 } else { 8 };
        let mut state = serializer.serialize_struct("CanonicalPackage", fields)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.serialize_field("format", &self.format)?;
        state.serialize_field("subtype", &self.subtype)?;
        state.serialize_field("type", &self.legacy_type())?;
        state.serialize_field("content", &self.content)?;
        if let Some(source) = &self.source {
            state.serialize_field("source", source)?;
        }
        state.end()
    }
}
