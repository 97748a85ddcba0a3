//! Conversion options and per-format configuration.
//!
//! Each renderer setting resolves through [`resolve`]: an explicit option wins,
//! then the matching config blob carried in package metadata, then a default.
//! Precedence is per field, not per blob.

use prpm_canonical::{CanonicalPackage, Frontmatter};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ConvertError, Result};

/// Three-tier precedence: explicit option, then package metadata, then default.
///
/// ```
/// use prpm_convert::options::resolve;
///
/// assert_eq!(resolve(Some(true), Some(false), false), true);
/// assert_eq!(resolve(None, Some("meta"), "default"), "meta");
/// assert_eq!(resolve::<u8>(None, None, 7), 7);
/// ```
pub fn resolve<T>(explicit: Option<T>, from_metadata: Option<T>, default: T) -> T {
    resolve_opt(explicit, from_metadata).unwrap_or(default)
}

/// Two-tier precedence for settings with no default.
pub fn resolve_opt<T>(explicit: Option<T>, from_metadata: Option<T>) -> Option<T> {
    explicit.or(from_metadata)
}

/// A config blob stored in package metadata under a fixed key.
pub trait FormatConfig: Serialize + DeserializeOwned + Default {
    /// Metadata key, e.g. `cursorConfig`.
    const KEY: &'static str;
}

/// Decodes this format's config blob from package metadata.
///
/// A missing blob decodes to the default; a malformed one is an error.
pub fn metadata_config<T: FormatConfig>(pkg: &CanonicalPackage) -> Result<T> {
    match pkg.metadata.config_blob(T::KEY) {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|source| {
            ConvertError::InvalidConfig {
                key: T::KEY,
                source,
            }
        }),
    }
}

/// Stores a config blob in package metadata, skipping empty configs.
pub(crate) fn store_config<T: FormatConfig>(pkg: &mut CanonicalPackage, config: &T) {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) if map.is_empty() => {}
        Ok(value) => {
            pkg.metadata.config.insert(T::KEY.to_string(), value);
        }
        Err(e) => warn!(key = T::KEY, error = %e, "Failed to store format config"),
    }
}

/// Frontmatter fields outside `known`, carried verbatim for same-format renders.
pub(crate) fn extra_fields(frontmatter: &Frontmatter, known: &[&str]) -> Map<String, Value> {
    frontmatter
        .keys()
        .filter(|key| !known.contains(key))
        .filter_map(|key| Some((key.to_string(), frontmatter.json(key)?)))
        .collect()
}

/// Accepts either a single string (comma-separated) or a list of strings.
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(s)) => Some(prpm_canonical::frontmatter::split_list(&s)),
        Some(OneOrMany::Many(items)) => Some(items),
    })
}

/// Cursor MDC settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub globs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_apply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatConfig for CursorConfig {
    const KEY: &'static str = "cursorConfig";
}

/// Claude agent, skill and command settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_hint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatConfig for ClaudeConfig {
    const KEY: &'static str = "claudeConfig";
}

/// Copilot instruction settings. `apply_to` makes the file path-specific.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotConfig {
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub apply_to: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatConfig for CopilotConfig {
    const KEY: &'static str = "copilotConfig";
}

/// When a Kiro steering file is pulled into context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KiroInclusion {
    #[default]
    Always,
    FileMatch,
    Manual,
}

impl KiroInclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            KiroInclusion::Always => "always",
            KiroInclusion::FileMatch => "fileMatch",
            KiroInclusion::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "always" => Some(KiroInclusion::Always),
            "fileMatch" => Some(KiroInclusion::FileMatch),
            "manual" => Some(KiroInclusion::Manual),
            _ => None,
        }
    }
}

/// Kiro steering settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KiroConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<KiroInclusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_match_pattern: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatConfig for KiroConfig {
    const KEY: &'static str = "kiroConfig";
}

/// Continue rule settings. Only an explicit option produces a header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub globs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_apply: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatConfig for ContinueConfig {
    const KEY: &'static str = "continueConfig";
}

/// Caller-supplied render options. Every field is optional.
///
/// ```
/// use prpm_convert::ConversionOptions;
///
/// let options: ConversionOptions =
///     serde_json::from_str(r#"{"kiroConfig": {"inclusion": "manual"}}"#).unwrap();
/// assert!(options.kiro_config.is_some());
/// assert!(options.cursor_config.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_config: Option<CursorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_config: Option<ClaudeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copilot_config: Option<CopilotConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kiro_config: Option<KiroConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_config: Option<ContinueConfig>,
}
