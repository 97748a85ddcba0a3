//! Errors raised inside a renderer before they are contained at the boundary.

use prpm_canonical::Format;
use thiserror::Error;

/// A rendering failure. Never escapes [`crate::FormatConverter::render`];
/// it becomes a zero-quality [`crate::ConversionResult`] instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A format config blob in package metadata has the wrong shape.
    #[error("Invalid {key} in package metadata: {source}")]
    InvalidConfig {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// More than one metadata section.
    #[error("Package has {0} metadata sections; at most one is allowed")]
    DuplicateMetadata(usize),

    /// No renderer exists for the target.
    #[error("Conversion to {0} is not supported")]
    UnsupportedTarget(Format),

    /// A carried frontmatter value could not be written as YAML.
    #[error("Failed to write frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
