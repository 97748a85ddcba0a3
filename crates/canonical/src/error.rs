//! Error types for the canonical model.

use thiserror::Error;

/// Errors raised while decoding canonical values from strings or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CanonicalError {
    /// The string does not name a known format.
    #[error("Unknown format: '{0}'")]
    UnknownFormat(String),

    /// The string does not name a known subtype.
    #[error("Unknown subtype: '{0}'")]
    UnknownSubtype(String),

    /// A section object carried no string `type` discriminant.
    #[error("Section is missing its 'type' discriminant")]
    MissingSectionType,

    /// A known section kind whose payload does not match its shape.
    #[error("Invalid '{kind}' section: {message}")]
    InvalidSection {
        /// The section discriminant.
        kind: String,
        /// Decoder message.
        message: String,
    },
}
