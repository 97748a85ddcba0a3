//! Converters between prpm canonical packages and editor rule formats.
//!
//! Parsing (`from_*`) never fails: ambiguous input resolves to documented
//! defaults. Rendering (`to_*`) always returns a [`ConversionResult`] carrying
//! the content, warnings for anything the target cannot express, a lossy flag
//! and a quality score.
//!
//! # Example
//!
//! ```
//! use prpm_canonical::{Format, PackageInput};
//! use prpm_convert::{convert, parse_package, ConversionOptions};
//!
//! let claude = "---\nname: reviewer\ndescription: Reviews code\ntools: Read, Grep\n---\n\n## Instructions\n\nReview every diff.\n";
//! let pkg = parse_package(claude, &PackageInput::new("pkg-1"), Some(Format::Claude), None);
//! assert_eq!(pkg.legacy_type(), "claude-agent");
//!
//! let result = convert(&pkg, Format::Windsurf, &ConversionOptions::default());
//! assert!(result.lossy_conversion);
//! assert!(result.content.contains("Review every diff."));
//! assert!(!result.content.starts_with("---"));
//! ```

#![deny(unsafe_code)]

use std::sync::LazyLock;

use prpm_canonical::{CanonicalPackage, Format, PackageInput, Subtype};

pub mod error;
pub mod formats;
pub mod markdown;
pub mod models;
pub mod options;
pub mod registry;
pub mod report;
pub mod sniff;

pub use error::ConvertError;
pub use formats::{
    from_claude, from_continue, from_copilot, from_cursor, from_generic, from_kiro, from_windsurf,
    to_claude, to_continue, to_copilot, to_cursor, to_generic, to_kiro, to_windsurf,
    FormatConverter, SectionSupport,
};
pub use models::{normalize_model, ClaudeModel};
pub use options::{
    ClaudeConfig, ContinueConfig, ConversionOptions, CopilotConfig, CursorConfig, KiroConfig,
    KiroInclusion,
};
pub use registry::Registry;
pub use report::{ConversionResult, ConversionWarning};
pub use sniff::{detect_format, resolve_format};

static DEFAULT_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::default);

/// The registry holding every built-in converter.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// Parse raw file text. An unknown format is sniffed from the content and
/// falls back to generic markdown.
pub fn parse_package(
    content: &str,
    input: &PackageInput,
    format: Option<Format>,
    subtype: Option<Subtype>,
) -> CanonicalPackage {
    let format = resolve_format(format, content);
    DEFAULT_REGISTRY.parse(format, content, input, subtype)
}

/// Render a package into one target format.
pub fn convert(pkg: &CanonicalPackage, target: Format, options: &ConversionOptions) -> ConversionResult {
    DEFAULT_REGISTRY.render(pkg, target, options)
}

/// Render a package into every built-in format.
pub fn convert_to_all(pkg: &CanonicalPackage, options: &ConversionOptions) -> Vec<ConversionResult> {
    DEFAULT_REGISTRY.render_all(pkg, options)
}
