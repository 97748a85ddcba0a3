//! Canonical package model for prpm format conversion.
//!
//! Every editor format is parsed into, and rendered from, a single
//! [`CanonicalPackage`]: package facts, a `(format, subtype)` taxonomy, and an
//! ordered list of semantic [`Section`]s. This crate holds that model, the
//! taxonomy resolver, and the frontmatter reader/writer shared by converters.
//!
//! # Example
//!
//! ```
//! use prpm_canonical::{CanonicalPackage, Format, Rule, Section, Subtype};
//!
//! let pkg = CanonicalPackage::new("pkg-1", "ts-style", Format::Cursor, Subtype::Rule)
//!     .with_sections(vec![
//!         Section::metadata("TypeScript Style", "House style for TS code"),
//!         Section::rules("Rules", vec![Rule::new("Use TypeScript")]),
//!     ]);
//!
//! assert_eq!(pkg.legacy_type(), "cursor");
//! assert_eq!(pkg.title(), "TypeScript Style");
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod format;
pub mod frontmatter;
pub mod package;
pub mod section;
pub mod taxonomy;

pub use error::CanonicalError;
pub use format::{Format, Subtype};
pub use frontmatter::{parse_document, Frontmatter, FrontmatterWriter, ParsedDocument};
pub use package::{CanonicalPackage, PackageInput, PackageMetadata, SourceText, DEFAULT_VERSION};
pub use section::{
    CanonicalContent, ContextSection, CustomSection, Example, ExamplesSection,
    InstructionsSection, MetadataSection, PersonaData, PersonaSection, Priority, Rule,
    RulesSection, Section, SectionKind, ToolsSection,
};
pub use taxonomy::{
    detect_subtype, from_legacy_type, resolve_subtype, to_legacy_type, SubtypeResolution,
    SubtypeSource, Taxonomy, SUBTYPE_MARKER_KEYS,
};
