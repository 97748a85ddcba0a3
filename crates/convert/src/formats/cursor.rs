//! Cursor `.mdc` rules.
//!
//! Every rendered file carries an MDC header with `name`, `description`,
//! `version`, `globs` and `alwaysApply`. A package parsed from a complete
//! Cursor file renders back byte-for-byte unless the caller overrides config
//! or the package was changed after parsing.

use prpm_canonical::frontmatter::{has_complete_frontmatter, parse_document, FrontmatterWriter};
use prpm_canonical::{
    CanonicalPackage, Format, PackageInput, Section, Subtype, SUBTYPE_MARKER_KEYS,
};
use tracing::debug;

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{
    description_or_deduct, merge_extra, parse_markdown, write_extra, ParsedMarkdown,
};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::options::{
    extra_fields, metadata_config, resolve, resolve_opt, store_config, ConversionOptions,
    CursorConfig, FormatConfig,
};
use crate::report::RenderReport;

/// Glob applied when none is configured.
pub const DEFAULT_GLOB: &str = "**/*";

const HEADER_KEYS: [&str; 6] = ["name", "description", "version", "globs", "alwaysApply", "tags"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CursorConverter;

impl FormatConverter for CursorConverter {
    fn format(&self) -> Format {
        Format::Cursor
    }

    fn support(&self) -> SectionSupport {
        SectionSupport::without_tools()
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_cursor(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        let explicit = options.cursor_config.as_ref();
        if explicit.is_none() {
            if let Some(raw) = identity_source(pkg) {
                debug!(package = %pkg.id, "Content already in Cursor format, passing through");
                return Ok(raw.to_string());
            }
        }

        let carried: CursorConfig = metadata_config(pkg)?;
        let description = match resolve_opt(
            explicit.and_then(|c| c.description.clone()),
            carried.description.clone(),
        ) {
            Some(description) => description,
            None => description_or_deduct(pkg, report).unwrap_or_default(),
        };
        let name = resolve(
            explicit.and_then(|c| c.name.clone()),
            carried.name.clone(),
            pkg.name.clone(),
        );
        let version = resolve(
            explicit.and_then(|c| c.version.clone()),
            carried.version.clone(),
            pkg.metadata.version.clone(),
        );
        let globs = resolve(
            explicit.and_then(|c| c.globs.clone()),
            carried.globs.clone(),
            vec![DEFAULT_GLOB.to_string()],
        );
        let always_apply = resolve(
            explicit.and_then(|c| c.always_apply),
            carried.always_apply,
            false,
        );
        let tags = resolve_opt(explicit.and_then(|c| c.tags.clone()), carried.tags.clone())
            .or_else(|| Some(pkg.metadata.tags.clone()))
            .filter(|t| !t.is_empty());

        let mut header = FrontmatterWriter::new()
            .field("name", &name)
            .field("description", &description)
            .field("version", &version)
            .list("globs", &globs)
            .flag("alwaysApply", always_apply);
        if let Some(tags) = &tags {
            header = header.list("tags", tags);
        }
        let extra = merge_extra(&carried.extra, explicit.map(|c| &c.extra));
        let header = write_extra(header, &extra, &HEADER_KEYS)?.finish();

        let body = render_body(pkg, &self.support(), report)?;
        Ok(format!("{header}\n{body}"))
    }
}

/// Raw text to emit verbatim when the package is already a Cursor file.
fn identity_source(pkg: &CanonicalPackage) -> Option<&str> {
    if let Some(source) = &pkg.source {
        if source.format == Format::Cursor
            && has_complete_frontmatter(&source.raw)
            && matches_source(pkg, &source.raw)
        {
            return Some(&source.raw);
        }
    }
    match pkg.content.sections.as_slice() {
        [Section::Custom(custom)]
            if matches!(custom.editor_type, None | Some(Format::Cursor))
                && has_complete_frontmatter(&custom.content) =>
        {
            Some(&custom.content)
        }
        _ => None,
    }
}

/// Whether the package still says what `raw` says: same body sections,
/// description, header name and carried config.
fn matches_source(pkg: &CanonicalPackage, raw: &str) -> bool {
    let reparsed = from_cursor(raw, &PackageInput::new(pkg.id.clone()), Some(pkg.subtype()));
    let body = |p: &CanonicalPackage| {
        p.content
            .iter()
            .filter(|s| !matches!(s, Section::Metadata(_)))
            .cloned()
            .collect::<Vec<_>>()
    };
    let description = |p: &CanonicalPackage| p.content.metadata().map(|m| m.description.clone());
    let name_matches = parse_document(raw)
        .fields()
        .str("name")
        .map_or(true, |name| name == pkg.name);

    let matches = name_matches
        && body(&reparsed) == body(pkg)
        && description(&reparsed) == description(pkg)
        && reparsed.metadata.config_blob(CursorConfig::KEY)
            == pkg.metadata.config_blob(CursorConfig::KEY);
    if !matches {
        debug!(package = %pkg.id, "Package changed since it was parsed, rendering in full");
    }
    matches
}

/// Parse a Cursor rule file.
pub fn from_cursor(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    let ParsedMarkdown {
        mut pkg,
        frontmatter,
        version,
    } = parse_markdown(Format::Cursor, content, input, subtype);

    let known: Vec<&str> = HEADER_KEYS.iter().chain(&SUBTYPE_MARKER_KEYS).copied().collect();
    let globs = frontmatter.list("globs");
    let config = CursorConfig {
        version,
        globs: (!globs.is_empty()).then_some(globs),
        always_apply: frontmatter.bool("alwaysApply"),
        extra: extra_fields(&frontmatter, &known),
        ..Default::default()
    };
    store_config(&mut pkg, &config);
    pkg
}

/// Render a package as a Cursor rule.
pub fn to_cursor(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    CursorConverter.render(pkg, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpm_canonical::{Rule, SectionKind};

    const MDC: &str = "---\ndescription: TypeScript conventions\nglobs:\n  - \"**/*.ts\"\nalwaysApply: false\n---\n\n# TypeScript\n\n- Use TypeScript\n";

    fn input() -> PackageInput {
        PackageInput::new("pkg-1").with_name("ts-rules")
    }

    #[test]
    fn parse_carries_mdc_fields() {
        let pkg = from_cursor(MDC, &input(), None);
        assert_eq!(pkg.format(), Format::Cursor);
        assert_eq!(pkg.subtype(), Subtype::Rule);
        let config: CursorConfig = metadata_config(&pkg).unwrap();
        assert_eq!(config.globs, Some(vec!["**/*.ts".to_string()]));
        assert_eq!(config.always_apply, Some(false));
        assert!(pkg.content.has(SectionKind::Rules));
    }

    #[test]
    fn identity_round_trip() {
        let pkg = from_cursor(MDC, &input(), None);
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert_eq!(result.content, MDC);
        assert_eq!(result.quality_score, 100);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn added_sections_disable_passthrough() {
        let pkg = from_cursor(MDC, &input(), None)
            .with_section(Section::rules("Added", vec![Rule::new("Run the linter")]));
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert_ne!(result.content, MDC);
        assert!(result.content.contains("- Run the linter"));
        assert!(result.content.contains("- Use TypeScript"));
        assert!(result.content.contains("description: TypeScript conventions"));
    }

    #[test]
    fn edited_config_disables_passthrough() {
        let mut pkg = from_cursor(MDC, &input(), None);
        store_config(
            &mut pkg,
            &CursorConfig {
                always_apply: Some(true),
                ..Default::default()
            },
        );
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert!(result.content.contains("alwaysApply: true"));
    }

    #[test]
    fn explicit_config_disables_passthrough() {
        let pkg = from_cursor(MDC, &input(), None);
        let options = ConversionOptions {
            cursor_config: Some(CursorConfig {
                always_apply: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = to_cursor(&pkg, &options);
        assert!(result.content.contains("alwaysApply: true"));
        assert!(result.content.contains("- \"**/*.ts\""));
        assert!(result.content.contains("description: TypeScript conventions"));
    }

    #[test]
    fn defaults_fill_required_fields() {
        let pkg = CanonicalPackage::new("id", "style", Format::Claude, Subtype::Rule).with_sections(vec![
            Section::metadata("Style", "House style"),
            Section::rules("Rules", vec![Rule::new("Use TypeScript")]),
        ]);
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert!(result.content.starts_with("---\nname: style\ndescription: House style\nversion: 1.0.0\nglobs:\n  - \"**/*\"\nalwaysApply: false\n---\n"));
        assert!(result.content.contains("- Use TypeScript"));
        assert_eq!(result.quality_score, 100);
    }

    #[test]
    fn tools_are_skipped() {
        let pkg = CanonicalPackage::new("id", "agent", Format::Claude, Subtype::Agent).with_sections(vec![
            Section::metadata("Agent", "Does things"),
            Section::tools(vec!["Read".into()]),
        ]);
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert!(result.lossy_conversion);
        assert_eq!(result.quality_score, 90);
        assert!(!result.content.contains("Read"));
    }

    #[test]
    fn missing_description_is_deducted() {
        let pkg = CanonicalPackage::new("id", "bare", Format::Generic, Subtype::Rule)
            .with_section(Section::instructions("", "Be careful."));
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert_eq!(result.quality_score, 90);
        assert!(!result.lossy_conversion);
        assert!(result.content.contains("description: \"\""));
    }

    #[test]
    fn malformed_carried_config_is_contained() {
        let mut pkg = CanonicalPackage::new("id", "x", Format::Cursor, Subtype::Rule);
        pkg.metadata
            .config
            .insert("cursorConfig".into(), serde_json::json!({"globs": 42}));
        let result = to_cursor(&pkg, &ConversionOptions::default());
        assert_eq!(result.quality_score, 0);
        assert!(result.lossy_conversion);
        assert!(result.content.is_empty());
    }

    #[test]
    fn custom_cursor_block_passes_through() {
        let pkg = CanonicalPackage::new("id", "x", Format::Cursor, Subtype::Rule)
            .with_section(Section::custom(MDC, Some(Format::Cursor)));
        assert_eq!(to_cursor(&pkg, &ConversionOptions::default()).content, MDC);
    }
}
