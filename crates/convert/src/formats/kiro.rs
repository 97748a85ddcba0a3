//! Kiro steering files.

use prpm_canonical::frontmatter::FrontmatterWriter;
use prpm_canonical::{CanonicalPackage, Format, PackageInput, Subtype, SUBTYPE_MARKER_KEYS};
use tracing::warn;

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{description_or_deduct, merge_extra, parse_markdown, write_extra, ParsedMarkdown};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::options::{
    extra_fields, metadata_config, resolve, resolve_opt, store_config, ConversionOptions,
    KiroConfig, KiroInclusion,
};
use crate::report::{ConversionWarning, RenderReport};

/// Pattern written when `fileMatch` inclusion has none.
pub const DEFAULT_FILE_MATCH_PATTERN: &str = "**/*";

const HEADER_KEYS: [&str; 2] = ["inclusion", "fileMatchPattern"];

const MISSING_PATTERN_PENALTY: u8 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct KiroConverter;

impl FormatConverter for KiroConverter {
    fn format(&self) -> Format {
        Format::Kiro
    }

    fn support(&self) -> SectionSupport {
        SectionSupport::without_tools()
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_kiro(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        let explicit = options.kiro_config.as_ref();
        let carried: KiroConfig = metadata_config(pkg)?;
        description_or_deduct(pkg, report);

        let inclusion = resolve(
            explicit.and_then(|c| c.inclusion),
            carried.inclusion,
            KiroInclusion::default(),
        );
        let pattern = resolve_opt(
            explicit.and_then(|c| c.file_match_pattern.clone()),
            carried.file_match_pattern.clone(),
        );

        let mut header = FrontmatterWriter::new().field("inclusion", inclusion.as_str());
        if inclusion == KiroInclusion::FileMatch {
            let pattern = pattern.unwrap_or_else(|| {
                report.warn(ConversionWarning::DefaultApplied {
                    field: "fileMatchPattern".to_string(),
                    value: DEFAULT_FILE_MATCH_PATTERN.to_string(),
                });
                report.deduct(MISSING_PATTERN_PENALTY, "fileMatch inclusion without a pattern");
                DEFAULT_FILE_MATCH_PATTERN.to_string()
            });
            header = header.field("fileMatchPattern", &pattern);
        }
        let extra = merge_extra(&carried.extra, explicit.map(|c| &c.extra));
        let header = write_extra(header, &extra, &HEADER_KEYS)?.finish();

        let body = render_body(pkg, &self.support(), report)?;
        Ok(format!("{header}\n{body}"))
    }
}

/// Parse a Kiro steering file.
pub fn from_kiro(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    let ParsedMarkdown {
        mut pkg,
        frontmatter,
        ..
    } = parse_markdown(Format::Kiro, content, input, subtype);

    let inclusion = frontmatter.str("inclusion").and_then(|raw| {
        let parsed = KiroInclusion::parse(&raw);
        if parsed.is_none() {
            warn!(inclusion = %raw, "Unknown Kiro inclusion mode, ignoring");
        }
        parsed
    });

    let known: Vec<&str> = HEADER_KEYS.iter().chain(&SUBTYPE_MARKER_KEYS).copied().collect();
    let config = KiroConfig {
        inclusion,
        file_match_pattern: frontmatter.str("fileMatchPattern"),
        extra: extra_fields(&frontmatter, &known),
    };
    store_config(&mut pkg, &config);
    pkg
}

/// Render a package as a Kiro steering file.
pub fn to_kiro(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    KiroConverter.render(pkg, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpm_canonical::Section;

    const STEERING: &str = "---\ninclusion: fileMatch\nfileMatchPattern: components/**/*.tsx\n---\n\n# Components\n\nReact component conventions.\n";

    fn described() -> CanonicalPackage {
        CanonicalPackage::new("id", "x", Format::Generic, Subtype::Rule)
            .with_section(Section::metadata("Guide", "Team guide"))
    }

    #[test]
    fn parse_carries_inclusion() {
        let pkg = from_kiro(STEERING, &PackageInput::new("id"), None);
        assert_eq!(pkg.subtype(), Subtype::Rule);
        let config: KiroConfig = metadata_config(&pkg).unwrap();
        assert_eq!(config.inclusion, Some(KiroInclusion::FileMatch));
        assert_eq!(config.file_match_pattern.as_deref(), Some("components/**/*.tsx"));
    }

    #[test]
    fn round_trip_is_stable() {
        let pkg = from_kiro(STEERING, &PackageInput::new("id"), None);
        let result = to_kiro(&pkg, &ConversionOptions::default());
        assert_eq!(result.content, STEERING);
        assert_eq!(result.quality_score, 100);
    }

    #[test]
    fn defaults_to_always() {
        let result = to_kiro(&described(), &ConversionOptions::default());
        assert!(result.content.starts_with("---\ninclusion: always\n---\n"));
        assert_eq!(result.quality_score, 100);
    }

    #[test]
    fn file_match_without_pattern_defaults() {
        let options = ConversionOptions {
            kiro_config: Some(KiroConfig {
                inclusion: Some(KiroInclusion::FileMatch),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = to_kiro(&described(), &options);
        assert!(result
            .content
            .starts_with("---\ninclusion: fileMatch\nfileMatchPattern: \"**/*\"\n---\n"));
        assert_eq!(result.quality_score, 90);
        assert!(!result.lossy_conversion);
        assert_eq!(result.warnings, vec!["fileMatchPattern not provided, defaulting to **/*"]);
    }

    #[test]
    fn unknown_inclusion_is_dropped() {
        let pkg = from_kiro(
            "---\ninclusion: sometimes\n---\n\nBody text.\n",
            &PackageInput::new("id"),
            None,
        );
        let config: KiroConfig = metadata_config(&pkg).unwrap();
        assert_eq!(config.inclusion, None);
        assert!(to_kiro(&pkg, &ConversionOptions::default())
            .content
            .starts_with("---\ninclusion: always\n"));
    }
}
