//! GitHub Copilot instructions.
//!
//! Two variants share one format: repository-wide instructions have no
//! header, path-specific ones carry an `applyTo` glob list.

use prpm_canonical::frontmatter::FrontmatterWriter;
use prpm_canonical::{CanonicalPackage, Format, PackageInput, Subtype, SUBTYPE_MARKER_KEYS};

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{description_or_deduct, merge_extra, parse_markdown, write_extra, ParsedMarkdown};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::options::{
    extra_fields, metadata_config, resolve_opt, store_config, ConversionOptions, CopilotConfig,
};
use crate::report::RenderReport;

const HEADER_KEYS: [&str; 1] = ["applyTo"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CopilotConverter;

impl FormatConverter for CopilotConverter {
    fn format(&self) -> Format {
        Format::Copilot
    }

    fn support(&self) -> SectionSupport {
        SectionSupport::without_tools()
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_copilot(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        let explicit = options.copilot_config.as_ref();
        let carried: CopilotConfig = metadata_config(pkg)?;
        description_or_deduct(pkg, report);

        let apply_to = resolve_opt(
            explicit.and_then(|c| c.apply_to.clone()),
            carried.apply_to.clone(),
        )
        .filter(|globs| !globs.is_empty());

        let header = match apply_to {
            Some(globs) => {
                let writer = FrontmatterWriter::new().field("applyTo", &globs.join(", "));
                let extra = merge_extra(&carried.extra, explicit.map(|c| &c.extra));
                format!("{}\n", write_extra(writer, &extra, &HEADER_KEYS)?.finish())
            }
            None => String::new(),
        };

        let body = render_body(pkg, &self.support(), report)?;
        Ok(format!("{header}{body}"))
    }
}

/// Parse Copilot instructions, repository-wide or path-specific.
pub fn from_copilot(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    let ParsedMarkdown {
        mut pkg,
        frontmatter,
        ..
    } = parse_markdown(Format::Copilot, content, input, subtype);

    let apply_to = frontmatter.list("applyTo");
    let known: Vec<&str> = HEADER_KEYS.iter().chain(&SUBTYPE_MARKER_KEYS).copied().collect();
    let config = CopilotConfig {
        apply_to: (!apply_to.is_empty()).then_some(apply_to),
        extra: extra_fields(&frontmatter, &known),
    };
    store_config(&mut pkg, &config);
    pkg
}

/// Whether a parsed package is path-specific (carries `applyTo`).
pub fn is_path_specific(pkg: &CanonicalPackage) -> bool {
    metadata_config::<CopilotConfig>(pkg)
        .ok()
        .and_then(|c| c.apply_to)
        .is_some_and(|globs| !globs.is_empty())
}

/// Render a package as Copilot instructions.
pub fn to_copilot(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    CopilotConverter.render(pkg, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpm_canonical::Section;

    #[test]
    fn repository_wide_has_no_header() {
        let pkg = from_copilot(
            "# Project\n\nWe use pnpm.\n",
            &PackageInput::new("id"),
            None,
        );
        assert!(!is_path_specific(&pkg));
        assert!(pkg.metadata.config_blob("copilotConfig").is_none());

        let result = to_copilot(&pkg, &ConversionOptions::default());
        assert_eq!(result.content, "# Project\n\nWe use pnpm.\n");
        assert_eq!(result.quality_score, 100);
    }

    #[test]
    fn path_specific_round_trip() {
        let source = "---\napplyTo: \"**/*.ts, **/*.tsx\"\n---\n\n# TS\n\nStrict types.\n";
        let pkg = from_copilot(source, &PackageInput::new("id"), None);
        assert!(is_path_specific(&pkg));
        assert_eq!(
            pkg.metadata.config_blob("copilotConfig"),
            Some(&serde_json::json!({"applyTo": ["**/*.ts", "**/*.tsx"]}))
        );

        let result = to_copilot(&pkg, &ConversionOptions::default());
        assert_eq!(result.content, source);
    }

    #[test]
    fn explicit_apply_to_adds_header() {
        let pkg = CanonicalPackage::new("id", "x", Format::Cursor, Subtype::Rule)
            .with_section(Section::metadata("X", "Rules for src"));
        let options = ConversionOptions {
            copilot_config: Some(CopilotConfig {
                apply_to: Some(vec!["src/**".into()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = to_copilot(&pkg, &options);
        assert!(result.content.starts_with("---\napplyTo: src/**\n---\n"));
    }

    #[test]
    fn missing_description_is_deducted() {
        let pkg = CanonicalPackage::new("id", "x", Format::Copilot, Subtype::Rule);
        assert_eq!(to_copilot(&pkg, &ConversionOptions::default()).quality_score, 90);
    }
}
