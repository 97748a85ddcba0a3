//! Continue prompts and rules.
//!
//! Continue files are plain markdown by default. A header is written only
//! when the caller passes an explicit `continue_config`; values carried in
//! package metadata fill its fields but never add a header on their own.

use prpm_canonical::frontmatter::FrontmatterWriter;
use prpm_canonical::{CanonicalPackage, Format, PackageInput, SectionKind, Subtype, SUBTYPE_MARKER_KEYS};

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{merge_extra, parse_markdown, write_extra, ParsedMarkdown};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::options::{
    extra_fields, metadata_config, resolve, resolve_opt, store_config, ContinueConfig,
    ConversionOptions,
};
use crate::report::RenderReport;

const HEADER_KEYS: [&str; 4] = ["name", "description", "globs", "alwaysApply"];

const MISSING_EXAMPLES_PENALTY: u8 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueConverter;

impl FormatConverter for ContinueConverter {
    fn format(&self) -> Format {
        Format::Continue
    }

    fn support(&self) -> SectionSupport {
        SectionSupport::without_tools()
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_continue(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        let carried: ContinueConfig = metadata_config(pkg)?;
        if pkg.subtype() == Subtype::Prompt && !pkg.content.has(SectionKind::Examples) {
            report.deduct(MISSING_EXAMPLES_PENALTY, "prompt has no examples");
        }

        let header = match options.continue_config.as_ref() {
            Some(explicit) => {
                let name = resolve(explicit.name.clone(), carried.name.clone(), pkg.name.clone());
                let description = resolve_opt(explicit.description.clone(), carried.description.clone())
                    .or_else(|| pkg.description_text().map(str::to_string));
                let globs = resolve_opt(explicit.globs.clone(), carried.globs.clone());
                let always_apply = resolve_opt(explicit.always_apply, carried.always_apply);

                let mut writer = FrontmatterWriter::new()
                    .field("name", &name)
                    .opt_field("description", description.as_deref());
                if let Some(globs) = globs.filter(|g| !g.is_empty()) {
                    writer = writer.list("globs", &globs);
                }
                if let Some(always_apply) = always_apply {
                    writer = writer.flag("alwaysApply", always_apply);
                }
                let extra = merge_extra(&carried.extra, Some(&explicit.extra));
                format!("{}\n", write_extra(writer, &extra, &HEADER_KEYS)?.finish())
            }
            None => String::new(),
        };

        let body = render_body(pkg, &self.support(), report)?;
        Ok(format!("{header}{body}"))
    }
}

/// Parse a Continue prompt or rule. Frontmatter is optional.
pub fn from_continue(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    let ParsedMarkdown {
        mut pkg,
        frontmatter,
        ..
    } = parse_markdown(Format::Continue, content, input, subtype);

    let known: Vec<&str> = HEADER_KEYS.iter().chain(&SUBTYPE_MARKER_KEYS).copied().collect();
    let globs = frontmatter.list("globs");
    let config = ContinueConfig {
        name: frontmatter.str("name"),
        description: frontmatter.str("description"),
        globs: (!globs.is_empty()).then_some(globs),
        always_apply: frontmatter.bool("alwaysApply"),
        extra: extra_fields(&frontmatter, &known),
    };
    store_config(&mut pkg, &config);
    pkg
}

/// Render a package as a Continue file.
pub fn to_continue(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    ContinueConverter.render(pkg, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpm_canonical::{Example, Section};

    #[test]
    fn parse_plain_prompt() {
        let pkg = from_continue(
            "# Explain Code\n\nExplains the selected code.\n\n## Steps\n\nRead it carefully.\n",
            &PackageInput::new("id"),
            None,
        );
        assert_eq!(pkg.subtype(), Subtype::Prompt);
        assert_eq!(pkg.legacy_type(), "continue");
        let meta = pkg.content.metadata().unwrap();
        assert_eq!(meta.title, "Explain Code");
        assert_eq!(meta.description, "Explains the selected code.");
    }

    #[test]
    fn parse_rule_with_frontmatter() {
        let pkg = from_continue(
            "---\nname: ts\nglobs: \"**/*.ts\"\nalwaysApply: false\n---\n\nUse strict mode.\n",
            &PackageInput::new("id"),
            None,
        );
        assert_eq!(pkg.subtype(), Subtype::Rule);
        let config: ContinueConfig = metadata_config(&pkg).unwrap();
        assert_eq!(config.globs, Some(vec!["**/*.ts".to_string()]));
    }

    #[test]
    fn no_header_without_explicit_config() {
        let pkg = from_continue(
            "---\nname: ts\nglobs: \"**/*.ts\"\n---\n\nUse strict mode.\n",
            &PackageInput::new("id"),
            None,
        );
        let result = to_continue(&pkg, &ConversionOptions::default());
        assert!(!result.content.starts_with("---"));
        assert!(result.content.starts_with("# ts\n"));
    }

    #[test]
    fn explicit_config_adds_header_with_carried_values() {
        let pkg = from_continue(
            "---\nname: ts\nglobs: \"**/*.ts\"\n---\n\nUse strict mode.\n",
            &PackageInput::new("id"),
            None,
        );
        let options = ConversionOptions {
            continue_config: Some(ContinueConfig {
                always_apply: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = to_continue(&pkg, &options);
        assert!(result.content.starts_with("---\nname: ts\n"));
        assert!(result.content.contains("globs:\n  - \"**/*.ts\"\n"));
        assert!(result.content.contains("alwaysApply: true\n"));
    }

    #[test]
    fn prompt_without_examples_is_penalised() {
        let pkg = CanonicalPackage::new("id", "p", Format::Continue, Subtype::Prompt)
            .with_section(Section::metadata("P", "d"));
        assert_eq!(to_continue(&pkg, &ConversionOptions::default()).quality_score, 90);

        let with_examples = pkg.clone().with_section(Section::examples(
            "Examples",
            vec![Example::new("call", "explain(MyComponent)")],
        ));
        let result = to_continue(&with_examples, &ConversionOptions::default());
        assert_eq!(result.quality_score, 100);
        assert!(result.content.contains("explain(MyComponent)"));
    }
}
