//! Windsurf rules: plain markdown, never a header.

use prpm_canonical::frontmatter::parse_document;
use prpm_canonical::{CanonicalPackage, Format, PackageInput, SourceText, Subtype};
use tracing::debug;

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{parse_markdown, ParsedMarkdown};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::options::ConversionOptions;
use crate::report::{ConversionWarning, RenderReport};

/// Windsurf truncates rule files beyond this many characters.
pub const WINDSURF_CHAR_LIMIT: usize = 12_000;

const OVER_LIMIT_PENALTY: u8 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct WindsurfConverter;

impl FormatConverter for WindsurfConverter {
    fn format(&self) -> Format {
        Format::Windsurf
    }

    fn support(&self) -> SectionSupport {
        SectionSupport::without_tools()
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_windsurf(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        _options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        let body = render_body(pkg, &self.support(), report)?;
        let actual = body.chars().count();
        if actual > WINDSURF_CHAR_LIMIT {
            report.warn(ConversionWarning::SizeLimit {
                target: Format::Windsurf,
                limit: WINDSURF_CHAR_LIMIT,
                actual,
            });
            report.deduct(OVER_LIMIT_PENALTY, "over the Windsurf size limit");
        }
        Ok(body)
    }
}

/// Parse a Windsurf rules file. A stray header is stripped before parsing,
/// so title, description and subtype come from the body alone.
pub fn from_windsurf(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    let doc = parse_document(content);
    let Some(frontmatter) = &doc.frontmatter else {
        return parse_markdown(Format::Windsurf, content, input, subtype).pkg;
    };
    debug!(fields = frontmatter.len(), "Ignoring frontmatter in Windsurf rules");
    let ParsedMarkdown { mut pkg, .. } = parse_markdown(Format::Windsurf, &doc.body, input, subtype);
    pkg.source = Some(SourceText {
        format: Format::Windsurf,
        raw: content.to_string(),
    });
    pkg
}

/// Render a package as Windsurf rules.
pub fn to_windsurf(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    WindsurfConverter.render(pkg, options)
}
