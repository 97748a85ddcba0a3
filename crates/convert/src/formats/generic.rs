//! Plain markdown with optional frontmatter. Expresses every section kind.

use prpm_canonical::{CanonicalPackage, Format, PackageInput, Section, SectionKind, Subtype};

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{insert_after_metadata, parse_markdown, ParsedMarkdown};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::options::ConversionOptions;
use crate::report::RenderReport;

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericConverter;

impl FormatConverter for GenericConverter {
    fn format(&self) -> Format {
        Format::Generic
    }

    fn support(&self) -> SectionSupport {
        SectionSupport::markdown()
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_generic(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        _options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        render_body(pkg, &self.support(), report)
    }
}

/// Parse plain markdown. A frontmatter `tools` list becomes a tools section.
pub fn from_generic(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    parse_as(Format::Generic, content, input, subtype)
}

/// Generic parse recorded under another format, used for formats with no
/// dedicated parser.
pub(crate) fn parse_as(
    format: Format,
    content: &str,
    input: &PackageInput,
    subtype: Option<Subtype>,
) -> CanonicalPackage {
    let ParsedMarkdown {
        mut pkg,
        frontmatter,
        ..
    } = parse_markdown(format, content, input, subtype);
    let tools = frontmatter.list("tools");
    if !tools.is_empty() && !pkg.content.has(SectionKind::Tools) {
        insert_after_metadata(&mut pkg, Section::tools(tools));
    }
    pkg
}

/// Render a package as plain markdown.
pub fn to_generic(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    GenericConverter.render(pkg, options)
}
