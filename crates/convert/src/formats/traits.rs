//! Trait definition for format converters.

use prpm_canonical::{CanonicalPackage, Format, PackageInput, SectionKind, Subtype};
use tracing::warn;

use crate::error::Result;
use crate::options::ConversionOptions;
use crate::report::{ConversionResult, RenderReport};

/// Describes which section kinds a format can express.
///
/// Metadata, instructions and custom sections are expressible everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSupport {
    pub persona: bool,
    pub examples: bool,
    pub rules: bool,
    pub context: bool,
    pub tools: bool,
    /// Tools are written into the frontmatter instead of the body.
    pub tools_in_header: bool,
}

impl SectionSupport {
    /// Plain markdown: every section kind, tools as a body list.
    pub const fn markdown() -> Self {
        Self {
            persona: true,
            examples: true,
            rules: true,
            context: true,
            tools: true,
            tools_in_header: false,
        }
    }

    /// Editor rule files with no notion of tool permissions.
    pub const fn without_tools() -> Self {
        Self {
            tools: false,
            ..Self::markdown()
        }
    }

    pub fn supports(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Metadata | SectionKind::Instructions | SectionKind::Custom => true,
            SectionKind::Rules => self.rules,
            SectionKind::Examples => self.examples,
            SectionKind::Persona => self.persona,
            SectionKind::Context => self.context,
            SectionKind::Tools => self.tools,
        }
    }
}

#[cfg(test)]
use mockall::automock;

/// Parser and renderer for one editor format.
#[cfg_attr(test, automock)]
pub trait FormatConverter: Send + Sync {
    /// Format this converter reads and writes.
    fn format(&self) -> Format;

    /// What this format can express
    fn support(&self) -> SectionSupport;

    /// Parse raw file text into a canonical package. Never fails: ambiguous
    /// input resolves to documented defaults.
    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>)
        -> CanonicalPackage;

    /// Render the document, recording warnings and deductions in `report`.
    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String>;

    /// Render and score a package. Errors are contained: a failure yields an
    /// empty, zero-quality result instead.
    fn render(&self, pkg: &CanonicalPackage, options: &ConversionOptions) -> ConversionResult {
        let format = self.format();
        let mut report = RenderReport::new(format);
        match self.render_document(pkg, options, &mut report) {
            Ok(content) => report.finish(content),
            Err(e) => {
                warn!(format = %format, package = %pkg.id, error = %e, "Conversion failed");
                ConversionResult::failed(format, &e)
            }
        }
    }
}
