//! Shared utility functions for format converters.

use prpm_canonical::frontmatter::FrontmatterWriter;
use prpm_canonical::{
    parse_document, resolve_subtype, CanonicalPackage, Format, Frontmatter, MetadataSection,
    PackageInput, Section, SourceText, Subtype,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::markdown::decompose;
use crate::report::RenderReport;

/// Points deducted when a package has no description.
pub(crate) const MISSING_DESCRIPTION_PENALTY: u8 = 10;

/// A markdown file parsed into a package, with its frontmatter kept for
/// format-specific fields.
#[derive(Debug)]
pub(crate) struct ParsedMarkdown {
    pub pkg: CanonicalPackage,
    pub frontmatter: Frontmatter,
    /// Frontmatter version, when present.
    pub version: Option<String>,
}

/// Parse skeleton shared by every markdown format: frontmatter, taxonomy,
/// metadata section, body sections, source retention.
///
/// Title comes from the first H1, then frontmatter `name`, then the input
/// name. Description comes from frontmatter, then the first paragraph, then
/// the input.
pub(crate) fn parse_markdown(
    format: Format,
    content: &str,
    input: &PackageInput,
    hint: Option<Subtype>,
) -> ParsedMarkdown {
    let doc = parse_document(content);
    let frontmatter = doc.fields();
    let subtype = resolve_subtype(format, &frontmatter, hint).subtype;

    let fm_name = frontmatter.str("name");
    let fm_description = frontmatter.str("description");
    let body = decompose(&doc.body, fm_description.as_deref());

    let mut pkg = CanonicalPackage::from_input(input, format, subtype);
    if input.name.is_none() {
        if let Some(name) = &fm_name {
            pkg.name = name.clone();
        }
    }

    let title = body
        .title
        .or(fm_name)
        .unwrap_or_else(|| input.display_name().to_string());
    let description = fm_description
        .or(body.description)
        .or_else(|| input.description.clone())
        .unwrap_or_default();
    if pkg.description.is_empty() {
        pkg.description = description.clone();
    }
    if pkg.metadata.tags.is_empty() {
        pkg.metadata.tags = frontmatter.list("tags");
    }

    pkg.content.sections.push(Section::Metadata(MetadataSection {
        title,
        description,
        icon: body.icon,
    }));
    pkg.content.sections.extend(body.sections);
    pkg.source = Some(SourceText {
        format,
        raw: content.to_string(),
    });

    let version = frontmatter_version(&frontmatter);
    ParsedMarkdown {
        pkg,
        frontmatter,
        version,
    }
}

/// Reads `version`, warning when it is not semver.
fn frontmatter_version(frontmatter: &Frontmatter) -> Option<String> {
    let version = frontmatter.str("version")?;
    if let Err(e) = semver::Version::parse(&version) {
        warn!(version = %version, error = %e, "Frontmatter version is not valid semver");
    }
    Some(version)
}

/// Inserts a section directly after the metadata section.
pub(crate) fn insert_after_metadata(pkg: &mut CanonicalPackage, section: Section) {
    let at = pkg
        .content
        .iter()
        .position(|s| matches!(s, Section::Metadata(_)))
        .map_or(0, |i| i + 1);
    pkg.content.sections.insert(at, section);
}

/// Writes carried fields, skipping keys the format already wrote.
pub(crate) fn write_extra(
    mut writer: FrontmatterWriter,
    extra: &Map<String, Value>,
    written: &[&str],
) -> Result<FrontmatterWriter> {
    for (key, value) in extra {
        if written.contains(&key.as_str()) {
            continue;
        }
        writer = writer.value(key, value)?;
    }
    Ok(writer)
}

/// Layers explicit extra fields over metadata-carried ones.
pub(crate) fn merge_extra(
    metadata: &Map<String, Value>,
    explicit: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = metadata.clone();
    if let Some(explicit) = explicit {
        for (key, value) in explicit {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Package description for a header, deducting when there is none.
pub(crate) fn description_or_deduct(pkg: &CanonicalPackage, report: &mut RenderReport) -> Option<String> {
    let description = pkg.description_text().map(|d| d.trim().to_string());
    if description.is_none() {
        report.deduct(MISSING_DESCRIPTION_PENALTY, "missing description");
    }
    description
}

/// Kebab-case identifier: lowercase ASCII alphanumerics joined by single
/// hyphens.
pub fn kebab_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
