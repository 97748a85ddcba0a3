//! Claude agents, skills, slash commands and rules.
//!
//! The header shape depends on the subtype: agents declare `tools` and
//! `model`, skills declare `allowed-tools`, slash commands add an
//! `argument-hint`.

use prpm_canonical::frontmatter::FrontmatterWriter;
use prpm_canonical::{
    CanonicalPackage, Format, PackageInput, Section, SectionKind, Subtype, SUBTYPE_MARKER_KEYS,
};

use super::traits::{FormatConverter, SectionSupport};
use super::utils::{
    description_or_deduct, insert_after_metadata, kebab_case, merge_extra, parse_markdown,
    write_extra, ParsedMarkdown,
};
use crate::error::Result;
use crate::markdown::render::render_body;
use crate::models::normalize_model;
use crate::options::{
    extra_fields, metadata_config, resolve, resolve_opt, store_config, ClaudeConfig,
    ConversionOptions,
};
use crate::report::RenderReport;

const HEADER_KEYS: [&str; 8] = [
    "name",
    "description",
    "tools",
    "allowed-tools",
    "model",
    "argument-hint",
    "tags",
    "version",
];

/// Config field names that would shadow typed settings if carried as extras.
const CONFIG_ALIASES: [&str; 2] = ["allowedTools", "argumentHint"];

const MISSING_INSTRUCTIONS_PENALTY: u8 = 20;
const MISSING_PERSONA_PENALTY: u8 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeConverter;

impl FormatConverter for ClaudeConverter {
    fn format(&self) -> Format {
        Format::Claude
    }

    fn support(&self) -> SectionSupport {
        SectionSupport {
            tools_in_header: true,
            ..SectionSupport::markdown()
        }
    }

    fn parse(&self, content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
        from_claude(content, input, subtype)
    }

    fn render_document(
        &self,
        pkg: &CanonicalPackage,
        options: &ConversionOptions,
        report: &mut RenderReport,
    ) -> Result<String> {
        let explicit = options.claude_config.as_ref();
        let carried: ClaudeConfig = metadata_config(pkg)?;

        let description = description_or_deduct(pkg, report).unwrap_or_else(|| pkg.title().to_string());
        let model = resolve_opt(explicit.and_then(|c| c.model.clone()), carried.model.clone())
            .map(|m| normalize_model(&m));
        let tools: Vec<String> = pkg.content.tools().into_iter().map(str::to_string).collect();
        let allowed_tools = resolve(
            explicit.and_then(|c| c.allowed_tools.clone()),
            carried.allowed_tools.clone(),
            tools.clone(),
        );
        let argument_hint = resolve_opt(
            explicit.and_then(|c| c.argument_hint.clone()),
            carried.argument_hint.clone(),
        );

        let name = kebab_case(&pkg.name);
        let name = if name.is_empty() { pkg.id.clone() } else { name };
        let mut header = FrontmatterWriter::new();
        match pkg.subtype() {
            Subtype::Agent => {
                header = header
                    .field("name", &name)
                    .field("description", &description);
                if !tools.is_empty() {
                    header = header.field("tools", &tools.join(", "));
                }
                header = header.opt_field("model", model.as_deref());

                if !pkg.content.has(SectionKind::Instructions) {
                    report.deduct(MISSING_INSTRUCTIONS_PENALTY, "agent has no instructions");
                }
                if !pkg.content.has(SectionKind::Persona) {
                    report.deduct(MISSING_PERSONA_PENALTY, "agent has no persona");
                }
            }
            Subtype::Skill => {
                header = header
                    .field("name", &name)
                    .field("description", &description);
                if !allowed_tools.is_empty() {
                    header = header.field("allowed-tools", &allowed_tools.join(", "));
                }
            }
            Subtype::SlashCommand => {
                header = header.field("description", &description);
                if !allowed_tools.is_empty() {
                    header = header.field("allowed-tools", &allowed_tools.join(", "));
                }
                header = header
                    .opt_field("argument-hint", argument_hint.as_deref())
                    .opt_field("model", model.as_deref());
            }
            _ => {
                header = header
                    .field("name", &name)
                    .field("description", &description);
                if !tools.is_empty() {
                    header = header.field("tools", &tools.join(", "));
                }
            }
        }
        let extra = merge_extra(&carried.extra, explicit.map(|c| &c.extra));
        let header = write_extra(header, &extra, &HEADER_KEYS)?.finish();

        let body = render_body(pkg, &self.support(), report)?;
        Ok(format!("{header}\n{body}"))
    }
}

/// Parse a Claude agent, skill, command or rule file.
pub fn from_claude(content: &str, input: &PackageInput, subtype: Option<Subtype>) -> CanonicalPackage {
    let ParsedMarkdown {
        mut pkg,
        frontmatter,
        ..
    } = parse_markdown(Format::Claude, content, input, subtype);

    let mut tools = frontmatter.list("tools");
    for tool in frontmatter.list("allowed-tools") {
        if !tools.contains(&tool) {
            tools.push(tool);
        }
    }
    if !tools.is_empty() {
        insert_after_metadata(&mut pkg, Section::tools(tools));
    }

    let known: Vec<&str> = HEADER_KEYS
        .iter()
        .chain(&SUBTYPE_MARKER_KEYS)
        .chain(&CONFIG_ALIASES)
        .copied()
        .collect();
    let config = ClaudeConfig {
        model: frontmatter.str("model"),
        argument_hint: frontmatter.str("argument-hint"),
        extra: extra_fields(&frontmatter, &known),
        ..Default::default()
    };
    store_config(&mut pkg, &config);
    pkg
}

/// Render a package as a Claude file.
pub fn to_claude(pkg: &CanonicalPackage, options: &ConversionOptions) -> crate::ConversionResult {
    ClaudeConverter.render(pkg, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpm_canonical::PersonaData;

    const AGENT: &str = "---\nname: code-reviewer\ndescription: Reviews pull requests\ntools: Read, Grep, Glob\nmodel: claude-3-5-sonnet-20240620\ncolor: blue\n---\n\nYou are a senior reviewer.\n\n## Instructions\n\nCheck every diff for bugs.\n";

    fn input() -> PackageInput {
        PackageInput::new("pkg-agent")
    }

    #[test]
    fn parse_agent() {
        let pkg = from_claude(AGENT, &input(), None);
        assert_eq!(pkg.subtype(), Subtype::Agent);
        assert_eq!(pkg.legacy_type(), "claude-agent");
        assert_eq!(pkg.name, "code-reviewer");
        assert_eq!(pkg.content.tools(), vec!["Read", "Grep", "Glob"]);
        assert!(pkg.content.has(SectionKind::Persona));

        let config: ClaudeConfig = metadata_config(&pkg).unwrap();
        assert_eq!(config.model.as_deref(), Some("claude-3-5-sonnet-20240620"));
        assert_eq!(config.extra["color"], "blue");
    }

    #[test]
    fn render_agent_header() {
        let pkg = from_claude(AGENT, &input(), None);
        let result = to_claude(&pkg, &ConversionOptions::default());
        assert!(result.content.starts_with(
            "---\nname: code-reviewer\ndescription: Reviews pull requests\ntools: Read, Grep, Glob\nmodel: sonnet\ncolor: blue\n---\n"
        ));
        assert!(result.content.contains("You are a senior reviewer."));
        assert!(result.content.contains("Check every diff for bugs."));
        assert_eq!(result.quality_score, 100);
        assert!(!result.lossy_conversion);
    }

    #[test]
    fn explicit_model_wins() {
        let pkg = from_claude(AGENT, &input(), None);
        let options = ConversionOptions {
            claude_config: Some(ClaudeConfig {
                model: Some("claude-3-opus-20240229".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(to_claude(&pkg, &options).content.contains("model: opus\n"));
    }

    #[test]
    fn bare_agent_is_penalised() {
        let pkg = CanonicalPackage::new("id", "Helper Bot", Format::Claude, Subtype::Agent)
            .with_section(Section::metadata("Helper", "Helps"));
        let result = to_claude(&pkg, &ConversionOptions::default());
        assert_eq!(result.quality_score, 75);
        assert!(result.content.starts_with("---\nname: helper-bot\n"));
    }

    #[test]
    fn complete_agent_scores_full() {
        let pkg = CanonicalPackage::new("id", "helper", Format::Claude, Subtype::Agent).with_sections(vec![
            Section::metadata("Helper", "Helps"),
            Section::persona(PersonaData {
                role: Some("You help.".into()),
                ..Default::default()
            }),
            Section::instructions("Steps", "Do it."),
        ]);
        assert_eq!(to_claude(&pkg, &ConversionOptions::default()).quality_score, 100);
    }

    #[test]
    fn skill_round_trip_keeps_subtype() {
        let skill = "---\nname: pdf-tools\ndescription: Work with PDFs\nallowed-tools: Read, Bash\n---\n\n# PDF Tools\n\nExtract text from PDFs.\n";
        let pkg = from_claude(skill, &input(), None);
        assert_eq!(pkg.subtype(), Subtype::Skill);

        let rendered = to_claude(&pkg, &ConversionOptions::default());
        assert!(rendered.content.contains("allowed-tools: Read, Bash\n"));
        assert!(!rendered.content.contains("\ntools:"));

        let again = from_claude(&rendered.content, &input(), None);
        assert_eq!(again.subtype(), Subtype::Skill);
        assert_eq!(again.content.tools(), vec!["Read", "Bash"]);
    }

    #[test]
    fn slash_command_header() {
        let command = "---\ndescription: Create a commit\nargument-hint: \"[message]\"\nallowed-tools: Bash(git add:*), Bash(git commit:*)\n---\n\nCommit staged changes with $ARGUMENTS.\n";
        let pkg = from_claude(command, &input(), None);
        assert_eq!(pkg.subtype(), Subtype::SlashCommand);
        let result = to_claude(&pkg, &ConversionOptions::default());
        assert!(result.content.starts_with("---\ndescription: Create a commit\nallowed-tools: Bash(git add:*), Bash(git commit:*)\nargument-hint: \"[message]\"\n---\n"));
        assert!(!result.content.contains("name:"));
    }

    #[test]
    fn explicit_hint_beats_markers() {
        let content = "---\nagentType: agent\nskillType: skill\n---\nBody";
        let pkg = from_claude(content, &input(), Some(Subtype::SlashCommand));
        assert_eq!(pkg.subtype(), Subtype::SlashCommand);
        let config: ClaudeConfig = metadata_config(&pkg).unwrap();
        assert!(config.extra.is_empty());
    }
}
