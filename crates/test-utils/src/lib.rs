//! Shared test fixtures for prpm conversion crates.
//!
//! Sample canonical packages, raw files in each editor format, and a temp
//! directory fixture for CLI tests.

use std::path::PathBuf;

use prpm_canonical::{
    CanonicalPackage, Example, Format, PackageInput, PersonaData, Rule, Section, Subtype,
};

/// Cursor rule with a complete MDC header.
pub const CURSOR_MDC: &str = "---\ndescription: React component conventions\nglobs:\n  - \"src/**/*.tsx\"\nalwaysApply: false\n---\n\n# React Components\n\n## Rules\n\n- Use TypeScript\n- Prefer function components\n";

/// Claude agent with tools and a model.
pub const CLAUDE_AGENT: &str = "---\nname: code-reviewer\ndescription: Reviews pull requests for bugs\ntools: Read, Grep, Glob\nmodel: sonnet\n---\n\nYou are a meticulous senior code reviewer.\n\n## Instructions\n\nRead every changed file before commenting.\n";

/// Claude skill.
pub const CLAUDE_SKILL: &str = "---\nname: pdf-tools\ndescription: Extract text and tables from PDFs\nallowed-tools: Read, Bash\n---\n\n# PDF Tools\n\nUse pdftotext for plain extraction.\n";

/// Claude slash command.
pub const CLAUDE_COMMAND: &str = "---\ndescription: Create a conventional commit\nargument-hint: \"[message]\"\n---\n\nCommit the staged changes using $ARGUMENTS as the summary.\n";

/// Continue prompt without a header.
pub const CONTINUE_PROMPT: &str = "# Explain Code\n\nExplains the selected code.\n\n## Steps\n\nWalk through the code line by line.\n";

/// Windsurf rules.
pub const WINDSURF_RULES: &str = "# Project Rules\n\nConventions for this repository.\n\n## Coding\n\n- Use TypeScript\n- Avoid any\n";

/// Repository-wide Copilot instructions.
pub const COPILOT_REPO_WIDE: &str = "# Repository Instructions\n\nWe use pnpm and vitest.\n";

/// Path-specific Copilot instructions.
pub const COPILOT_PATH_SPECIFIC: &str = "---\napplyTo: \"**/*.ts\"\n---\n\n# TypeScript\n\nEnable strict mode.\n";

/// Kiro steering file.
pub const KIRO_STEERING: &str = "---\ninclusion: fileMatch\nfileMatchPattern: components/**/*.tsx\n---\n\n# Components\n\nReact component conventions.\n";

/// MCP server configuration.
pub const MCP_CONFIG: &str = r#"{"mcpServers": {"filesystem": {"command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem"]}}}"#;

/// Every raw fixture with the format it is written in.
pub fn raw_fixtures() -> Vec<(Format, &'static str)> {
    vec![
        (Format::Cursor, CURSOR_MDC),
        (Format::Claude, CLAUDE_AGENT),
        (Format::Claude, CLAUDE_SKILL),
        (Format::Claude, CLAUDE_COMMAND),
        (Format::Continue, CONTINUE_PROMPT),
        (Format::Windsurf, WINDSURF_RULES),
        (Format::Copilot, COPILOT_REPO_WIDE),
        (Format::Copilot, COPILOT_PATH_SPECIFIC),
        (Format::Kiro, KIRO_STEERING),
    ]
}

/// Package input as the registry layer would pass it.
pub fn sample_input() -> PackageInput {
    PackageInput::new("pkg-0001")
        .with_name("react-conventions")
        .with_author("prpm")
        .with_version("1.2.0")
        .with_tags(["react", "typescript"])
}

/// A package using every section kind.
pub fn sample_package() -> CanonicalPackage {
    CanonicalPackage::new("pkg-0001", "react-conventions", Format::Claude, Subtype::Agent)
        .with_sections(vec![
            Section::metadata("React Conventions", "Conventions for React components"),
            Section::persona(PersonaData {
                name: Some("Reviewer".into()),
                role: Some("Senior React reviewer".into()),
                ..Default::default()
            }),
            Section::tools(vec!["Read".into(), "Grep".into()]),
            Section::instructions("Instructions", "Review each component for clarity."),
            Section::rules(
                "Rules",
                vec![
                    Rule::new("Use TypeScript").with_rationale("Types catch bugs early"),
                    Rule::new("Prefer function components"),
                ],
            ),
            Section::examples(
                "Examples",
                vec![Example::new("Typed props", "export function MyComponent(props: Props) {}")
                    .with_language("tsx")
                    .good()],
            ),
            Section::context("Background", "The app targets React 18."),
        ])
}

/// A package with only rules and examples, supported by every markdown target.
pub fn rules_package() -> CanonicalPackage {
    CanonicalPackage::new("pkg-0002", "ts-rules", Format::Generic, Subtype::Rule).with_sections(vec![
        Section::metadata("TS Rules", "TypeScript rules"),
        Section::rules("Rules", vec![Rule::new("Use TypeScript")]),
        Section::examples(
            "Examples",
            vec![Example::new("Component", "const MyComponent = () => null;")],
        ),
    ])
}

/// Temp directory for tests that read and write files.
///
/// The directory is removed when the fixture drops.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
}

impl TestFixture {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            tempdir: tempfile::tempdir()?,
        })
    }

    /// Write `content` to `name` inside the fixture, creating parent dirs.
    pub fn write(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.tempdir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn path(&self) -> &std::path::Path {
        self.tempdir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpm_canonical::SectionKind;

    #[test]
    fn sample_package_covers_every_kind() {
        let pkg = sample_package();
        for kind in SectionKind::ALL {
            if kind == SectionKind::Custom {
                continue;
            }
            assert!(pkg.content.has(kind), "missing {kind:?}");
        }
    }

    #[test]
    fn fixture_writes_nested_files() {
        let fixture = TestFixture::new().expect("fixture creation");
        let path = fixture
            .write(".cursor/rules/react.mdc", CURSOR_MDC)
            .expect("write fixture");
        assert!(path.starts_with(fixture.path()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), CURSOR_MDC);
    }
}
