//! Property tests: parsers, sniffers and renderers accept any input.

use proptest::prelude::*;
use prpm_canonical::{Format, PackageInput, SectionKind, Subtype};
use prpm_convert::{convert_to_all, default_registry, detect_format, sniff, ConversionOptions};

fn any_format() -> impl Strategy<Value = Format> {
    proptest::sample::select(Format::ALL.to_vec())
}

fn any_hint() -> impl Strategy<Value = Option<Subtype>> {
    proptest::option::of(proptest::sample::select(Subtype::ALL.to_vec()))
}

/// Markdown-ish documents: optional header, headings, lists, fences.
fn markdownish() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        Just("---".to_string()),
        Just("```".to_string()),
        Just(String::new()),
        "# [A-Za-z ]{0,12}",
        "## (Rules|Examples|Role|Context|Tools|Notes)",
        "- [A-Za-z ]{0,20}",
        "  \\*[a-z ]{0,10}\\*",
        "(name|description|tools|globs|applyTo|inclusion|type): [A-Za-z*,/ ]{0,12}",
        ".{0,30}",
    ];
    proptest::collection::vec(line, 0..25).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn parsing_never_panics(content in markdownish(), format in any_format(), hint in any_hint()) {
        let pkg = default_registry().parse(format, &content, &PackageInput::new("p"), hint);
        prop_assert_eq!(pkg.format(), format);
        prop_assert!(pkg.content.count(SectionKind::Metadata) <= 1);
        if let Some(hint) = hint {
            prop_assert_eq!(pkg.subtype(), hint);
        }
    }

    #[test]
    fn arbitrary_text_never_panics(content in ".{0,300}", format in any_format()) {
        let _ = default_registry().parse(format, &content, &PackageInput::new("p"), None);
    }

    #[test]
    fn sniffers_never_panic(content in markdownish()) {
        let _ = sniff::is_mcp_format(&content);
        let _ = sniff::is_kiro_format(&content);
        let _ = sniff::is_copilot_format(&content);
        let _ = sniff::is_cursor_format(&content);
        let _ = sniff::is_claude_format(&content);
        let _ = sniff::is_continue_format(&content);
        let _ = sniff::is_windsurf_format(&content);
        let _ = detect_format(&content);
    }

    #[test]
    fn parsed_packages_always_render(content in markdownish(), format in any_format()) {
        let pkg = default_registry().parse(format, &content, &PackageInput::new("p"), None);
        for result in convert_to_all(&pkg, &ConversionOptions::default()) {
            prop_assert!(result.quality_score <= 100);
            prop_assert!(result.quality_score > 0, "{} failed: {:?}", result.format, result.warnings);
        }
    }
}
