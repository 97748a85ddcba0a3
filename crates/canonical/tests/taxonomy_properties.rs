//! Property tests for taxonomy resolution.
//!
//! Resolution must never panic and must always honour the documented
//! priority order, whatever the frontmatter looks like.

use proptest::prelude::*;
use prpm_canonical::{
    detect_subtype, from_legacy_type, resolve_subtype, to_legacy_type, Format, Frontmatter,
    Subtype, SubtypeSource,
};

fn any_format() -> impl Strategy<Value = Format> {
    proptest::sample::select(Format::ALL.to_vec())
}

fn any_subtype() -> impl Strategy<Value = Subtype> {
    proptest::sample::select(Subtype::ALL.to_vec())
}

proptest! {
    #[test]
    fn arbitrary_frontmatter_never_panics(yaml in ".{0,200}", format in any_format()) {
        let fm = Frontmatter::parse(&yaml);
        let _ = detect_subtype(format, &fm, None);
    }

    #[test]
    fn explicit_hint_always_wins(
        yaml in "(type: (agent|skill|slash-command)\n)?(agentType: agent\n)?(skillType: skill\n)?(tools: Read\n)?",
        format in any_format(),
        hint in any_subtype(),
    ) {
        let fm = Frontmatter::parse(&yaml);
        let resolved = resolve_subtype(format, &fm, Some(hint));
        prop_assert_eq!(resolved.subtype, hint);
        prop_assert_eq!(resolved.source, SubtypeSource::Explicit);
    }

    #[test]
    fn legacy_type_is_stable_under_round_trip(format in any_format(), subtype in any_subtype()) {
        let legacy = to_legacy_type(format, Some(subtype));
        let back = from_legacy_type(&legacy);
        prop_assert_eq!(to_legacy_type(back.format, Some(back.subtype)), legacy);
    }

    #[test]
    fn from_legacy_type_never_panics(legacy in "[a-z-]{0,30}") {
        let _ = from_legacy_type(&legacy);
    }
}
