use depgather_versioning::{FloatBehavior, Version, VersionRange};

fn r(s: &str) -> VersionRange {
    VersionRange::parse(s).unwrap()
}

const VALID: &[&str] = &[
    "1.2.3",
    "1.0",
    "1.2.3.4",
    "1.0.0-beta.1",
    "[1.0.0]",
    "[1.0, 2.0]",
    "[1.0, 2.0)",
    "(1.0, 2.0]",
    "(1.0, 2.0)",
    "(1.0, )",
    "[1.0, )",
    "(, 2.0]",
    "(, 2.0)",
    "[1.0.0-alpha, 2.0.0-rc.1)",
    "*",
    "*-*",
    "1.*",
    "1.2.*",
    "1.2.3.*",
    "1.0.0-*",
    "1.0.0-beta.*",
    "1.*-*",
    "[1.0.*, 2.0.0)",
    "(1.*, 3.0]",
];

#[test]
fn test_normalized_form_reparses_equal() {
    for s in VALID {
        let range = r(s);
        let formatted = range.to_string();
        let reparsed = VersionRange::parse(&formatted)
            .unwrap_or_else(|e| panic!("{s:?} formatted as {formatted:?}: {e}"));
        assert_eq!(reparsed, range, "{s:?} -> {formatted:?}");
        assert_eq!(reparsed.include_prerelease(), range.include_prerelease());
    }
}

#[test]
fn test_short_form_reparses_equal() {
    for s in VALID {
        let range = r(s);
        let short = range.to_short_string();
        assert_eq!(r(&short), range, "{s:?} -> {short:?}");
    }
}

#[test]
fn test_short_form_is_exact_for_single_bounds() {
    for s in [
        "1.2.3",
        "1.0.0-beta.1",
        "(,1.2.3]",
        "(,1.2.3)",
        "(1.2.3,)",
        "[1.2.3]",
        "1.*",
        "1.0.0-*",
        "*",
    ] {
        assert_eq!(r(s).to_short_string(), s);
    }
}

#[test]
fn test_short_form_modulo_whitespace() {
    assert_eq!(r("( , 1.2.3 ]").to_short_string(), "(,1.2.3]");
}

#[test]
fn test_normalized_form_pads_components() {
    assert_eq!(r("1.0").to_string(), "[1.0.0, )");
    assert_eq!(r("[1, 2)").to_string(), "[1.0.0, 2.0.0)");
    assert_eq!(r("[1.0]").to_string(), "[1.0.0, 1.0.0]");
    assert_eq!(r("(, 2.0]").to_string(), "(, 2.0.0]");
    assert_eq!(r("1.2.3.4").to_string(), "[1.2.3.4, )");
    assert_eq!(r("1.*").to_string(), "[1.*, )");
    assert_eq!(r("*").to_string(), "[*, )");
}

#[test]
fn test_legacy_strings() {
    assert_eq!(r("1.*").to_legacy_string(), "[1.0.0, )");
    assert_eq!(r("*").to_legacy_string(), "(, )");
    assert_eq!(r("*-*").to_legacy_string(), "(, )");
    assert_eq!(r("[1.0.*, 2.0.0)").to_legacy_string(), "[1.0.0, 2.0.0)");
    assert_eq!(r("1.0.0-beta.*").to_legacy_string(), "[1.0.0-beta.0, )");
    assert_eq!(r("[1.0.0]").to_legacy_short_string(), "[1.0.0]");
    assert_eq!(r("1.2").to_legacy_short_string(), "1.2.0");
}

#[test]
fn test_invalid_strings_fail_try_parse() {
    for s in ["(,)", "[,]", "[,)", "(,]", "[-1, 2]", "1.*.0", "1.3..2", "1.2.3.4.5"] {
        assert!(VersionRange::try_parse(s).is_none(), "{s:?}");
        assert!(VersionRange::parse(s).is_err(), "{s:?}");
    }
}

#[test]
fn test_float_behaviors_from_ranges() {
    assert_eq!(r("1.*").float().unwrap().behavior(), FloatBehavior::Minor);
    assert_eq!(
        r("[1.0.*, 2.0.0)").float().unwrap().behavior(),
        FloatBehavior::Patch
    );
    assert!(r("1.0.0-*").include_prerelease());
    assert!(!r("1.*").include_prerelease());
    assert!(r("[1.0.0-beta, 2.0.0]").include_prerelease());
    assert!(!r("[1.0.0]").is_floating());
}

#[test]
fn test_prerelease_flag_reconstructs_same_bounds() {
    let range = r("[1.0.0, 2.0.0)");
    let pre = range.with_include_prerelease(true);
    assert!(pre.include_prerelease());
    assert_eq!(pre, range);
    assert_eq!(pre.to_string(), range.to_string());
}

#[test]
fn test_serde_uses_original_text() {
    let range: VersionRange = serde_json::from_str("\"[1.0, 2.0)\"").unwrap();
    assert_eq!(serde_json::to_string(&range).unwrap(), "\"[1.0, 2.0)\"");
    let built = VersionRange::combine([&range, &r("[3.0]")]);
    assert_eq!(serde_json::to_string(&built).unwrap(), "\"[1.0.0,3.0.0]\"");
    assert!(serde_json::from_str::<VersionRange>("\"(,)\"").is_err());
}

#[test]
fn test_unbounded_range_has_parseable_form() {
    let all = VersionRange::all();
    assert_eq!(all.to_string(), "*");
    assert_eq!(all.to_short_string(), "*");
    assert_eq!(VersionRange::none().to_string(), "(, )");

    let json = serde_json::to_string(&all).unwrap();
    assert_eq!(json, "\"*\"");
    let back: VersionRange = serde_json::from_str(&json).unwrap();
    assert!(!back.is_empty());
    assert!(!back.has_upper_bound());
    assert!(!back.include_prerelease());
    for s in ["0.0.0", "0.1.0", "1.0.0", "99.3.2.1"] {
        let version: Version = s.parse().unwrap();
        assert!(back.satisfies(&version), "{s}");
    }
    assert!(!back.satisfies(&"1.0.0-beta".parse().unwrap()));

    let pre = all.with_include_prerelease(true);
    assert_eq!(pre.to_short_string(), "*-*");
    let back: VersionRange = serde_json::from_str(&serde_json::to_string(&pre).unwrap()).unwrap();
    assert!(back.include_prerelease());
    assert!(back.satisfies(&"0.0.0-alpha".parse().unwrap()));
    assert!(back.satisfies(&"3.0.0-rc.1".parse().unwrap()));
}

#[test]
fn test_combined_unbounded_range_round_trips() {
    let combined = VersionRange::combine([&r("(, 2.0.0]"), &r("1.0.0")]);
    let back: VersionRange =
        serde_json::from_str(&serde_json::to_string(&combined).unwrap()).unwrap();
    assert!(back.satisfies(&"5.0.0".parse().unwrap()));
    assert!(back.satisfies(&"0.5.0".parse().unwrap()));
}
