use std::cmp::Ordering;

use depgather_versioning::{Version, VersionComparison};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LABELS: &[&str] = &["alpha", "beta", "rc", "1", "2", "10", "Beta", "x-y"];
const METADATA: &[&str] = &["", "build1", "BUILD1", "sha.abc"];

fn random_version(rng: &mut StdRng) -> Version {
    let labels = (0..rng.gen_range(0..3))
        .map(|_| LABELS[rng.gen_range(0..LABELS.len())].to_string())
        .collect();
    let metadata = METADATA[rng.gen_range(0..METADATA.len())];
    Version::from_parts(
        rng.gen_range(0..3),
        rng.gen_range(0..3),
        rng.gen_range(0..3),
        rng.gen_range(0..2),
        labels,
        (!metadata.is_empty()).then(|| metadata.to_string()),
    )
}

const MODES: [VersionComparison; 2] = [
    VersionComparison::VersionRelease,
    VersionComparison::VersionReleaseMetadata,
];

#[test]
fn test_compare_is_reflexive() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let v = random_version(&mut rng);
        for mode in MODES {
            assert_eq!(mode.compare(&v, &v), Ordering::Equal, "{v} under {mode:?}");
            assert!(mode.equals(&v, &v.clone()));
        }
    }
}

#[test]
fn test_compare_is_antisymmetric() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..2000 {
        let a = random_version(&mut rng);
        let b = random_version(&mut rng);
        for mode in MODES {
            assert_eq!(
                mode.compare(&a, &b),
                mode.compare(&b, &a).reverse(),
                "{a} vs {b} under {mode:?}"
            );
        }
    }
}

#[test]
fn test_compare_is_transitive() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..3000 {
        let mut triple = [
            random_version(&mut rng),
            random_version(&mut rng),
            random_version(&mut rng),
        ];
        for mode in MODES {
            triple.sort_by(|x, y| mode.compare(x, y));
            let [a, b, c] = &triple;
            assert_ne!(mode.compare(a, b), Ordering::Greater);
            assert_ne!(mode.compare(b, c), Ordering::Greater);
            assert_ne!(
                mode.compare(a, c),
                Ordering::Greater,
                "{a} <= {b} <= {c} under {mode:?}"
            );
        }
    }
}

#[test]
fn test_equality_matches_compare_in_both_modes() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..2000 {
        let a = random_version(&mut rng);
        let b = random_version(&mut rng);
        for mode in MODES {
            assert_eq!(mode.equals(&a, &b), mode.compare(&a, &b) == Ordering::Equal);
        }
        assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
    }
}

#[test]
fn test_metadata_mode_refines_release_mode() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..2000 {
        let a = random_version(&mut rng);
        let b = random_version(&mut rng);
        let release = VersionComparison::VersionRelease.compare(&a, &b);
        if release != Ordering::Equal {
            assert_eq!(
                VersionComparison::VersionReleaseMetadata.compare(&a, &b),
                release
            );
        }
    }
}

#[test]
fn test_metadata_case_insensitive() {
    let a = Version::parse("1.0.0+BUILD1").unwrap();
    let b = Version::parse("1.0.0+build1").unwrap();
    assert!(VersionComparison::VersionReleaseMetadata.equals(&a, &b));
}

#[test]
fn test_hash_consistent_with_eq() {
    use std::collections::HashSet;

    let set: HashSet<Version> = ["1.0", "1.0.0", "1.0.0.0", "1.0.0+meta", "1.0.0-BETA", "1.0.0-beta"]
        .iter()
        .map(|s| Version::parse(s).unwrap())
        .collect();
    assert_eq!(set.len(), 2);

    let a = Version::parse("1.0.0-01").unwrap();
    let b = Version::parse("1.0.0-1").unwrap();
    assert_eq!(a, b);
    let labels: HashSet<Version> = ["1.0.0-01", "1.0.0-1", "1.0.0-beta.007", "1.0.0-BETA.7"]
        .iter()
        .map(|s| Version::parse(s).unwrap())
        .collect();
    assert_eq!(labels.len(), 2);
}

#[test]
fn test_serde_as_string() {
    let v: Version = serde_json::from_str("\"1.2.3-rc.1+abc\"").unwrap();
    assert_eq!(v.to_full_string(), "1.2.3-rc.1+abc");
    assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.2.3-rc.1+abc\"");
    assert!(serde_json::from_str::<Version>("\"1..2\"").is_err());
}
