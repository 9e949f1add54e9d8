//! Package version parsing and comparison.
//!
//! Versions have the shape `major[.minor[.patch[.revision]]][-labels][+metadata]`:
//! - Missing numeric parts default to zero, so `1.0` and `1.0.0.0` are equal
//! - Prerelease labels are dot-separated; a version with labels sorts below
//!   the same numeric version without labels
//! - Numeric labels compare as numbers and sort before alphanumeric labels
//! - Alphanumeric labels and metadata compare ordinally, ignoring ASCII case
//! - Build metadata never affects ordering unless explicitly requested

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use depgather_util::errors::{GatherError, GatherResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed, immutable package version.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    release_labels: Vec<String>,
    metadata: Option<String>,
    original: Option<String>,
}

/// Which parts of a version take part in a comparison.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum VersionComparison {
    /// Numeric parts only; labels and metadata are ignored.
    Version,
    /// Numeric parts and prerelease labels. Metadata is ignored.
    #[default]
    VersionRelease,
    /// Numeric parts, prerelease labels, then build metadata.
    VersionReleaseMetadata,
}

impl Version {
    /// A release version `major.minor.patch`.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_parts(major, minor, patch, 0, Vec::new(), None)
    }

    pub fn from_parts(
        major: u64,
        minor: u64,
        patch: u64,
        revision: u64,
        release_labels: Vec<String>,
        metadata: Option<String>,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            revision,
            release_labels,
            metadata,
            original: None,
        }
    }

    /// Parse a version string, failing with [`GatherError::InvalidVersion`].
    pub fn parse(input: &str) -> GatherResult<Self> {
        Self::try_parse(input).ok_or_else(|| GatherError::invalid_version(input))
    }

    /// Parse a version string, returning `None` when it is malformed.
    pub fn try_parse(input: &str) -> Option<Self> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        let (rest, metadata) = match text.split_once('+') {
            Some((rest, meta)) => {
                if !is_valid_dotted(meta) {
                    return None;
                }
                (rest, Some(meta.to_string()))
            }
            None => (text, None),
        };

        let (numeric, labels) = match rest.split_once('-') {
            Some((numeric, labels)) => {
                if !is_valid_dotted(labels) {
                    return None;
                }
                (numeric, labels.split('.').map(str::to_string).collect())
            }
            None => (rest, Vec::new()),
        };

        let mut parts = [0u64; 4];
        let mut count = 0;
        for part in numeric.split('.') {
            if count == parts.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            parts[count] = part.parse().ok()?;
            count += 1;
        }

        Some(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            revision: parts[3],
            release_labels: labels,
            metadata,
            original: Some(input.to_string()),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn release_labels(&self) -> &[String] {
        &self.release_labels
    }

    /// Prerelease labels joined with `.`, empty for release versions.
    pub fn release(&self) -> String {
        self.release_labels.join(".")
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// The exact string this version was parsed from, if any.
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.release_labels.is_empty()
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// The same numeric version without labels or metadata.
    pub fn release_version(&self) -> Version {
        Self::from_parts(
            self.major,
            self.minor,
            self.patch,
            self.revision,
            Vec::new(),
            None,
        )
    }

    /// `major.minor.patch`, plus `.revision` when it is non-zero.
    pub fn to_numeric_string(&self) -> String {
        if self.revision > 0 {
            format!(
                "{}.{}.{}.{}",
                self.major, self.minor, self.patch, self.revision
            )
        } else {
            format!("{}.{}.{}", self.major, self.minor, self.patch)
        }
    }

    /// Numeric string plus prerelease labels, without metadata.
    pub fn to_normalized_string(&self) -> String {
        let mut s = self.to_numeric_string();
        if self.is_prerelease() {
            s.push('-');
            s.push_str(&self.release());
        }
        s
    }

    /// Normalized string plus `+metadata`.
    pub fn to_full_string(&self) -> String {
        let mut s = self.to_normalized_string();
        if let Some(ref meta) = self.metadata {
            s.push('+');
            s.push_str(meta);
        }
        s
    }
}

impl VersionComparison {
    /// Total order over versions for this comparison mode.
    pub fn compare(self, a: &Version, b: &Version) -> Ordering {
        let numeric = (a.major, a.minor, a.patch, a.revision).cmp(&(
            b.major, b.minor, b.patch, b.revision,
        ));
        if numeric != Ordering::Equal || self == VersionComparison::Version {
            return numeric;
        }
        let labels = compare_label_lists(&a.release_labels, &b.release_labels);
        if labels != Ordering::Equal || self == VersionComparison::VersionRelease {
            return labels;
        }
        cmp_ignore_ascii_case(
            a.metadata.as_deref().unwrap_or(""),
            b.metadata.as_deref().unwrap_or(""),
        )
    }

    pub fn equals(self, a: &Version, b: &Version) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        VersionComparison::VersionRelease.compare(self, other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.major, self.minor, self.patch, self.revision).hash(state);
        for label in &self.release_labels {
            if is_numeric(label) {
                // `01` and `1` compare equal
                label.trim_start_matches('0').hash(state);
            } else {
                label.to_ascii_lowercase().hash(state);
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_full_string())
    }
}

impl FromStr for Version {
    type Err = GatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_full_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn compare_label_lists(a: &[String], b: &[String]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        // release sorts above any prerelease
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    for (x, y) in a.iter().zip(b) {
        let ord = compare_labels(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => compare_numeric_text(a, b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => cmp_ignore_ascii_case(a, b),
    }
}

fn is_numeric(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())
}

/// Compares digit strings of any length without overflowing.
fn compare_numeric_text(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

pub(crate) fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Non-empty dot-separated identifiers made of `[0-9A-Za-z-]`.
fn is_valid_dotted(s: &str) -> bool {
    s.split('.').all(|part| {
        !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn basic_ordering() {
        assert!(v("1.0") < v("2.0"));
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
        assert!(v("1.1.0") < v("1.1.0.1"));
    }

    #[test]
    fn missing_parts_are_zero() {
        assert_eq!(v("1"), v("1.0.0.0"));
        assert_eq!(v("1.0").to_normalized_string(), "1.0.0");
        assert_eq!(v("1.2.3.4").to_normalized_string(), "1.2.3.4");
        assert_eq!(v("1.2.3.0").to_normalized_string(), "1.2.3");
    }

    #[test]
    fn prerelease_before_release() {
        assert!(v("1.0.0-beta") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
    }

    #[test]
    fn labels_ignore_case() {
        assert_eq!(v("1.0.0-BETA"), v("1.0.0-beta"));
    }

    #[test]
    fn metadata_ignored_by_default() {
        assert_eq!(v("1.0.0+abc"), v("1.0.0+def"));
        assert_eq!(
            VersionComparison::VersionReleaseMetadata.compare(&v("1.0.0+abc"), &v("1.0.0+def")),
            Ordering::Less
        );
        assert_eq!(v("1.0.0+abc").metadata(), Some("abc"));
    }

    #[test]
    fn version_mode_ignores_labels() {
        assert!(VersionComparison::Version.equals(&v("1.0.0-beta"), &v("1.0.0")));
        assert!(!VersionComparison::VersionRelease.equals(&v("1.0.0-beta"), &v("1.0.0")));
    }

    #[test]
    fn huge_numeric_labels() {
        assert!(v("1.0.0-99999999999999999999") < v("1.0.0-100000000000000000000"));
    }

    #[test]
    fn invalid_versions() {
        for bad in [
            "", "1.3..2", "1.2.3.4.5", "-1", "a.b", "1.0.0-", "1.0.0+", "1.0.0-beta..1",
            "1.*", "1.0 .0", "v1.0", "1.0.0-be$ta",
        ] {
            assert!(Version::try_parse(bad).is_none(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn original_preserved() {
        let version = v("1.02.3-Beta+meta");
        assert_eq!(version.original(), Some("1.02.3-Beta+meta"));
        assert_eq!(version.to_full_string(), "1.2.3-Beta+meta");
        assert_eq!(version.to_string(), "1.2.3-Beta+meta");
    }

    #[test]
    fn parse_error_carries_input() {
        let err = Version::parse("1.x").unwrap_err();
        assert!(err.to_string().contains("1.x"));
    }
}
