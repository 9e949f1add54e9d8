//! Floating version ranges such as `1.*`, `1.0.0-*` or `1.*-beta*`.
//!
//! A float names the lowest concrete version it can match (with wildcard
//! positions zeroed) and which trailing parts may vary.

use std::fmt;

use crate::version::{Version, VersionComparison};

/// Which trailing part of a version floats.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum FloatBehavior {
    #[default]
    None,
    /// `1.0.0-*`, `1.0.0-beta.*`
    Prerelease,
    /// `1.0.0.*`
    Revision,
    /// `1.0.*`
    Patch,
    /// `1.*`
    Minor,
    /// `*`
    Major,
    /// `1.0.*-*`
    PrereleasePatch,
    /// `1.*-*`
    PrereleaseMinor,
    /// `*-beta*`
    PrereleaseMajor,
    /// `*-*`
    AbsoluteLatest,
}

impl FloatBehavior {
    /// `true` if prerelease versions are eligible for this float.
    pub fn includes_prerelease(self) -> bool {
        matches!(
            self,
            FloatBehavior::Prerelease
                | FloatBehavior::PrereleasePatch
                | FloatBehavior::PrereleaseMinor
                | FloatBehavior::PrereleaseMajor
                | FloatBehavior::AbsoluteLatest
        )
    }

    /// `true` if any major version can match.
    pub fn floats_major(self) -> bool {
        matches!(
            self,
            FloatBehavior::Major | FloatBehavior::PrereleaseMajor | FloatBehavior::AbsoluteLatest
        )
    }
}

/// A float behavior paired with the minimum version it was parsed from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FloatRange {
    behavior: FloatBehavior,
    min_version: Version,
    release_prefix: Option<String>,
}

impl FloatRange {
    /// A non-floating range pinned to `version`.
    pub fn exact(version: Version) -> Self {
        Self {
            behavior: FloatBehavior::None,
            min_version: version,
            release_prefix: None,
        }
    }

    /// Parse a float expression, returning `None` when a wildcard is misplaced
    /// or the remaining version is malformed.
    pub fn try_parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        if s == "*" {
            return Some(Self {
                behavior: FloatBehavior::Major,
                min_version: Version::new(0, 0, 0),
                release_prefix: None,
            });
        }
        if s == "*-*" {
            return Some(Self {
                behavior: FloatBehavior::AbsoluteLatest,
                min_version: Version::try_parse("0.0.0-0")?,
                release_prefix: Some(String::new()),
            });
        }

        let stars = s.matches('*').count();
        if stars == 0 {
            return Version::try_parse(s).map(Self::exact);
        }
        // A wildcard must be the last character and never inside metadata.
        if s.contains('+') || !s.ends_with('*') {
            return None;
        }

        match stars {
            1 => parse_single_wildcard(&s[..s.len() - 1]),
            2 => parse_double_wildcard(s),
            _ => None,
        }
    }

    pub fn behavior(&self) -> FloatBehavior {
        self.behavior
    }

    /// The lowest concrete version this float can match.
    pub fn min_version(&self) -> &Version {
        &self.min_version
    }

    /// Label prefix a prerelease candidate must start with.
    pub fn release_prefix(&self) -> Option<&str> {
        self.release_prefix.as_deref()
    }

    pub fn includes_prerelease(&self) -> bool {
        self.behavior.includes_prerelease()
    }

    /// `true` if all non-floating parts of `version` match exactly.
    pub fn satisfies(&self, version: &Version) -> bool {
        let min = &self.min_version;
        let stable = !version.is_prerelease();
        match self.behavior {
            FloatBehavior::AbsoluteLatest => true,
            FloatBehavior::Major => stable,
            FloatBehavior::Minor => min.major() == version.major() && stable,
            FloatBehavior::Patch => {
                (min.major(), min.minor()) == (version.major(), version.minor()) && stable
            }
            FloatBehavior::Revision => {
                (min.major(), min.minor(), min.patch())
                    == (version.major(), version.minor(), version.patch())
                    && stable
            }
            FloatBehavior::Prerelease => {
                VersionComparison::Version.equals(min, version) && self.prefix_matches(version)
            }
            FloatBehavior::PrereleasePatch => {
                (min.major(), min.minor()) == (version.major(), version.minor())
                    && self.prefix_matches(version)
            }
            FloatBehavior::PrereleaseMinor => {
                min.major() == version.major() && self.prefix_matches(version)
            }
            FloatBehavior::PrereleaseMajor => self.prefix_matches(version),
            FloatBehavior::None => VersionComparison::VersionRelease.equals(min, version),
        }
    }

    fn prefix_matches(&self, version: &Version) -> bool {
        if !version.is_prerelease() {
            return true;
        }
        let prefix = self.release_prefix.as_deref().unwrap_or("");
        let release = version.release();
        release.len() >= prefix.len()
            && release.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }
}

impl fmt::Display for FloatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = &self.min_version;
        let prefix = self.release_prefix.as_deref().unwrap_or("");
        match self.behavior {
            FloatBehavior::None => write!(f, "{}", min.to_normalized_string()),
            FloatBehavior::Prerelease => write!(f, "{}-{prefix}*", min.to_numeric_string()),
            FloatBehavior::Revision => {
                write!(f, "{}.{}.{}.*", min.major(), min.minor(), min.patch())
            }
            FloatBehavior::Patch => write!(f, "{}.{}.*", min.major(), min.minor()),
            FloatBehavior::Minor => write!(f, "{}.*", min.major()),
            FloatBehavior::Major => f.write_str("*"),
            FloatBehavior::PrereleasePatch => {
                write!(f, "{}.{}.*-{prefix}*", min.major(), min.minor())
            }
            FloatBehavior::PrereleaseMinor => write!(f, "{}.*-{prefix}*", min.major()),
            FloatBehavior::PrereleaseMajor => write!(f, "*-{prefix}*"),
            FloatBehavior::AbsoluteLatest => f.write_str("*-*"),
        }
    }
}

/// `1.*`, `1.0.*`, `1.0.0.*`, `1.0.0-*`, `1.0.0-beta.*`, `1.0.0-beta-*`.
fn parse_single_wildcard(body: &str) -> Option<FloatRange> {
    if let Some((_, prefix)) = body.split_once('-') {
        // An empty trailing label is not a valid version, fill it with the
        // lowest numeric label.
        let concrete = if prefix.is_empty() || prefix.ends_with('.') {
            format!("{body}0")
        } else {
            body.to_string()
        };
        return Some(FloatRange {
            behavior: FloatBehavior::Prerelease,
            min_version: Version::try_parse(&concrete)?,
            release_prefix: Some(prefix.to_string()),
        });
    }

    if !body.ends_with('.') {
        return None;
    }
    let concrete = format!("{body}0");
    let behavior = match concrete.split('.').count() {
        2 => FloatBehavior::Minor,
        3 => FloatBehavior::Patch,
        4 => FloatBehavior::Revision,
        _ => return None,
    };
    Some(FloatRange {
        behavior,
        min_version: Version::try_parse(&concrete)?,
        release_prefix: None,
    })
}

/// `1.*-*`, `1.0.*-beta*`, `*-rc.*`: the first wildcard must sit right
/// before the dash, the second must end the string.
fn parse_double_wildcard(s: &str) -> Option<FloatRange> {
    let first_star = s.find('*')?;
    let dash = s.find('-')?;
    if first_star + 1 != dash {
        return None;
    }

    let stable = &s[..first_star];
    if !stable.is_empty() && !stable.ends_with('.') {
        return None;
    }
    let stable = format!("{stable}0");
    let behavior = match stable.split('.').count() {
        1 => FloatBehavior::PrereleaseMajor,
        2 => FloatBehavior::PrereleaseMinor,
        3 => FloatBehavior::PrereleasePatch,
        _ => return None,
    };

    let prefix = &s[dash + 1..s.len() - 1];
    let label = if prefix.is_empty() || prefix.ends_with('.') {
        format!("{prefix}0")
    } else {
        prefix.to_string()
    };

    Some(FloatRange {
        behavior,
        min_version: Version::try_parse(&format!("{stable}-{label}"))?,
        release_prefix: Some(prefix.to_string()),
    })
}
