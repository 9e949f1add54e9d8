//! Version range parsing, formatting, satisfaction and best-match selection.
//!
//! Supported forms:
//! - `1.0` (at least 1.0, i.e. `[1.0, )`)
//! - `1.*`, `1.0.0-beta.*`, `*` (floating, resolved to the highest match)
//! - `[1.0, 2.0)`, `(1.0, ]`, `(, 2.0]`, `[1.0]` (intervals; `[`/`]` inclusive)

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use depgather_util::errors::{GatherError, GatherResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::float::{FloatBehavior, FloatRange};
use crate::version::{Version, VersionComparison};

/// An interval over versions with optional floating behavior.
///
/// A missing bound is unbounded on that side. The canonical empty range has
/// no bounds and both sides exclusive; see [`VersionRange::none`].
#[derive(Debug, Clone)]
pub struct VersionRange {
    min: Option<Version>,
    min_inclusive: bool,
    max: Option<Version>,
    max_inclusive: bool,
    include_prerelease: bool,
    float: Option<FloatRange>,
    original: Option<String>,
}

impl VersionRange {
    /// Build a range from its bounds. Prerelease versions are included when
    /// either bound carries prerelease labels.
    pub fn new(
        min: Option<Version>,
        min_inclusive: bool,
        max: Option<Version>,
        max_inclusive: bool,
    ) -> Self {
        let include_prerelease = min.as_ref().is_some_and(Version::is_prerelease)
            || max.as_ref().is_some_and(Version::is_prerelease);
        Self {
            min,
            min_inclusive,
            max,
            max_inclusive,
            include_prerelease,
            float: None,
            original: None,
        }
    }

    /// `[float.min, )` resolved through `float`.
    pub fn floating(float: FloatRange) -> Self {
        let mut range = Self::new(Some(float.min_version().clone()), true, None, false);
        range.include_prerelease |= float.includes_prerelease();
        range.float = Some(float);
        range
    }

    /// Every version.
    pub fn all() -> Self {
        Self::new(None, true, None, true)
    }

    /// The empty range `(, )`: no version satisfies it.
    pub fn none() -> Self {
        Self::new(None, false, None, false)
    }

    /// `[version, version]`
    pub fn exact(version: Version) -> Self {
        Self::new(Some(version.clone()), true, Some(version), true)
    }

    /// `[version, )`
    pub fn at_least(version: Version) -> Self {
        Self::new(Some(version), true, None, false)
    }

    /// An equivalent range with the prerelease flag replaced.
    pub fn with_include_prerelease(&self, include_prerelease: bool) -> Self {
        Self {
            include_prerelease,
            ..self.clone()
        }
    }

    /// Parse a range expression, failing with [`GatherError::InvalidRange`].
    pub fn parse(input: &str) -> GatherResult<Self> {
        Self::try_parse(input).ok_or_else(|| GatherError::invalid_range(input))
    }

    /// Parse a range expression, returning `None` when it is malformed.
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::try_parse_with(input, true)
    }

    /// Like [`try_parse`](Self::try_parse), optionally rejecting wildcards.
    pub fn try_parse_with(input: &str, allow_floating: bool) -> Option<Self> {
        let mut range = parse_range(input.trim(), allow_floating)?;
        range.original = Some(input.to_string());
        Some(range)
    }

    pub fn min_version(&self) -> Option<&Version> {
        self.min.as_ref()
    }

    pub fn max_version(&self) -> Option<&Version> {
        self.max.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_some()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_some()
    }

    pub fn has_lower_and_upper_bounds(&self) -> bool {
        self.has_lower_bound() && self.has_upper_bound()
    }

    pub fn include_prerelease(&self) -> bool {
        self.include_prerelease
    }

    pub fn float(&self) -> Option<&FloatRange> {
        self.float.as_ref()
    }

    pub fn is_floating(&self) -> bool {
        self.float
            .as_ref()
            .is_some_and(|f| f.behavior() != FloatBehavior::None)
    }

    /// The exact text this range was parsed from, if any.
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// `true` if no version can satisfy this range.
    pub fn is_empty(&self) -> bool {
        match (&self.min, &self.max) {
            (None, None) => !self.min_inclusive && !self.max_inclusive,
            (Some(min), Some(max)) => match min.cmp(max) {
                Ordering::Greater => true,
                Ordering::Equal => !(self.min_inclusive && self.max_inclusive),
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// `[v, v]`: both bounds inclusive and equal.
    pub fn is_exact(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => self.min_inclusive && self.max_inclusive && min == max,
            _ => false,
        }
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.satisfies_with(version, VersionComparison::VersionRelease)
    }

    /// `true` if `version` lies within the bounds under `comparison` and is
    /// either stable, allowed by the prerelease flag, or sits exactly on a
    /// bound's numeric version.
    pub fn satisfies_with(&self, version: &Version, comparison: VersionComparison) -> bool {
        if self.is_empty() || !self.bounds_contain(version, comparison) {
            return false;
        }
        !version.is_prerelease() || self.include_prerelease || self.is_on_edge(version)
    }

    /// Pure interval membership, ignoring prerelease eligibility.
    pub(crate) fn bounds_contain(&self, version: &Version, comparison: VersionComparison) -> bool {
        if let Some(ref min) = self.min {
            match comparison.compare(version, min) {
                Ordering::Less => return false,
                Ordering::Equal if !self.min_inclusive => return false,
                _ => {}
            }
        }
        if let Some(ref max) = self.max {
            match comparison.compare(version, max) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.max_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    fn is_on_edge(&self, version: &Version) -> bool {
        let same = |bound: &Option<Version>| {
            bound
                .as_ref()
                .is_some_and(|b| VersionComparison::Version.equals(b, version))
        };
        same(&self.min) || same(&self.max)
    }

    /// The highest candidate satisfying this range.
    ///
    /// For floating ranges candidates matching the float are preferred; when
    /// none match it, the highest in-range candidate is returned instead.
    pub fn find_best_match<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        let in_range: Vec<&Version> = versions
            .into_iter()
            .filter(|v| self.satisfies(v))
            .collect();

        if let Some(ref float) = self.float {
            let floated = in_range.iter().copied().filter(|v| float.satisfies(v)).max();
            if floated.is_some() {
                return floated;
            }
        }
        in_range.into_iter().max()
    }

    /// Shorthand form: `1.0.0`, `1.*`, `[1.0.0]`, otherwise a compact interval.
    pub fn to_short_string(&self) -> String {
        if let Some(unbounded) = self.unbounded_text() {
            return unbounded.to_string();
        }
        if self.has_lower_bound() && self.min_inclusive && !self.has_upper_bound() {
            return self.lower_text();
        }
        if self.is_exact() {
            return format!("[{}]", self.lower_text());
        }
        self.interval_string(self.min.is_some().then(|| self.lower_text()), ",")
    }

    /// Interval form with every float collapsed to its minimum version.
    /// A float over any major version collapses to an unbounded lower side.
    pub fn to_legacy_string(&self) -> String {
        let lower = match self.float {
            Some(ref f) if f.behavior().floats_major() => None,
            _ => self.min.as_ref().map(Version::to_normalized_string),
        };
        if self.is_exact() {
            if let Some(lower) = lower {
                return format!("[{lower}]");
            }
        }
        self.interval_string(lower, ", ")
    }

    /// Legacy form, shortened to a bare version for `[v, )` ranges.
    pub fn to_legacy_short_string(&self) -> String {
        let legacy = self.to_legacy_string();
        match (&self.min, &self.max) {
            (Some(min), None) if self.min_inclusive && !legacy.starts_with('(') => {
                min.to_normalized_string()
            }
            _ => legacy,
        }
    }

    fn lower_text(&self) -> String {
        match (&self.float, &self.min) {
            (Some(f), _) if self.is_floating() => f.to_string(),
            (_, Some(min)) => min.to_normalized_string(),
            _ => String::new(),
        }
    }

    /// `*` (or `*-*` with prereleases) for a non-empty range with no bounds.
    /// Both sides unbounded and exclusive is the empty range, which has no
    /// parseable form.
    fn unbounded_text(&self) -> Option<&'static str> {
        if self.min.is_some() || self.max.is_some() || self.is_empty() {
            return None;
        }
        Some(if self.include_prerelease { "*-*" } else { "*" })
    }

    fn interval_string(&self, lower: Option<String>, separator: &str) -> String {
        let mut s = String::new();
        s.push(if lower.is_some() && self.min_inclusive {
            '['
        } else {
            '('
        });
        if let Some(lower) = lower {
            s.push_str(&lower);
        }
        s.push_str(separator);
        if let Some(ref max) = self.max {
            s.push_str(&max.to_normalized_string());
        }
        s.push(if self.max.is_some() && self.max_inclusive {
            ']'
        } else {
            ')'
        });
        s
    }
}

fn parse_range(value: &str, allow_floating: bool) -> Option<VersionRange> {
    if value.is_empty() {
        return None;
    }
    if allow_floating && value == "*" {
        return FloatRange::try_parse(value).map(VersionRange::floating);
    }

    let (min_text, max_text, min_inclusive, max_inclusive) =
        if value.starts_with('[') || value.starts_with('(') {
            let min_inclusive = value.starts_with('[');
            let max_inclusive = match value.chars().last() {
                Some(']') if value.len() > 1 => true,
                Some(')') => false,
                _ => return None,
            };
            let inner = &value[1..value.len() - 1];
            let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
            if parts.len() > 2 || parts.iter().all(|p| p.is_empty()) {
                return None;
            }
            // `(1.0]`, `[1.0)` and `(1.0)` have no meaning
            if parts.len() == 1 && !(min_inclusive && max_inclusive) {
                return None;
            }
            let max_text = parts.get(1).copied().unwrap_or(parts[0]);
            (parts[0], max_text, min_inclusive, max_inclusive)
        } else {
            (value, "", true, false)
        };

    let mut float = None;
    let min = if min_text.is_empty() {
        None
    } else if min_text.contains('*') {
        if !allow_floating {
            return None;
        }
        let parsed = FloatRange::try_parse(min_text)?;
        let min = parsed.min_version().clone();
        float = Some(parsed);
        Some(min)
    } else {
        Some(Version::try_parse(min_text)?)
    };

    let max = if max_text.is_empty() {
        None
    } else {
        Some(Version::try_parse(max_text)?)
    };

    let mut range = VersionRange::new(min, min_inclusive, max, max_inclusive);
    if let (Some(min), Some(max)) = (&range.min, &range.max) {
        match min.cmp(max) {
            Ordering::Greater => return None,
            Ordering::Equal if !(min_inclusive && max_inclusive) => return None,
            _ => {}
        }
    }
    if let Some(float) = float {
        range.include_prerelease |= float.includes_prerelease();
        range.float = Some(float);
    }
    Some(range)
}

impl PartialEq for VersionRange {
    fn eq(&self, other: &Self) -> bool {
        self.min_inclusive == other.min_inclusive
            && self.max_inclusive == other.max_inclusive
            && self.min == other.min
            && self.max == other.max
            && self.float == other.float
    }
}

impl Eq for VersionRange {}

/// Normalized interval form: `[1.0.0, 2.0.0)`, `[1.*, )`, `(, 3.0.0]`.
/// [`VersionRange::all`] is written `*`.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(unbounded) = self.unbounded_text() {
            return f.write_str(unbounded);
        }
        let lower = self.min.is_some().then(|| self.lower_text());
        f.write_str(&self.interval_string(lower, ", "))
    }
}

impl FromStr for VersionRange {
    type Err = GatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.original {
            Some(ref original) => serializer.serialize_str(original),
            None => serializer.serialize_str(&self.to_short_string()),
        }
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
