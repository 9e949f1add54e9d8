//! Package identities, dependency constraints and resolved dependency nodes.
//!
//! Package ids compare case-insensitively everywhere.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use depgather_util::errors::{GatherError, GatherResult};
use depgather_versioning::{Version, VersionRange};
use serde::Serialize;

/// Lowercased id used as the key for per-package state.
pub fn id_key(id: &str) -> String {
    id.to_ascii_lowercase()
}

/// A concrete (`id` + version) or id-only package reference.
#[derive(Debug, Clone, Serialize)]
pub struct PackageIdentity {
    pub id: String,
    pub version: Option<Version>,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Self {
            id: id.into(),
            version: Some(version),
        }
    }

    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }

    /// Parse `"Id"` or `"Id@1.2.3"`.
    pub fn parse(s: &str) -> GatherResult<Self> {
        let s = s.trim();
        let (id, version) = match s.split_once('@') {
            Some((id, version)) => (id.trim(), Some(Version::parse(version)?)),
            None => (s, None),
        };
        if id.is_empty() {
            return Err(GatherError::Generic {
                message: format!("Missing package id in '{s}'"),
            });
        }
        Ok(Self {
            id: id.to_string(),
            version,
        })
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn key(&self) -> String {
        id_key(&self.id)
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id) && self.version == other.version
    }
}

impl Eq for PackageIdentity {}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.to_ascii_lowercase().hash(state);
        self.version.hash(state);
    }
}

/// Orders by id (ignoring case), then by version with id-only first.
impl Ord for PackageIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .to_ascii_lowercase()
            .cmp(&other.id.to_ascii_lowercase())
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl PartialOrd for PackageIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(ref v) => write!(f, "{} {}", self.id, v.to_normalized_string()),
            None => f.write_str(&self.id),
        }
    }
}

/// A named version constraint. A missing range means every version.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDependency {
    pub id: String,
    pub version_range: Option<VersionRange>,
}

impl PackageDependency {
    pub fn new(id: impl Into<String>, version_range: VersionRange) -> Self {
        Self {
            id: id.into(),
            version_range: Some(version_range),
        }
    }

    pub fn any_version(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version_range: None,
        }
    }

    /// The constraint, with "no range" widened to [`VersionRange::all`].
    pub fn range(&self) -> VersionRange {
        self.version_range.clone().unwrap_or_else(VersionRange::all)
    }

    pub fn key(&self) -> String {
        id_key(&self.id)
    }
}

impl PartialEq for PackageDependency {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id) && self.version_range == other.version_range
    }
}

impl Eq for PackageDependency {}

impl fmt::Display for PackageDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version_range {
            Some(ref range) => write!(f, "{} {}", self.id, range.to_short_string()),
            None => f.write_str(&self.id),
        }
    }
}

/// A resolved package version plus the dependencies it declares for one
/// target framework. Equality and hashing use the identity only.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDependencyInfo {
    #[serde(flatten)]
    identity: PackageIdentity,
    dependencies: Vec<PackageDependency>,
}

impl PackageDependencyInfo {
    /// Duplicate dependency entries (same id and range) are dropped,
    /// first occurrence wins.
    pub fn new(identity: PackageIdentity, dependencies: Vec<PackageDependency>) -> Self {
        let mut unique: Vec<PackageDependency> = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            if !unique.contains(&dep) {
                unique.push(dep);
            }
        }
        Self {
            identity,
            dependencies: unique,
        }
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn version(&self) -> Option<&Version> {
        self.identity.version.as_ref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.version().is_some_and(Version::is_prerelease)
    }

    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }
}

impl PartialEq for PackageDependencyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for PackageDependencyInfo {}

impl Hash for PackageDependencyInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl Ord for PackageDependencyInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl PartialOrd for PackageDependencyInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageDependencyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity)?;
        if !self.dependencies.is_empty() {
            let deps: Vec<String> = self.dependencies.iter().map(|d| d.to_string()).collect();
            write!(f, " -> {}", deps.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn identity_ignores_id_case() {
        let a = PackageIdentity::new("Newtonsoft.Json", v("13.0.1"));
        let b = PackageIdentity::new("newtonsoft.json", v("13.0.1.0"));
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn info_equality_uses_identity_only() {
        let a = PackageDependencyInfo::new(PackageIdentity::new("A", v("1.0")), vec![]);
        let b = PackageDependencyInfo::new(
            PackageIdentity::new("a", v("1.0")),
            vec![PackageDependency::any_version("B")],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_dependencies_dropped() {
        let info = PackageDependencyInfo::new(
            PackageIdentity::new("A", v("1.0")),
            vec![
                PackageDependency::any_version("B"),
                PackageDependency::any_version("b"),
                PackageDependency::new("C", VersionRange::parse("1.0").unwrap()),
            ],
        );
        assert_eq!(info.dependencies().len(), 2);
    }

    #[test]
    fn display() {
        let info = PackageDependencyInfo::new(
            PackageIdentity::new("A", v("1.0")),
            vec![
                PackageDependency::new("B", VersionRange::parse("[1.0, 2.0)").unwrap()),
                PackageDependency::any_version("C"),
            ],
        );
        assert_eq!(info.to_string(), "A 1.0.0 -> B [1.0.0,2.0.0), C");
    }
}
