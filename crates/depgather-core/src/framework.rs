//! Target frameworks and the reducer that picks which of a package's
//! per-framework dependency groups applies to the caller's framework.

use std::fmt;
use std::hash::{Hash, Hasher};

use depgather_versioning::Version;
use serde::{Deserialize, Serialize};

/// A target framework moniker such as `net8.0` or `netstandard2.0`.
///
/// The empty moniker and `any` denote framework-agnostic dependency groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetFramework(String);

impl TargetFramework {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn any() -> Self {
        Self("any".to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty() || self.0.eq_ignore_ascii_case("any")
    }

    /// Leading alphabetic family (`net`, `netstandard`) and trailing version.
    fn split(&self) -> (String, Option<Version>) {
        let idx = self
            .0
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.0.len());
        let (family, version) = self.0.split_at(idx);
        (family.to_ascii_lowercase(), Version::try_parse(version))
    }
}

impl PartialEq for TargetFramework {
    fn eq(&self, other: &Self) -> bool {
        (self.is_any() && other.is_any()) || self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for TargetFramework {}

impl Hash for TargetFramework {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_any() {
            "any".hash(state);
        } else {
            self.0.to_ascii_lowercase().hash(state);
        }
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("any")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Picks the candidate framework nearest to a target, if any applies.
pub trait FrameworkReducer: Send + Sync {
    fn nearest(
        &self,
        target: &TargetFramework,
        candidates: &[TargetFramework],
    ) -> Option<TargetFramework>;
}

/// Exact match first, then the highest version of the same family not above
/// the target, then a framework-agnostic group.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestFrameworkReducer;

impl FrameworkReducer for NearestFrameworkReducer {
    fn nearest(
        &self,
        target: &TargetFramework,
        candidates: &[TargetFramework],
    ) -> Option<TargetFramework> {
        if let Some(exact) = candidates.iter().find(|c| *c == target) {
            return Some(exact.clone());
        }

        let (family, version) = target.split();
        if let Some(version) = version {
            let compatible = candidates
                .iter()
                .filter(|c| !c.is_any())
                .filter_map(|c| match c.split() {
                    (f, Some(v)) if f == family && v <= version => Some((v, c)),
                    _ => None,
                })
                .max_by(|a, b| a.0.cmp(&b.0));
            if let Some((_, candidate)) = compatible {
                return Some(candidate.clone());
            }
        }

        candidates.iter().find(|c| c.is_any()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fws(names: &[&str]) -> Vec<TargetFramework> {
        names.iter().map(|n| TargetFramework::new(*n)).collect()
    }

    #[test]
    fn exact_match_wins() {
        let target = TargetFramework::new("net6.0");
        let picked = NearestFrameworkReducer.nearest(&target, &fws(&["any", "NET6.0", "net5.0"]));
        assert_eq!(picked, Some(TargetFramework::new("net6.0")));
    }

    #[test]
    fn highest_lower_version_of_family() {
        let target = TargetFramework::new("net8.0");
        let picked =
            NearestFrameworkReducer.nearest(&target, &fws(&["net5.0", "net6.0", "net9.0", "any"]));
        assert_eq!(picked, Some(TargetFramework::new("net6.0")));
    }

    #[test]
    fn falls_back_to_any() {
        let target = TargetFramework::new("net8.0");
        let picked =
            NearestFrameworkReducer.nearest(&target, &fws(&["netstandard2.0", "", "net9.0"]));
        assert!(picked.unwrap().is_any());
    }

    #[test]
    fn nothing_applicable() {
        let target = TargetFramework::new("net8.0");
        assert!(NearestFrameworkReducer
            .nearest(&target, &fws(&["net9.0", "netstandard2.1"]))
            .is_none());
    }

    #[test]
    fn any_target_only_takes_agnostic_groups() {
        let picked = NearestFrameworkReducer.nearest(&TargetFramework::any(), &fws(&["net8.0", "any"]));
        assert!(picked.unwrap().is_any());
    }
}
