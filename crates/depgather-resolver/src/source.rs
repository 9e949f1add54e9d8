//! The package source the gatherer queries, and what it returns.

use async_trait::async_trait;
use depgather_core::framework::TargetFramework;
use depgather_core::package::{PackageDependency, PackageIdentity};
use depgather_util::cancel::CancellationToken;
use depgather_util::errors::GatherResult;
use depgather_versioning::VersionRange;

/// How a source can answer version queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceCapability {
    /// Only "every version of this id"; the gatherer filters locally and
    /// records the whole version space as searched.
    #[default]
    FetchAll,
    /// The source filters by range itself; only the needed range is fetched.
    RangeFilter,
}

/// Dependencies a package declares for one target framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub framework: TargetFramework,
    pub dependencies: Vec<PackageDependency>,
}

impl DependencyGroup {
    pub fn new(framework: TargetFramework, dependencies: Vec<PackageDependency>) -> Self {
        Self {
            framework,
            dependencies,
        }
    }

    /// A framework-agnostic group.
    pub fn any(dependencies: Vec<PackageDependency>) -> Self {
        Self::new(TargetFramework::any(), dependencies)
    }
}

/// One concrete package version as reported by a source.
#[derive(Debug, Clone)]
pub struct SourcePackage {
    pub identity: PackageIdentity,
    pub listed: bool,
    pub groups: Vec<DependencyGroup>,
}

impl SourcePackage {
    pub fn new(identity: PackageIdentity, groups: Vec<DependencyGroup>) -> Self {
        Self {
            identity,
            listed: true,
            groups,
        }
    }

    pub fn unlisted(mut self) -> Self {
        self.listed = false;
        self
    }

    /// Frameworks this package declares dependency groups for.
    pub fn frameworks(&self) -> Vec<TargetFramework> {
        self.groups.iter().map(|g| g.framework.clone()).collect()
    }
}

/// A repository of packages.
///
/// Implementations report failures as [`GatherError::SourceQuery`]. The
/// gatherer races every query against [`CancellationToken::cancelled`] and
/// drops it on cancellation, so a source only needs to observe `cancel`
/// itself to stop work that outlives the dropped future.
///
/// [`GatherError::SourceQuery`]: depgather_util::errors::GatherError::SourceQuery
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Every version of `id`, listed or not.
    async fn find_all_versions(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> GatherResult<Vec<SourcePackage>>;

    /// Versions of `id` within `range`.
    ///
    /// The default implementation filters [`find_all_versions`](Self::find_all_versions)
    /// locally; sources with server-side filtering override it.
    async fn find_versions(
        &self,
        id: &str,
        range: &VersionRange,
        include_prerelease: bool,
        cancel: &CancellationToken,
    ) -> GatherResult<Vec<SourcePackage>> {
        let range = range.with_include_prerelease(range.include_prerelease() || include_prerelease);
        let all = self.find_all_versions(id, cancel).await?;
        Ok(all
            .into_iter()
            .filter(|p| p.identity.version.as_ref().is_some_and(|v| range.satisfies(v)))
            .collect())
    }
}
