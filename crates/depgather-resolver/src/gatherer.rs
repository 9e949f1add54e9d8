//! Incremental closure walk over a package source.
//!
//! `seek` expands one dependency target: it makes sure the cache covers the
//! target's range (`ensure`), reads the matching packages (`get`), combines
//! their dependencies per child id and expands every child concurrently.
//! Ids already on the ancestor chain are not expanded again.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use depgather_core::framework::{FrameworkReducer, NearestFrameworkReducer, TargetFramework};
use depgather_core::package::{PackageDependency, PackageDependencyInfo, PackageIdentity};
use depgather_util::cancel::CancellationToken;
use depgather_util::errors::{GatherError, GatherResult};
use depgather_versioning::VersionRange;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::PackageCache;
use crate::source::{PackageSource, SourceCapability, SourcePackage};

const MAX_CONCURRENT_QUERIES: usize = 8;

/// Counters for the work a gatherer has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GathererStats {
    /// Source queries issued.
    pub queries: usize,
    /// Distinct listed packages added to the cache.
    pub packages_fetched: usize,
}

/// Settings shared by every task of one resolution.
#[derive(Debug)]
struct Walk {
    framework: TargetFramework,
    include_prerelease: bool,
    cancel: CancellationToken,
}

/// Gathers dependency closures from a [`PackageSource`].
///
/// The cache lives as long as the gatherer, so repeated resolutions reuse
/// earlier queries.
pub struct DependencyGatherer {
    source: Arc<dyn PackageSource>,
    capability: SourceCapability,
    reducer: Arc<dyn FrameworkReducer>,
    cache: PackageCache,
    query_permits: Semaphore,
    queries: AtomicUsize,
    packages_fetched: AtomicUsize,
}

impl DependencyGatherer {
    pub fn new(source: Arc<dyn PackageSource>, capability: SourceCapability) -> Self {
        Self {
            source,
            capability,
            reducer: Arc::new(NearestFrameworkReducer),
            cache: PackageCache::new(),
            query_permits: Semaphore::new(MAX_CONCURRENT_QUERIES),
            queries: AtomicUsize::new(0),
            packages_fetched: AtomicUsize::new(0),
        }
    }

    pub fn with_reducer(mut self, reducer: Arc<dyn FrameworkReducer>) -> Self {
        self.reducer = reducer;
        self
    }

    /// Bound the number of source queries in flight. Seek fan-out itself is
    /// not bounded, so a parent never holds a permit while awaiting children.
    pub fn with_max_concurrent_queries(mut self, max: usize) -> Self {
        self.query_permits = Semaphore::new(max.max(1));
        self
    }

    pub fn capability(&self) -> SourceCapability {
        self.capability
    }

    pub fn stats(&self) -> GathererStats {
        GathererStats {
            queries: self.queries.load(Ordering::SeqCst),
            packages_fetched: self.packages_fetched.load(Ordering::SeqCst),
        }
    }

    /// The range searched so far for `id`, if it was ever queried.
    pub async fn searched_range(&self, id: &str) -> Option<VersionRange> {
        let entry = self.cache.entry(id);
        let state = entry.lock().await;
        state.searched.clone()
    }

    /// Resolve the closure of `requests` for `framework`.
    ///
    /// A request with a version is pinned to exactly that version; an id-only
    /// request accepts every version. Prerelease nodes are dropped from the
    /// result unless `include_prerelease` is set. The first source failure or
    /// a cancellation aborts the whole walk.
    pub async fn resolve_packages(
        self: &Arc<Self>,
        requests: &[PackageIdentity],
        framework: &TargetFramework,
        include_prerelease: bool,
        cancel: &CancellationToken,
    ) -> GatherResult<HashSet<PackageDependencyInfo>> {
        let walk = Arc::new(Walk {
            framework: framework.clone(),
            include_prerelease,
            cancel: cancel.clone(),
        });

        let mut join_set = JoinSet::new();
        for request in requests {
            let range = match request.version {
                Some(ref version) => VersionRange::exact(version.clone()),
                None => VersionRange::all(),
            };
            let target = PackageDependency::new(request.id.clone(), range);
            join_set.spawn(Arc::clone(self).seek(target, Vec::new(), Arc::clone(&walk)));
        }

        let mut closure = HashSet::new();
        while let Some(joined) = join_set.join_next().await {
            closure.extend(joined.map_err(join_error)??);
        }

        if !include_prerelease {
            closure.retain(|node| !node.is_prerelease());
        }

        let stats = self.stats();
        tracing::info!(
            "Resolved {} package(s) for {} root(s) targeting {framework} ({} source queries)",
            closure.len(),
            requests.len(),
            stats.queries
        );
        Ok(closure)
    }

    fn seek(
        self: Arc<Self>,
        target: PackageDependency,
        ancestors: Vec<String>,
        walk: Arc<Walk>,
    ) -> BoxFuture<'static, GatherResult<HashSet<PackageDependencyInfo>>> {
        async move {
            walk.cancel.check()?;

            let key = target.key();
            if ancestors.contains(&key) {
                tracing::trace!("Cycle at {}, chain: {}", target.id, ancestors.join(" -> "));
                return Ok(HashSet::new());
            }

            self.ensure(&target, &walk).await?;
            let mut nodes = self.get(&target, &walk).await;

            let children = combine_children(&nodes);
            if children.is_empty() {
                return Ok(nodes);
            }

            let mut chain = ancestors;
            chain.push(key);

            let mut join_set = JoinSet::new();
            for child in children {
                join_set.spawn(Arc::clone(&self).seek(child, chain.clone(), Arc::clone(&walk)));
            }
            // returning early drops the set, which aborts the siblings
            while let Some(joined) = join_set.join_next().await {
                nodes.extend(joined.map_err(join_error)??);
            }
            Ok(nodes)
        }
        .boxed()
    }

    /// Make sure the cache for `target.id` covers `target`'s range, querying
    /// the source for whatever part is still missing.
    async fn ensure(&self, target: &PackageDependency, walk: &Walk) -> GatherResult<()> {
        let entry = self.cache.entry(&target.id);
        let mut state = entry.lock().await;

        let requested = effective_range(target, walk.include_prerelease);
        let needed = VersionRange::needed_range(state.searched.as_ref(), &requested);
        if needed.is_empty() {
            tracing::trace!("Cache covers {} {}", target.id, requested.to_short_string());
            return Ok(());
        }
        let needed =
            needed.with_include_prerelease(needed.include_prerelease() || walk.include_prerelease);

        tracing::debug!(
            "Querying {} for {} (searched: {}, requested: {})",
            target.id,
            needed.to_short_string(),
            state
                .searched
                .as_ref()
                .map_or_else(|| "nothing".to_string(), VersionRange::to_short_string),
            requested.to_short_string()
        );

        let packages = self.query(&target.id, &needed, &walk.cancel).await?;
        let listed: Vec<SourcePackage> = packages
            .into_iter()
            .filter(|p| {
                if !p.listed {
                    tracing::trace!("Ignoring unlisted {}", p.identity);
                }
                p.listed && p.identity.has_version()
            })
            .collect();

        state.searched = Some(match self.capability {
            SourceCapability::FetchAll => VersionRange::all().with_include_prerelease(true),
            SourceCapability::RangeFilter => match state.searched.take() {
                Some(old) => widen_searched(&old, &needed),
                None => needed,
            },
        });

        let added = state.merge(listed);
        self.packages_fetched.fetch_add(added, Ordering::SeqCst);
        Ok(())
    }

    async fn query(
        &self,
        id: &str,
        needed: &VersionRange,
        cancel: &CancellationToken,
    ) -> GatherResult<Vec<SourcePackage>> {
        let _permit = self
            .query_permits
            .acquire()
            .await
            .map_err(|e| GatherError::source_query(id, e.to_string()))?;
        cancel.check()?;

        self.queries.fetch_add(1, Ordering::SeqCst);
        let request = async {
            match self.capability {
                SourceCapability::FetchAll => self.source.find_all_versions(id, cancel).await,
                SourceCapability::RangeFilter => {
                    self.source
                        .find_versions(id, needed, needed.include_prerelease(), cancel)
                        .await
                }
            }
        };
        // a source that never polls the token is still abandoned on cancel
        let result = tokio::select! {
            result = request => result,
            () = cancel.cancelled() => Err(GatherError::Cancelled),
        };
        result.map_err(|e| match e {
            GatherError::Cancelled | GatherError::SourceQuery { .. } => e,
            other => GatherError::source_query(id, other.to_string()),
        })
    }

    /// Cached packages for `target.id` satisfying `target`'s range, with the
    /// dependency group for the walk's framework applied.
    async fn get(&self, target: &PackageDependency, walk: &Walk) -> HashSet<PackageDependencyInfo> {
        let entry = self.cache.entry(&target.id);
        let state = entry.lock().await;

        let range = effective_range(target, walk.include_prerelease);
        state
            .found
            .values()
            .filter(|p| p.identity.version.as_ref().is_some_and(|v| range.satisfies(v)))
            .map(|p| self.to_info(p, &walk.framework))
            .collect()
    }

    fn to_info(&self, package: &SourcePackage, framework: &TargetFramework) -> PackageDependencyInfo {
        let dependencies = self
            .reducer
            .nearest(framework, &package.frameworks())
            .and_then(|nearest| package.groups.iter().find(|g| g.framework == nearest))
            .map(|group| group.dependencies.clone())
            .unwrap_or_default();
        PackageDependencyInfo::new(package.identity.clone(), dependencies)
    }
}

/// The target's range with the walk's prerelease request applied.
fn effective_range(target: &PackageDependency, include_prerelease: bool) -> VersionRange {
    let range = target.range();
    let include = range.include_prerelease() || include_prerelease;
    range.with_include_prerelease(include)
}

/// Envelope of `old` and a freshly queried `needed` range.
///
/// Prerelease coverage is only claimed over the whole envelope when every
/// part of it was queried with prereleases; otherwise the envelope stays
/// stable-only and later prerelease requests query again.
fn widen_searched(old: &VersionRange, needed: &VersionRange) -> VersionRange {
    let combined = VersionRange::combine([old, needed]);
    let include_prerelease = match (old.include_prerelease(), needed.include_prerelease()) {
        (true, true) => true,
        (false, false) => false,
        (true, false) => needed
            .with_include_prerelease(true)
            .is_subset_or_equal_to(old),
        (false, true) => old
            .with_include_prerelease(true)
            .is_subset_or_equal_to(needed),
    };
    combined.with_include_prerelease(include_prerelease)
}

/// One target per child id, its range the combination of every range the
/// parents declare for it.
fn combine_children(nodes: &HashSet<PackageDependencyInfo>) -> Vec<PackageDependency> {
    let mut by_id: BTreeMap<String, (String, Vec<VersionRange>)> = BTreeMap::new();
    for dep in nodes.iter().flat_map(|n| n.dependencies()) {
        by_id
            .entry(dep.key())
            .or_insert_with(|| (dep.id.clone(), Vec::new()))
            .1
            .push(dep.range());
    }
    by_id
        .into_values()
        .map(|(id, ranges)| PackageDependency::new(id, VersionRange::combine(&ranges)))
        .collect()
}

fn join_error(e: tokio::task::JoinError) -> GatherError {
    GatherError::Generic {
        message: format!("Dependency walk task failed: {e}"),
    }
}
