//! A package source backed by a local TOML feed file.
//!
//! ```toml
//! [[package]]
//! id = "Serilog"
//! version = "2.10.0"
//! listed = true                          # optional, defaults to true
//! dependencies = { "Serilog.Core" = "[2.0, 3.0)" }   # framework-agnostic
//!
//! [[package.group]]
//! framework = "net8.0"
//! dependencies = { "System.Memory" = "4.5.0" }
//! ```
//!
//! An empty range string means any version.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use depgather_core::framework::TargetFramework;
use depgather_core::package::{id_key, PackageDependency, PackageIdentity};
use depgather_util::cancel::CancellationToken;
use depgather_util::errors::{GatherError, GatherResult};
use depgather_versioning::{Version, VersionRange};
use serde::Deserialize;

use crate::source::{DependencyGroup, PackageSource, SourcePackage};

#[derive(Debug, Deserialize)]
struct FeedFile {
    #[serde(default, rename = "package")]
    packages: Vec<FeedPackage>,
}

#[derive(Debug, Deserialize)]
struct FeedPackage {
    id: String,
    version: Version,
    #[serde(default = "default_listed")]
    listed: bool,
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "group")]
    groups: Vec<FeedGroup>,
}

#[derive(Debug, Deserialize)]
struct FeedGroup {
    #[serde(default)]
    framework: TargetFramework,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

fn default_listed() -> bool {
    true
}

/// In-memory package feed, keyed by lowercased id.
#[derive(Debug, Clone, Default)]
pub struct FeedSource {
    packages: HashMap<String, Vec<SourcePackage>>,
}

impl FeedSource {
    pub fn load(path: &Path) -> GatherResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GatherError::Feed {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let feed = Self::from_toml(&content)?;
        tracing::debug!(
            "Loaded {} package version(s) from {}",
            feed.len(),
            path.display()
        );
        Ok(feed)
    }

    pub fn from_toml(content: &str) -> GatherResult<Self> {
        let file: FeedFile = toml::from_str(content).map_err(|e| GatherError::Feed {
            message: format!("Failed to parse feed: {e}"),
        })?;

        let mut packages = Vec::with_capacity(file.packages.len());
        for package in file.packages {
            let mut groups = Vec::new();
            if let Some(deps) = package.dependencies {
                groups.push(DependencyGroup::any(parse_dependencies(&package.id, deps)?));
            }
            for group in package.groups {
                groups.push(DependencyGroup::new(
                    group.framework,
                    parse_dependencies(&package.id, group.dependencies)?,
                ));
            }
            packages.push(SourcePackage {
                identity: PackageIdentity::new(package.id, package.version),
                listed: package.listed,
                groups,
            });
        }
        Ok(Self::from_packages(packages))
    }

    pub fn from_packages(packages: impl IntoIterator<Item = SourcePackage>) -> Self {
        let mut by_id: HashMap<String, Vec<SourcePackage>> = HashMap::new();
        for package in packages {
            by_id
                .entry(package.identity.key())
                .or_default()
                .push(package);
        }
        Self { packages: by_id }
    }

    /// Number of package versions in the feed.
    pub fn len(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn parse_dependencies(
    owner: &str,
    deps: BTreeMap<String, String>,
) -> GatherResult<Vec<PackageDependency>> {
    deps.into_iter()
        .map(|(id, range)| {
            if range.trim().is_empty() {
                return Ok(PackageDependency::any_version(id));
            }
            let parsed = VersionRange::parse(&range).map_err(|_| GatherError::Feed {
                message: format!("Invalid range '{range}' for dependency {id} of {owner}"),
            })?;
            Ok(PackageDependency::new(id, parsed))
        })
        .collect()
}

#[async_trait]
impl PackageSource for FeedSource {
    async fn find_all_versions(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> GatherResult<Vec<SourcePackage>> {
        cancel.check()?;
        Ok(self.packages.get(&id_key(id)).cloned().unwrap_or_default())
    }
}
