//! Per-package-id cache of searched ranges and fetched packages.
//!
//! Every id gets its own async mutex, created on first use and never removed.
//! All reads and writes of an id's state happen while holding that mutex, so
//! different ids proceed in parallel while queries for one id serialize.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use depgather_core::package::{id_key, PackageIdentity};
use depgather_versioning::VersionRange;

use crate::source::SourcePackage;

/// What is known about one package id.
#[derive(Debug, Default)]
pub struct IdCache {
    /// Envelope of every range queried so far; `None` until the first query.
    pub searched: Option<VersionRange>,
    /// Every listed package fetched so far, one entry per identity.
    pub found: HashMap<PackageIdentity, SourcePackage>,
}

impl IdCache {
    /// Merge fetched packages. Returns how many identities were new.
    pub fn merge(&mut self, packages: impl IntoIterator<Item = SourcePackage>) -> usize {
        let before = self.found.len();
        for package in packages {
            self.found
                .entry(package.identity.clone())
                .or_insert(package);
        }
        self.found.len() - before
    }
}

/// Lock table keyed by lowercased package id.
#[derive(Debug, Default)]
pub struct PackageCache {
    entries: Mutex<HashMap<String, Arc<tokio::sync::Mutex<IdCache>>>>,
}

impl PackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `id`, inserted atomically if absent.
    pub fn entry(&self, id: &str) -> Arc<tokio::sync::Mutex<IdCache>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(id_key(id)).or_default())
    }

    /// Number of ids seen so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
