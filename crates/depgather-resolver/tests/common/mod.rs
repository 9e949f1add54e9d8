use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use depgather_resolver::feed::FeedSource;
use depgather_resolver::source::{PackageSource, SourcePackage};
use depgather_util::cancel::CancellationToken;
use depgather_util::errors::{GatherError, GatherResult};
use depgather_versioning::VersionRange;

/// Wraps a feed, counting queries per id and optionally failing or stalling.
pub struct CountingSource {
    feed: FeedSource,
    delay: Duration,
    failing: Option<String>,
    pub total: AtomicUsize,
    per_id: Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    pub fn new(feed_toml: &str) -> Self {
        Self {
            feed: FeedSource::from_toml(feed_toml).unwrap(),
            delay: Duration::ZERO,
            failing: None,
            total: AtomicUsize::new(0),
            per_id: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing = Some(id.to_ascii_lowercase());
        self
    }

    pub fn calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.per_id
            .lock()
            .unwrap()
            .get(&id.to_ascii_lowercase())
            .copied()
            .unwrap_or(0)
    }

    async fn record(&self, id: &str, cancel: &CancellationToken) -> GatherResult<()> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .per_id
            .lock()
            .unwrap()
            .entry(id.to_ascii_lowercase())
            .or_default() += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        cancel.check()?;
        if self.failing.as_deref() == Some(id.to_ascii_lowercase().as_str()) {
            return Err(GatherError::source_query(id, "feed unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl PackageSource for CountingSource {
    async fn find_all_versions(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> GatherResult<Vec<SourcePackage>> {
        self.record(id, cancel).await?;
        self.feed.find_all_versions(id, cancel).await
    }

    async fn find_versions(
        &self,
        id: &str,
        range: &VersionRange,
        include_prerelease: bool,
        cancel: &CancellationToken,
    ) -> GatherResult<Vec<SourcePackage>> {
        self.record(id, cancel).await?;
        self.feed
            .find_versions(id, range, include_prerelease, cancel)
            .await
    }
}
