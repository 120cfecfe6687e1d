use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use moka::future::Cache;
use tokio::sync::watch;
use tracing::debug;

use crate::config::CacheConfig;
use crate::directory::{Facets, FilterSpec, facets, filter_profiles};
use crate::feed::ProfileSnapshot;
use crate::models::Profile;

type ResultKey = (u64, FilterSpec);

pub struct ResultCache {
    pub results: Cache<ResultKey, Arc<Vec<Profile>>>,
    pub capacity: u64,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        assert!(
            config.results_max_capacity >= 16,
            "Result cache capacity threshold"
        );
        assert!(config.results_ttl_seconds > 0, "Result cache TTL threshold");

        let ttl = config.results_ttl();
        let results = Cache::builder()
            .max_capacity(config.results_max_capacity)
            .time_to_live(ttl)
            .time_to_idle(ttl / 2 + Duration::from_secs(1))
            .build();

        Self {
            results,
            capacity: config.results_max_capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryView {
    pub revision: u64,
    pub total: usize,
    pub active_filters: usize,
    pub profiles: Arc<Vec<Profile>>,
}

impl DirectoryView {
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The "no profiles found" state offers a reset only when some filter is
    /// actually narrowing the list.
    pub fn offers_clear_filters(&self) -> bool {
        self.is_empty() && self.active_filters > 0
    }
}

#[derive(Clone)]
pub struct DirectoryService {
    snapshots: watch::Receiver<Arc<ProfileSnapshot>>,
    cache: Arc<ResultCache>,
}

impl DirectoryService {
    pub fn new(snapshots: watch::Receiver<Arc<ProfileSnapshot>>, cache: Arc<ResultCache>) -> Self {
        assert!(cache.capacity >= 16, "Result cache must be configured");
        Self { snapshots, cache }
    }

    pub fn snapshot(&self) -> Arc<ProfileSnapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    pub async fn query(&self, spec: &FilterSpec) -> DirectoryView {
        let snapshot = self.snapshot();
        let key = (snapshot.revision, spec.clone());

        let profiles = if let Some(cached) = self.cache.results.get(&key).await {
            debug!("Directory cache hit at revision {}", snapshot.revision);
            cached
        } else {
            let matched: Vec<Profile> = filter_profiles(&snapshot.profiles, spec)
                .into_iter()
                .cloned()
                .collect();
            debug!(
                "Directory cache miss at revision {}: {} of {} profiles match",
                snapshot.revision,
                matched.len(),
                snapshot.len()
            );
            let matched = Arc::new(matched);
            self.cache.results.insert(key, Arc::clone(&matched)).await;
            matched
        };

        DirectoryView {
            revision: snapshot.revision,
            total: snapshot.len(),
            active_filters: spec.active_filter_count(),
            profiles,
        }
    }

    pub fn facets(&self) -> Facets {
        facets(&self.snapshot().profiles)
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Result<Arc<ProfileSnapshot>> {
        self.snapshots
            .changed()
            .await
            .context("Snapshot publisher dropped")?;
        Ok(Arc::clone(&self.snapshots.borrow_and_update()))
    }
}
