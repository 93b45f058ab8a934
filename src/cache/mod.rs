//! In-process artwork cache guarding the external artwork source.
//!
//! The collection lives under a single moka key. Concurrent readers of a cold
//! or expired cache are coalesced onto one fetch by moka's entry
//! initialisation, so the source never sees parallel requests from this
//! process. Failed fetches are never cached.

pub mod config;
pub mod error;
pub mod snapshot;

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::{debug, error, info, warn};

use crate::artwork::{normalize, Artwork, ArtworkStats};
use crate::source::ArtworkSource;

pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use snapshot::{CacheStatus, Lookup, Snapshot};

const COLLECTION_KEY: &str = "artworks";

pub struct ArtworkCache {
    snapshots: Cache<&'static str, Snapshot>,
    latest: ArcSwapOption<Snapshot>,
    source: Arc<dyn ArtworkSource>,
    config: CacheConfig,
}

impl ArtworkCache {
    pub fn new(source: Arc<dyn ArtworkSource>, config: CacheConfig) -> Self {
        let snapshots = Cache::builder().time_to_live(config.ttl).build();

        Self {
            snapshots,
            latest: ArcSwapOption::empty(),
            source,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the current collection, fetching it if the cache is cold or
    /// expired.
    pub async fn get_all(&self) -> Result<Lookup<Snapshot>> {
        let entry = self
            .snapshots
            .entry(COLLECTION_KEY)
            .or_try_insert_with(self.fetch())
            .await;

        match entry {
            Ok(entry) => {
                let status = if entry.is_fresh() {
                    CacheStatus::Miss
                } else {
                    CacheStatus::Hit
                };
                debug!("artwork cache {}", status.as_str());
                Ok(Lookup::new(entry.into_value(), status))
            }
            Err(e) => self.stale_or(e),
        }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Lookup<Option<Artwork>>> {
        let lookup = self.get_all().await?;
        Ok(lookup.map(|snapshot| snapshot.find_by_slug(slug).cloned()))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Lookup<Option<Artwork>>> {
        let lookup = self.get_all().await?;
        Ok(lookup.map(|snapshot| snapshot.find_by_id(id).cloned()))
    }

    /// Drops the cached snapshot and fetches a new one regardless of its age.
    ///
    /// A refresh issued while a fetch is already running joins that fetch.
    pub async fn refresh(&self) -> Result<Snapshot> {
        info!("refreshing artwork cache");
        self.snapshots.invalidate(&COLLECTION_KEY).await;

        self.snapshots
            .entry(COLLECTION_KEY)
            .or_try_insert_with(self.fetch())
            .await
            .map(|entry| entry.into_value())
    }

    pub fn count(&self) -> usize {
        self.stats().count
    }

    pub fn featured_count(&self) -> usize {
        self.stats().featured_count
    }

    /// Counts over the last successfully fetched snapshot.
    pub fn stats(&self) -> ArtworkStats {
        self.latest
            .load_full()
            .map(|snapshot| snapshot.stats())
            .unwrap_or_default()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.latest.load_full().map(|snapshot| snapshot.fetched_at())
    }

    async fn fetch(&self) -> std::result::Result<Snapshot, CacheError> {
        let started = Instant::now();
        debug!("fetching artworks from source");

        let result = tokio::time::timeout(self.config.fetch_timeout, self.source.fetch_artworks())
            .await
            .map_err(|_| CacheError::Timeout(self.config.fetch_timeout))
            .and_then(|fetched| fetched.map_err(CacheError::from));

        let artworks = match result {
            Ok(artworks) => artworks,
            Err(e) => {
                error!("failed to fetch artworks after {:?}: {}", started.elapsed(), e);
                return Err(e);
            }
        };

        let snapshot = Snapshot::new(normalize(artworks));
        if snapshot.is_empty() {
            warn!("artwork source returned an empty collection");
        }

        let stats = snapshot.stats();
        info!(
            "cached {} artworks ({} featured) in {:?}",
            stats.count,
            stats.featured_count,
            started.elapsed()
        );

        self.latest.store(Some(Arc::new(snapshot.clone())));
        Ok(snapshot)
    }

    fn stale_or(&self, error: Arc<CacheError>) -> Result<Lookup<Snapshot>> {
        if self.config.serve_stale_on_error {
            if let Some(stale) = self.latest.load_full() {
                warn!(
                    "serving stale artworks from {} after fetch failure: {}",
                    stale.fetched_at().to_rfc3339(),
                    error
                );
                return Ok(Lookup::new(Snapshot::clone(&stale), CacheStatus::Stale));
            }
        }

        Err(error)
    }
}
