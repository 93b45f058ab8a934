use std::sync::Arc;

use chrono::{DateTime, Utc};
use derive_more::Constructor;

use crate::artwork::{Artwork, ArtworkStats};

/// One immutable epoch of the artwork collection.
#[derive(Debug, Clone)]
pub struct Snapshot {
    artworks: Arc<[Artwork]>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(artworks: Vec<Artwork>) -> Self {
        Self {
            artworks: artworks.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }

    pub fn stats(&self) -> ArtworkStats {
        ArtworkStats::from_artworks(&self.artworks)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|artwork| artwork.slug == slug)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|artwork| artwork.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a snapshot that was already cached.
    Hit,
    /// This call ran the fetch that produced the snapshot.
    Miss,
    /// The fetch failed and the last good snapshot was served instead.
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

/// A cache read together with how it was satisfied.
#[derive(Debug, Clone, Constructor)]
pub struct Lookup<T> {
    pub value: T,
    pub status: CacheStatus,
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        Lookup {
            value: f(self.value),
            status: self.status,
        }
    }
}
