use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::artwork::Artwork;
use crate::source::{error::SourceError, ArtworkSource};

#[derive(Debug, Clone)]
enum MockResponse {
    Artworks(Vec<Artwork>),
    Failure(String),
}

/// Scripted source that counts how many fetches actually reached it.
#[derive(Debug)]
pub struct MockArtworkSource {
    response: Mutex<MockResponse>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockArtworkSource {
    pub fn returning(artworks: Vec<Artwork>) -> Self {
        Self {
            response: Mutex::new(MockResponse::Artworks(artworks)),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(MockResponse::Failure(message.into())),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_artworks(&self, artworks: Vec<Artwork>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) =
            MockResponse::Artworks(artworks);
    }

    pub fn set_failure(&self, message: impl Into<String>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) =
            MockResponse::Failure(message.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Fetches currently running, including ones parked in their delay.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Released on drop, so a fetch cancelled by a timeout still leaves.
struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(source: &'a MockArtworkSource) -> Self {
        let running = source.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        source.max_in_flight.fetch_max(running, Ordering::SeqCst);
        Self {
            counter: &source.in_flight,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ArtworkSource for MockArtworkSource {
    async fn fetch_artworks(&self) -> Result<Vec<Artwork>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _running = InFlight::enter(self);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match response {
            MockResponse::Artworks(artworks) => Ok(artworks),
            MockResponse::Failure(message) => Err(SourceError::Unavailable(message)),
        }
    }
}
