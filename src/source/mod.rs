pub mod airtable;
pub mod config;
pub mod error;
pub mod fixture;
pub mod mock;

use async_trait::async_trait;

use crate::artwork::Artwork;
use crate::source::error::SourceError;

pub use airtable::AirtableSource;
pub use config::AirtableConfig;
pub use fixture::FixtureSource;
pub use mock::MockArtworkSource;

/// Where the artwork collection ultimately comes from.
///
/// Implementations perform one full fetch per call and never retry.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    async fn fetch_artworks(&self) -> Result<Vec<Artwork>, SourceError>;
}
