use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::source::error::SourceError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Artwork source unavailable: {0}")]
    Source(#[from] SourceError),

    #[error("Artwork fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Every caller that joined a failed fetch receives the same error.
pub type Result<T> = std::result::Result<T, Arc<CacheError>>;
