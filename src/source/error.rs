use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Error reading config from environment: {0}")]
    Config(String),

    #[error("Error sending request to Airtable")]
    Request(#[from] reqwest::Error),

    #[error("Airtable rejected the credentials (status {0})")]
    Unauthorized(u16),

    #[error("Airtable rate limit exceeded")]
    RateLimited,

    #[error("Airtable returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Error reading fixture file '{}'", .0.display())]
    FixtureRead(PathBuf, #[source] io::Error),

    #[error("Error decoding fixture file '{}'", .0.display())]
    FixtureDecode(PathBuf, #[source] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}
