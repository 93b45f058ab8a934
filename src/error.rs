use std::{error::Error, sync::Arc};

use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::{cache::CacheError, http::response::Envelope};

/// Failures of the artwork endpoints.
///
/// Every variant renders as a `200 OK` envelope with `success: false`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No artworks available")]
    NoArtworks,

    #[error("Failed to fetch artworks")]
    Fetch(#[source] Arc<CacheError>),

    #[error("Failed to refresh cache")]
    Refresh(#[source] Arc<CacheError>),

    #[error("Invalid action. Use ?action=refresh to refresh cache")]
    InvalidAction(Vec<String>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = match &self {
            ApiError::NoArtworks => {
                warn!("{}", self);
                Envelope::failure(self.to_string(), Value::Array(Vec::new()))
            }
            ApiError::Fetch(_) => {
                error!("{}: {:?}", self, self.source());
                Envelope::failure(self.to_string(), Value::Null)
            }
            ApiError::Refresh(cause) => {
                error!("{}: {:?}", self, self.source());
                Envelope::failure(self.to_string(), Value::Null).with_error(cause.to_string())
            }
            ApiError::InvalidAction(action) => {
                warn!("rejected artwork command with actions {:?}", action);
                Envelope::failure(self.to_string(), Value::Null)
            }
        };

        envelope.into_response()
    }
}
