use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cache::CacheStatus;

pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Uniform `{success, data, message?, error?}` response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            data,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Attaches the `x-cache` header so clients see how a read was served.
pub fn cached<T: Serialize>(status: CacheStatus, envelope: Envelope<T>) -> Response {
    ([(CACHE_STATUS_HEADER, status.as_str())], envelope).into_response()
}
