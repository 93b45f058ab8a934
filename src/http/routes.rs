use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::{
    artwork::ArtworkStats,
    cache::ArtworkCache,
    error::ApiError,
    http::response::{cached, Envelope},
};

pub const REFRESH_ACTION: &str = "refresh";

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ArtworkCache>,
}

impl AppState {
    pub fn new(cache: Arc<ArtworkCache>) -> Self {
        Self { cache }
    }
}

/// Raw query pairs, kept in order so repeated parameters never reject a request.
pub type QueryPairs = Vec<(String, String)>;

#[derive(Debug, Default, PartialEq)]
pub struct ArtworkQuery {
    pub slug: Option<String>,
}

impl ArtworkQuery {
    /// The first `slug` wins, a blank one counts as absent.
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        let slug = pairs
            .into_iter()
            .find(|(key, _)| key == "slug")
            .map(|(_, value)| value.trim().to_string())
            .filter(|slug| !slug.is_empty());

        Self { slug }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct CommandQuery {
    pub actions: Vec<String>,
}

impl CommandQuery {
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        let actions = pairs
            .into_iter()
            .filter(|(key, _)| key == "action")
            .map(|(_, value)| value)
            .collect();

        Self { actions }
    }

    /// Exactly one `action`, and it must be `refresh`.
    pub fn is_refresh(&self) -> bool {
        matches!(self.actions.as_slice(), [action] if action == REFRESH_ACTION)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/artworks", get(read_artworks).post(artwork_command))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.cache.stats();

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "cache": {
            "count": stats.count,
            "featuredCount": stats.featured_count,
            "fetchedAt": state.cache.fetched_at().map(|at| at.to_rfc3339()),
        },
    }))
}

/// `GET /api/artworks[?slug=...]`
pub async fn read_artworks(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let query = ArtworkQuery::from_pairs(pairs);

    if let Some(slug) = query.slug.as_deref() {
        let lookup = state.cache.get_by_slug(slug).await.map_err(ApiError::Fetch)?;
        if lookup.value.is_none() {
            debug!("no artwork with slug '{}'", slug);
        }
        return Ok(cached(lookup.status, Envelope::success(lookup.value)));
    }

    let lookup = state.cache.get_all().await.map_err(ApiError::Fetch)?;
    if lookup.value.is_empty() {
        return Err(ApiError::NoArtworks);
    }

    Ok(cached(lookup.status, Envelope::success(lookup.value.artworks())))
}

/// `POST /api/artworks?action=refresh`
pub async fn artwork_command(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Envelope<ArtworkStats>, ApiError> {
    let query = CommandQuery::from_pairs(pairs);
    if !query.is_refresh() {
        return Err(ApiError::InvalidAction(query.actions));
    }

    let snapshot = state.cache.refresh().await.map_err(ApiError::Refresh)?;
    let stats = snapshot.stats();
    info!(
        "artwork cache refreshed ({} artworks, {} featured)",
        stats.count, stats.featured_count
    );

    Ok(Envelope::success(stats).with_message("Cache refreshed successfully"))
}
