//! Airtable REST client for the artworks table

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::artwork::{collection::slugify, Artwork};
use crate::source::{config::AirtableConfig, error::SourceError, ArtworkSource};

const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    records: Vec<AirtableRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: ArtworkFields,
}

#[derive(Debug, Default, Deserialize)]
struct ArtworkFields {
    #[serde(rename = "Slug")]
    slug: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<f64>,
    #[serde(rename = "Medium")]
    medium: Option<String>,
    #[serde(rename = "Dimensions")]
    dimensions: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Image", default)]
    image: Vec<Attachment>,
    #[serde(rename = "ImageUrl")]
    image_url: Option<String>,
    #[serde(rename = "ImageId")]
    image_id: Option<String>,
    #[serde(rename = "Featured", default)]
    featured: bool,
    #[serde(rename = "Tags", default)]
    tags: Vec<String>,
    #[serde(rename = "Available")]
    available: Option<bool>,
    #[serde(rename = "Price")]
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl AirtableRecord {
    fn into_artwork(self) -> Option<Artwork> {
        let fields = self.fields;

        let title = match fields.title.map(|t| t.trim().to_string()) {
            Some(title) if !title.is_empty() => title,
            _ => {
                warn!("skipping record '{}' without a title", self.id);
                return None;
            }
        };

        let slug = fields
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&title));
        if slug.is_empty() {
            warn!("skipping record '{}' without a usable slug", self.id);
            return None;
        }

        let year = fields.year.map(|raw| year_of(&self.id, raw)).unwrap_or_default();

        let image_url = fields
            .image
            .into_iter()
            .next()
            .map(|attachment| attachment.url)
            .or(fields.image_url);

        Some(Artwork {
            id: self.id,
            slug,
            title,
            year,
            medium: fields.medium,
            dimensions: fields.dimensions,
            description: fields.description,
            image_url,
            image_id: fields.image_id,
            featured: fields.featured,
            tags: fields.tags,
            available: fields.available,
            price: fields.price,
        })
    }
}

/// Airtable number fields arrive as floats. Fractions are rounded, anything
/// outside `i32` becomes 0.
fn year_of(id: &str, raw: f64) -> i32 {
    if !raw.is_finite() || raw < i32::MIN as f64 || raw > i32::MAX as f64 {
        warn!("ignoring out-of-range year {} on record '{}'", raw, id);
        return 0;
    }

    let rounded = raw.round();
    if rounded != raw {
        warn!("rounding fractional year {} on record '{}' to {}", raw, id, rounded);
    }
    rounded as i32
}

/// Fetches the artworks table page by page, following Airtable's `offset`.
pub struct AirtableSource {
    client: Client,
    config: AirtableConfig,
}

impl AirtableSource {
    pub fn new(config: AirtableConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn fetch_page(&self, offset: Option<&str>) -> Result<ListRecordsResponse, SourceError> {
        let mut query = vec![("pageSize", PAGE_SIZE)];
        if let Some(view) = self.config.view.as_deref() {
            query.push(("view", view));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }

        let response = self
            .client
            .get(self.config.table_url())
            .bearer_auth(&self.config.api_key)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SourceError::Unauthorized(status.as_u16())
            }
            StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited,
            _ => SourceError::Status {
                code: status.as_u16(),
                message: error_message(&body),
            },
        })
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed
            .error
            .message
            .or(parsed.error.kind)
            .unwrap_or_else(|| "Unknown error".to_string()),
        Err(_) if body.is_empty() => "Unknown error".to_string(),
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl ArtworkSource for AirtableSource {
    async fn fetch_artworks(&self) -> Result<Vec<Artwork>, SourceError> {
        let started = Instant::now();
        let mut artworks = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self.fetch_page(offset.as_deref()).await?;
            pages += 1;
            debug!("fetched airtable page {} ({} records)", pages, page.records.len());

            artworks.extend(page.records.into_iter().filter_map(AirtableRecord::into_artwork));

            match page.offset {
                Some(next) if offset.as_deref() == Some(next.as_str()) => {
                    warn!("airtable repeated page offset '{}', stopping pagination", next);
                    break;
                }
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        info!(
            "fetched {} artworks from airtable in {:?} ({} pages)",
            artworks.len(),
            started.elapsed(),
            pages
        );

        Ok(artworks)
    }
}

impl std::fmt::Debug for AirtableSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableSource")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> AirtableRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_maps_attachment_and_fields() {
        let artwork = record(json!({
            "id": "rec1",
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": {
                "Slug": "way-dao",
                "Title": "먹, 그리고...",
                "Year": 2021,
                "Medium": "Ink on hanji",
                "Image": [{"url": "https://dl.airtable.com/a.jpg", "id": "att1"}],
                "ImageUrl": "https://fallback.example.com/a.jpg",
                "Featured": true,
                "Tags": ["ink", "calligraphy"],
                "Price": 1200.5
            }
        }))
        .into_artwork()
        .unwrap();

        assert_eq!(artwork.id, "rec1");
        assert_eq!(artwork.slug, "way-dao");
        assert_eq!(artwork.year, 2021);
        assert_eq!(artwork.image_url.as_deref(), Some("https://dl.airtable.com/a.jpg"));
        assert!(artwork.featured);
        assert_eq!(artwork.tags, vec!["ink", "calligraphy"]);
        assert_eq!(artwork.price, Some(1200.5));
        assert_eq!(artwork.available, None);
    }

    #[test]
    fn test_record_without_slug_falls_back_to_title() {
        let artwork = record(json!({
            "id": "rec2",
            "fields": {"Title": "Mountain Rain", "ImageUrl": "https://x/y.jpg"}
        }))
        .into_artwork()
        .unwrap();

        assert_eq!(artwork.slug, "mountain-rain");
        assert_eq!(artwork.year, 0);
        assert!(!artwork.featured);
        assert_eq!(artwork.image_url.as_deref(), Some("https://x/y.jpg"));
    }

    #[test]
    fn test_year_is_rounded_or_dropped() {
        assert_eq!(year_of("rec1", 2021.0), 2021);
        assert_eq!(year_of("rec1", 2020.6), 2021);
        assert_eq!(year_of("rec1", 1e12), 0);
        assert_eq!(year_of("rec1", f64::NAN), 0);

        let artwork = record(json!({
            "id": "rec5",
            "fields": {"Title": "Half Moon", "Year": 1999.4}
        }))
        .into_artwork()
        .unwrap();
        assert_eq!(artwork.year, 1999);
    }

    #[test]
    fn test_record_without_title_is_skipped() {
        assert!(record(json!({"id": "rec3", "fields": {"Slug": "orphan"}}))
            .into_artwork()
            .is_none());
        assert!(record(json!({"id": "rec4", "fields": {}}))
            .into_artwork()
            .is_none());
    }

    #[test]
    fn test_error_message_prefers_airtable_body() {
        let body = r#"{"error":{"type":"NOT_FOUND","message":"Could not find table"}}"#;
        assert_eq!(error_message(body), "Could not find table");
        assert_eq!(error_message(r#"{"error":{"type":"NOT_FOUND"}}"#), "NOT_FOUND");
        assert_eq!(error_message(""), "Unknown error");
        assert_eq!(error_message("bad gateway"), "bad gateway");
    }
}
