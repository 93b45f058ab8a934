use serde::{Deserialize, Serialize};

/// A single gallery artwork as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Artwork {
    pub fn new(
        id: impl Into<String>,
        slug: impl Into<String>,
        title: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            title: title.into(),
            year,
            medium: None,
            dimensions: None,
            description: None,
            image_url: None,
            image_id: None,
            featured: false,
            tags: Vec::new(),
            available: None,
            price: None,
        }
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkStats {
    pub count: usize,
    pub featured_count: usize,
}

impl ArtworkStats {
    pub fn from_artworks(artworks: &[Artwork]) -> Self {
        Self {
            count: artworks.len(),
            featured_count: artworks.iter().filter(|a| a.featured).count(),
        }
    }
}
