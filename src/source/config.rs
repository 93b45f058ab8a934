use std::fmt;

use crate::source::error::SourceError;

pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com";
pub const DEFAULT_TABLE_NAME: &str = "Artworks";

#[derive(Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
    pub view: Option<String>,
    pub base_url: String,
}

impl AirtableConfig {
    /// Reads `AIRTABLE_*` from the process environment. Callers load `.env`
    /// first.
    pub fn from_env() -> Result<Self, SourceError> {
        let api_key = std::env::var("AIRTABLE_API_KEY")
            .map_err(|_| SourceError::Config("AIRTABLE_API_KEY not set".to_string()))?;
        let base_id = std::env::var("AIRTABLE_BASE_ID")
            .map_err(|_| SourceError::Config("AIRTABLE_BASE_ID not set".to_string()))?;
        let table_name =
            std::env::var("AIRTABLE_TABLE_NAME").unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());
        let view = std::env::var("AIRTABLE_VIEW").ok().filter(|v| !v.is_empty());
        let base_url =
            std::env::var("AIRTABLE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_id,
            table_name,
            view,
            base_url,
        })
    }

    pub fn new(api_key: String, base_id: String) -> Self {
        Self {
            api_key,
            base_id,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            view: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn table_url(&self) -> String {
        format!(
            "{}/v0/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.base_id,
            self.table_name
        )
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .field("view", &self.view)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
