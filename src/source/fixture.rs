use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::artwork::Artwork;
use crate::source::{error::SourceError, ArtworkSource};

/// Serves artworks from a local JSON array, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ArtworkSource for FixtureSource {
    async fn fetch_artworks(&self) -> Result<Vec<Artwork>, SourceError> {
        debug!("reading artworks fixture {}", self.path.display());

        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::FixtureRead(self.path.clone(), e))?;

        serde_json::from_slice(&content).map_err(|e| SourceError::FixtureDecode(self.path.clone(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"rec1","slug":"way-dao","title":"먹, 그리고...","year":2021,"featured":true}}]"#
        )
        .unwrap();

        let artworks = FixtureSource::new(file.path()).fetch_artworks().await.unwrap();
        assert_eq!(artworks.len(), 1);
        assert_eq!(artworks[0].slug, "way-dao");
        assert!(artworks[0].featured);
        assert!(artworks[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_bundled_fixture_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/artworks.json");
        let artworks = FixtureSource::new(path).fetch_artworks().await.unwrap();

        assert_eq!(artworks.len(), 3);
        assert_eq!(artworks.iter().filter(|a| a.featured).count(), 2);
        assert_eq!(artworks[1].price, Some(1800.0));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FixtureSource::new(dir.path().join("missing.json"))
            .fetch_artworks()
            .await;

        assert!(matches!(result, Err(SourceError::FixtureRead(..))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = FixtureSource::new(file.path()).fetch_artworks().await;
        assert!(matches!(result, Err(SourceError::FixtureDecode(..))));
    }
}
