use gallery_server::source::{error::SourceError, AirtableConfig, AirtableSource, ArtworkSource};
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;

const TABLE_PATH: &str = "/v0/appGallery/Artworks";

fn source_for(server: &mockito::ServerGuard) -> AirtableSource {
    let config =
        AirtableConfig::new("test-key".into(), "appGallery".into()).with_base_url(server.url());
    AirtableSource::new(config)
}

#[tokio::test]
async fn test_follows_offset_across_pages() {
    let mut server = mockito::Server::new_async().await;

    let first_page = server
        .mock("GET", TABLE_PATH)
        .match_header("authorization", "Bearer test-key")
        .match_query(Matcher::Regex("^pageSize=100$".into()))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "records": [
                    {"id": "rec1", "fields": {"Slug": "way-dao", "Title": "먹, 그리고...", "Year": 2021, "Featured": true}},
                    {"id": "rec2", "fields": {"Slug": "mountain-rain", "Title": "Mountain Rain", "Year": 2019}}
                ],
                "offset": "itr2"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let second_page = server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Regex("offset=itr2".into()))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "records": [
                    {"id": "rec3", "fields": {"Title": "Quiet Harbor", "Year": 2023}},
                    {"id": "rec4", "fields": {"Slug": "untitled"}}
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let artworks = source_for(&server).fetch_artworks().await.unwrap();

    first_page.assert_async().await;
    second_page.assert_async().await;

    let slugs: Vec<_> = artworks.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(slugs, vec!["way-dao", "mountain-rain", "quiet-harbor"]);
    assert!(artworks[0].featured);
    assert_eq!(artworks[1].year, 2019);
}

#[tokio::test]
async fn test_repeated_offset_stops_pagination() {
    let mut server = mockito::Server::new_async().await;

    let first_page = server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Regex("^pageSize=100$".into()))
        .with_body(
            json!({
                "records": [{"id": "rec1", "fields": {"Slug": "way-dao", "Title": "먹, 그리고..."}}],
                "offset": "itrLoop"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let looping_page = server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Regex("offset=itrLoop".into()))
        .with_body(
            json!({
                "records": [{"id": "rec2", "fields": {"Slug": "mountain-rain", "Title": "Mountain Rain"}}],
                "offset": "itrLoop"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let artworks = source_for(&server).fetch_artworks().await.unwrap();

    first_page.assert_async().await;
    looping_page.assert_async().await;
    assert_eq!(artworks.len(), 2);
}

#[tokio::test]
async fn test_passes_configured_view() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::UrlEncoded("view".into(), "Published".into()))
        .with_body(json!({"records": []}).to_string())
        .create_async()
        .await;

    let config = AirtableConfig::new("test-key".into(), "appGallery".into())
        .with_base_url(server.url())
        .with_view("Published");
    let artworks = AirtableSource::new(config).fetch_artworks().await.unwrap();

    mock.assert_async().await;
    assert!(artworks.is_empty());
}

#[tokio::test]
async fn test_rate_limit_maps_to_error() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"errors":[{"error":"RATE_LIMIT_REACHED"}]}"#)
        .create_async()
        .await;

    let result = source_for(&server).fetch_artworks().await;
    assert!(matches!(result, Err(SourceError::RateLimited)));
}

#[tokio::test]
async fn test_bad_credentials_map_to_unauthorized() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":{"type":"AUTHENTICATION_REQUIRED","message":"Authentication required"}}"#)
        .create_async()
        .await;

    let result = source_for(&server).fetch_artworks().await;
    assert!(matches!(result, Err(SourceError::Unauthorized(401))));
}

#[tokio::test]
async fn test_other_status_carries_airtable_message() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error":{"type":"TABLE_NOT_FOUND","message":"Could not find table Artworks"}}"#)
        .create_async()
        .await;

    match source_for(&server).fetch_artworks().await {
        Err(SourceError::Status { code, message }) => {
            assert_eq!(code, 404);
            assert_eq!(message, "Could not find table Artworks");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_request_error() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", TABLE_PATH)
        .match_query(Matcher::Any)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let result = source_for(&server).fetch_artworks().await;
    assert!(matches!(result, Err(SourceError::Request(_))));
}
