//! Integration tests for the api backend

use serde_json::json;
use story_harvest::config::{ChapterBound, Config, SourceKind};
use story_harvest::crawler::Coordinator;
use story_harvest::output::read_collection;
use story_harvest::StopReason;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_api_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.start_page = 1;
    config.crawler.end_page = 1;
    config.source.kind = SourceKind::Api;
    config.source.api_base = Some(server.uri());
    config.source.api_key = Some("catalog-key".to_string());
    config.output.path = dir.path().join("stories.json").to_string_lossy().to_string();
    config
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer catalog-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/stories"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_chapters(server: &MockServer, slug: &str, count: u32) {
    for index in 1..=count {
        mount_json(
            server,
            &format!("/stories/{}/chapters/{}", slug, index),
            json!({ "images": [format!("https://cdn.example.com/{}/{}.jpg", slug, index)] }),
        )
        .await;
    }
}

#[tokio::test]
async fn test_api_harvest() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        json!([
            { "slug": "alpha", "title": "Alpha (listing)", "author": "Listing Author" },
            { "slug": "beta" }
        ]),
    )
    .await;

    mount_json(
        &server,
        "/stories/alpha",
        json!({ "title": "Alpha", "description": "First", "cover": "https://cdn.example.com/alpha.jpg" }),
    )
    .await;
    mount_json(&server, "/stories/beta", json!({ "title": "Beta" })).await;

    mount_chapters(&server, "alpha", 2).await;
    mount_json(&server, "/stories/alpha/chapters/3", json!({ "images": [] })).await;
    mount_chapters(&server, "beta", 1).await;

    let dir = TempDir::new().unwrap();
    let coordinator = Coordinator::new(create_api_config(&server, &dir))
        .unwrap()
        .without_publisher();

    let report = coordinator.run().await.unwrap();
    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection.len(), 2);

    let alpha = &collection[0];
    assert_eq!(alpha.id, "alpha");
    assert_eq!(alpha.title, "Alpha");
    assert_eq!(alpha.author, "Listing Author");
    assert_eq!(alpha.thumbnail, "https://cdn.example.com/alpha.jpg");
    assert_eq!(alpha.chapters.len(), 2);

    let beta = &collection[1];
    assert_eq!(beta.description, "unknown");
    assert_eq!(beta.chapters.len(), 1);
    assert_eq!(report.stats.stopped_by(StopReason::EmptyResult), 2);
}

#[tokio::test]
async fn test_api_known_chapter_count() {
    let server = MockServer::start().await;

    mount_listing(&server, json!([{ "slug": "counted" }])).await;
    mount_json(
        &server,
        "/stories/counted",
        json!({ "title": "Counted", "chapterCount": 2 }),
    )
    .await;
    mount_chapters(&server, "counted", 2).await;

    // Beyond the advertised count: must not be requested
    Mock::given(method("GET"))
        .and(path("/stories/counted/chapters/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images": ["https://x/3.jpg"] })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_api_config(&server, &dir);
    config.crawler.chapter_bound = ChapterBound::KnownCount;
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection[0].chapters.len(), 2);
    assert_eq!(report.stats.stopped_by(StopReason::BoundReached), 1);
}

#[tokio::test]
async fn test_api_invalid_detail_skips_item() {
    let server = MockServer::start().await;

    mount_listing(&server, json!([{ "slug": "broken" }, { "slug": "fine" }])).await;
    Mock::given(method("GET"))
        .and(path("/stories/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;
    mount_json(&server, "/stories/fine", json!({ "title": "Fine" })).await;

    let dir = TempDir::new().unwrap();
    let coordinator = Coordinator::new(create_api_config(&server, &dir))
        .unwrap()
        .without_publisher();

    let report = coordinator.run().await.unwrap();
    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection[0].id, "fine");
    assert!(collection[0].chapters.is_empty());
    assert_eq!(report.stats.items_skipped, 1);
}
