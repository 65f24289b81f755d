//! Integration tests for the html backend
//!
//! These tests use wiremock to serve listing, detail and chapter pages and
//! run full harvests against them. Anything not mounted answers 404.

use std::time::Duration;
use story_harvest::config::Config;
use story_harvest::crawler::Coordinator;
use story_harvest::output::read_collection;
use story_harvest::publish::PublishStatus;
use story_harvest::StopReason;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing the html backend at `server`
fn create_test_config(server: &MockServer, dir: &TempDir, start: u32, end: u32) -> Config {
    let mut config = Config::default();
    config.crawler.start_page = start;
    config.crawler.end_page = end;
    config.http.timeout_secs = 1;
    config.source.list_url = format!("{}/list/{{page}}", server.uri());
    config.output.path = dir.path().join("stories.json").to_string_lossy().to_string();
    config
}

fn listing_page(server: &MockServer, slugs: &[&str]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<div class="list-truyen-item"><a href="{}/manga/{}" title="{} (listing)">{}</a></div>"#,
                server.uri(),
                slug,
                slug,
                slug
            )
        })
        .collect();

    format!(
        r#"<html><body><div class="col-truyen-list">{}</div></body></html>"#,
        items
    )
}

fn detail_page(title: &str, author: Option<&str>) -> String {
    let author = author
        .map(|a| format!(r#"<p class="author"><span>{}</span></p>"#, a))
        .unwrap_or_default();

    format!(
        r#"<html><body>
        <div class="info-image"><img data-src="/covers/cover.jpg" src="/placeholder.gif"></div>
        <h1 class="title-detail">{0}</h1>
        {1}
        <div class="summary_content">About {0}.</div>
        </body></html>"#,
        title, author
    )
}

fn chapter_page(images: &[&str]) -> String {
    let tags: String = images
        .iter()
        .map(|src| format!(r#"<img data-src="{}">"#, src))
        .collect();

    format!(
        r#"<html><body><div class="reading-detail"><img src="/static/logo.png">{}</div></body></html>"#,
        tags
    )
}

async fn mount(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Page 5 with two items: `first` has two chapters before an empty page,
/// `second` has three chapters before a 404
async fn mount_catalog(server: &MockServer) {
    mount(server, "/list/5", listing_page(server, &["first", "second"])).await;

    mount(server, "/manga/first", detail_page("First Story", Some("Someone"))).await;
    mount(server, "/manga/first/chapter-1", chapter_page(&["/img/f1a.jpg", "/img/f1b.jpg"])).await;
    mount(server, "/manga/first/chapter-2", chapter_page(&["/img/f2a.jpg"])).await;
    mount(server, "/manga/first/chapter-3", chapter_page(&[])).await;

    mount(server, "/manga/second", detail_page("Second Story", None)).await;
    for index in 1..=3 {
        mount(
            server,
            &format!("/manga/second/chapter-{}", index),
            chapter_page(&["https://cdn.example.com/page.jpg"]),
        )
        .await;
    }
}

#[tokio::test]
async fn test_full_harvest_single_page() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    // Never probed: the sequence already ended at chapter 3
    Mock::given(method("GET"))
        .and(path("/manga/first/chapter-4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chapter_page(&["/x.jpg"])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 5, 5);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.stats.items_persisted, 2);
    assert_eq!(report.stats.stopped_by(StopReason::EmptyResult), 2);
    assert_eq!(report.publish, PublishStatus::Disabled);

    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection.len(), 2);

    let first = &collection[0];
    assert_eq!(first.id, "first");
    assert_eq!(first.title, "First Story");
    assert_eq!(first.author, "Someone");
    assert_eq!(first.description, "About First Story.");
    assert_eq!(first.thumbnail, format!("{}/covers/cover.jpg", server.uri()));
    assert_eq!(first.chapters.len(), 2);
    assert_eq!(first.chapters[0].name, "Chapter 1");
    assert_eq!(
        first.chapters[0].images,
        vec![
            format!("{}/img/f1a.jpg", server.uri()),
            format!("{}/img/f1b.jpg", server.uri())
        ]
    );

    let second = &collection[1];
    assert_eq!(second.id, "second");
    assert_eq!(second.author, "unknown");
    assert_eq!(second.chapters.len(), 3);
    assert!(second.chapters.iter().all(|c| !c.images.is_empty()));
}

#[tokio::test]
async fn test_harvest_is_idempotent() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 5, 5);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let first = coordinator.run().await.unwrap();
    let first_bytes = std::fs::read(&first.output_path).unwrap();

    let second = coordinator.run().await.unwrap();
    let second_bytes = std::fs::read(&second.output_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_slow_page_does_not_stop_later_pages() {
    let server = MockServer::start().await;

    mount(&server, "/list/6", listing_page(&server, &["early"])).await;
    mount(&server, "/list/8", listing_page(&server, &["late"])).await;
    Mock::given(method("GET"))
        .and(path("/list/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&server, &["never"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    for slug in ["early", "late"] {
        mount(&server, &format!("/manga/{}", slug), detail_page(slug, None)).await;
        mount(
            &server,
            &format!("/manga/{}/chapter-1", slug),
            chapter_page(&["/img/1.jpg"]),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 6, 8);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.stats.pages_visited, 3);
    assert_eq!(report.stats.empty_pages, 1);

    let collection = read_collection(&report.output_path).unwrap();
    let ids: Vec<_> = collection.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[tokio::test]
async fn test_failed_detail_skips_item() {
    let server = MockServer::start().await;

    mount(&server, "/list/1", listing_page(&server, &["good", "bad"])).await;
    mount(&server, "/manga/good", detail_page("Good", None)).await;
    mount_status(&server, "/manga/bad", 500).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 1, 1);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.stats.items_skipped, 1);

    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection[0].id, "good");
    assert!(collection[0].chapters.is_empty());
}

#[tokio::test]
async fn test_chapter_failure_truncates_item() {
    let server = MockServer::start().await;

    mount(&server, "/list/1", listing_page(&server, &["flaky"])).await;
    mount(&server, "/manga/flaky", detail_page("Flaky", None)).await;
    mount(&server, "/manga/flaky/chapter-1", chapter_page(&["/img/1.jpg"])).await;
    mount_status(&server, "/manga/flaky/chapter-2", 503).await;
    mount(&server, "/manga/flaky/chapter-3", chapter_page(&["/img/3.jpg"])).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 1, 1);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.stats.stopped_by(StopReason::TransportFailure), 1);

    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection[0].chapters.len(), 1);
}

#[tokio::test]
async fn test_updating_marker_ends_chapters() {
    let server = MockServer::start().await;

    mount(&server, "/list/1", listing_page(&server, &["ongoing"])).await;
    mount(&server, "/manga/ongoing", detail_page("Ongoing", None)).await;
    mount(&server, "/manga/ongoing/chapter-1", chapter_page(&["/img/1.jpg"])).await;
    mount(
        &server,
        "/manga/ongoing/chapter-2",
        "<html><body><p>Truyện đang cập nhật</p><div class=\"reading-detail\"><img data-src=\"/img/teaser.jpg\"></div></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 1, 1);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    let collection = read_collection(&report.output_path).unwrap();
    assert_eq!(collection[0].chapters.len(), 1);
    assert_eq!(report.stats.stopped_by(StopReason::EmptyResult), 1);
}

#[tokio::test]
async fn test_publish_failure_keeps_artifact() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir, 5, 5);
    config.publish.name = Some("bot".to_string());
    config.publish.email = Some("bot@example.com".to_string());
    config.publish.token = Some("very-secret-token".to_string());
    config.publish.repository = Some("someone/site".to_string());
    config.publish.workdir = dir.path().to_string_lossy().to_string();

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    match &report.publish {
        PublishStatus::Failed(message) => assert!(!message.contains("very-secret-token")),
        other => panic!("expected publish failure, got {:?}", other),
    }
    assert_eq!(read_collection(&report.output_path).unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_range_writes_empty_collection() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 1, 2);
    let coordinator = Coordinator::new(config).unwrap().without_publisher();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.stats.pages_visited, 2);
    assert_eq!(report.stats.empty_pages, 2);
    assert_eq!(std::fs::read_to_string(&report.output_path).unwrap(), "[]\n");
}
