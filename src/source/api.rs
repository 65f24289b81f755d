//! JSON catalog API backend
//!
//! Endpoints, relative to `api-base`:
//!
//! | Request | Response |
//! |---------|----------|
//! | `GET /stories?page={page}` | `[{ "slug"?, "id"?, "url"?, "title"?, "author"?, "description"?, "thumbnail"? }]` |
//! | `GET {locator}` | `{ "slug"?, "id"?, "title"?, "author"?, "description"?, "thumbnail"?, "cover"?, "chapter_count"? }` |
//! | `GET {locator}/chapters/{index}` | `{ "images": [..] }` |
//!
//! `id` may be a string or a number. The item id is the first of `slug`,
//! `id` and the locator's last segment. `locator` is the listing's `url`, or
//! `{api-base}/stories/{slug or id}`.

use crate::model::{ExtractedFields, ItemDetail, ItemReference, ItemSummary};
use crate::source::fetcher::fetch_json;
use crate::source::{ChapterProbe, DetailExtractor, ItemSource};
use crate::url::is_decorative_image;
use crate::{ConfigError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Identifier that some catalogs send as a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ApiId {
    Text(String),
    Number(i64),
}

impl ApiId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

fn item_key(slug: Option<String>, id: Option<ApiId>) -> Option<String> {
    slug.filter(|slug| !slug.trim().is_empty())
        .or_else(|| id.map(ApiId::into_string))
        .filter(|key| !key.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct ApiListing {
    slug: Option<String>,
    id: Option<ApiId>,
    url: Option<String>,
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiDetail {
    slug: Option<String>,
    id: Option<ApiId>,
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    thumbnail: Option<String>,
    cover: Option<String>,
    chapter_count: Option<u32>,
    #[serde(rename = "chapterCount")]
    chapter_count_camel: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiChapter {
    #[serde(default)]
    images: Vec<String>,
}

/// Backend that reads a JSON catalog API
pub struct ApiBackend {
    client: Client,
    base: String,
}

impl ApiBackend {
    /// Creates the backend for the given API base URL
    pub fn new(client: Client, base: &str) -> Result<Self, ConfigError> {
        Url::parse(base).map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-base '{}': {}", base, e)))?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn reference_from(&self, listing: ApiListing) -> Option<ItemReference> {
        let key = item_key(listing.slug, listing.id);
        let locator = match (&listing.url, &key) {
            (Some(url), _) => url.clone(),
            (None, Some(key)) => format!("{}/stories/{}", self.base, key),
            (None, None) => return None,
        };

        let mut reference = ItemReference::from_locator(locator);
        if let Some(key) = key {
            reference.id = key;
        }

        Some(reference.with_summary(ItemSummary {
            title: listing.title,
            author: listing.author,
            description: listing.description,
            thumbnail: listing.thumbnail,
        }))
    }
}

#[async_trait]
impl ItemSource for ApiBackend {
    async fn try_list(&self, page: u32) -> FetchResult<Vec<ItemReference>> {
        let url = format!("{}/stories?page={}", self.base, page);
        let listings: Vec<ApiListing> = fetch_json(&self.client, &url).await?;

        let total = listings.len();
        let items: Vec<ItemReference> = listings
            .into_iter()
            .filter_map(|listing| self.reference_from(listing))
            .collect();

        if items.len() < total {
            tracing::warn!(
                "Page {}: {} listings had no slug, id or url",
                page,
                total - items.len()
            );
        }

        Ok(items)
    }
}

#[async_trait]
impl DetailExtractor for ApiBackend {
    async fn fetch(&self, item: &ItemReference) -> FetchResult<ItemDetail> {
        let detail: ApiDetail = fetch_json(&self.client, &item.locator).await?;

        let fields = ExtractedFields {
            id: item_key(detail.slug, detail.id),
            title: detail.title,
            author: detail.author,
            description: detail.description,
            thumbnail: detail.thumbnail.or(detail.cover),
            chapter_count: detail.chapter_count.or(detail.chapter_count_camel),
        };

        Ok(ItemDetail::from_fields(item, fields))
    }
}

#[async_trait]
impl ChapterProbe for ApiBackend {
    async fn probe(&self, item: &ItemReference, index: u32) -> FetchResult<Vec<String>> {
        let url = format!("{}/chapters/{}", item.locator.trim_end_matches('/'), index);
        let chapter: ApiChapter = fetch_json(&self.client, &url).await?;

        Ok(chapter
            .images
            .into_iter()
            .map(|src| src.trim().to_string())
            .filter(|src| src.starts_with("http") && !is_decorative_image(src))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::source::build_http_client;

    fn backend() -> ApiBackend {
        let client = build_http_client(&HttpConfig::default(), None).unwrap();
        ApiBackend::new(client, "https://api.example.com/").unwrap()
    }

    #[test]
    fn test_rejects_invalid_base() {
        let client = build_http_client(&HttpConfig::default(), None).unwrap();
        assert!(ApiBackend::new(client, "not a url").is_err());
    }

    #[test]
    fn test_reference_from_slug() {
        let listing: ApiListing =
            serde_json::from_str(r#"{"slug": "solo", "title": "Solo"}"#).unwrap();
        let reference = backend().reference_from(listing).unwrap();

        assert_eq!(reference.id, "solo");
        assert_eq!(reference.locator, "https://api.example.com/stories/solo");
        assert_eq!(
            reference.summary.and_then(|s| s.title),
            Some("Solo".to_string())
        );
    }

    #[test]
    fn test_reference_from_url() {
        let listing: ApiListing =
            serde_json::from_str(r#"{"url": "https://api.example.com/v2/items/duo/"}"#).unwrap();
        let reference = backend().reference_from(listing).unwrap();

        assert_eq!(reference.id, "duo");
        assert_eq!(reference.locator, "https://api.example.com/v2/items/duo/");
    }

    #[test]
    fn test_reference_without_locator() {
        let listing: ApiListing = serde_json::from_str(r#"{"title": "Orphan"}"#).unwrap();
        assert!(backend().reference_from(listing).is_none());
    }

    #[test]
    fn test_reference_prefers_slug_over_numeric_id() {
        let listing: ApiListing =
            serde_json::from_str(r#"{"id": 42, "slug": "solo"}"#).unwrap();
        let reference = backend().reference_from(listing).unwrap();

        assert_eq!(reference.id, "solo");
        assert_eq!(reference.locator, "https://api.example.com/stories/solo");
    }

    #[test]
    fn test_reference_from_numeric_id() {
        let listings: Vec<ApiListing> =
            serde_json::from_str(r#"[{"id": 42}, {"id": "seven"}]"#).unwrap();
        let ids: Vec<String> = listings
            .into_iter()
            .filter_map(|listing| backend().reference_from(listing))
            .map(|reference| reference.id)
            .collect();

        assert_eq!(ids, vec!["42", "seven"]);
    }

    #[test]
    fn test_detail_alternate_names() {
        let detail: ApiDetail =
            serde_json::from_str(r#"{"id": 7, "cover": "https://c/x.jpg", "chapterCount": 12}"#)
                .unwrap();
        assert_eq!(item_key(detail.slug, detail.id), Some("7".to_string()));
        assert_eq!(detail.cover.as_deref(), Some("https://c/x.jpg"));
        assert_eq!(detail.chapter_count_camel, Some(12));
    }

    #[test]
    fn test_detail_with_both_names_decodes() {
        let detail: ApiDetail = serde_json::from_str(
            r#"{"id": 42, "slug": "solo", "thumbnail": "https://c/t.jpg", "cover": "https://c/c.jpg",
                "chapter_count": 3, "chapterCount": 4}"#,
        )
        .unwrap();

        assert_eq!(item_key(detail.slug, detail.id), Some("solo".to_string()));
        assert_eq!(
            detail.thumbnail.or(detail.cover),
            Some("https://c/t.jpg".to_string())
        );
        assert_eq!(detail.chapter_count.or(detail.chapter_count_camel), Some(3));
    }
}
