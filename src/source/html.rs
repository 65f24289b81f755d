//! HTML scraping backend
//!
//! Listing, detail and chapter pages are fetched with the shared client and
//! read with CSS selectors from the `[source.selectors]` configuration.
//! Each configured entry is an ordered fallback chain: selectors are tried
//! in turn and the first one that yields a value is used.
//! Parsing is synchronous and kept apart from fetching so that no parsed
//! document is held across an await point.

use crate::config::{SelectorConfig, SelectorList, SourceConfig};
use crate::model::{ExtractedFields, ItemDetail, ItemReference, ItemSummary};
use crate::source::fetcher::fetch_text;
use crate::source::{ChapterProbe, DetailExtractor, ItemSource};
use crate::url::{chapter_url, derive_item_id, is_decorative_image, listing_url, resolve_link};
use crate::{ConfigError, FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Image attributes in the order they are tried (lazy-loading first)
const IMAGE_ATTRIBUTES: [&str; 3] = ["data-src", "src", "data-original"];

/// Parsed form of `SelectorConfig`, fallbacks in configured order
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub item_link: Vec<Selector>,
    pub title: Vec<Selector>,
    pub author: Vec<Selector>,
    pub description: Vec<Selector>,
    pub thumbnail: Vec<Selector>,
    pub chapter_image: Vec<Selector>,
    pub chapter_list: Vec<Selector>,
}

impl CompiledSelectors {
    /// Parses every configured selector
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item_link: compile(&config.item_link)?,
            title: compile(&config.title)?,
            author: compile(&config.author)?,
            description: compile(&config.description)?,
            thumbnail: compile(&config.thumbnail)?,
            chapter_image: compile(&config.chapter_image)?,
            chapter_list: compile(&config.chapter_list)?,
        })
    }
}

fn compile(list: &SelectorList) -> Result<Vec<Selector>, ConfigError> {
    list.iter()
        .map(|selector| {
            Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
                selector: selector.to_string(),
                message: format!("{:?}", e),
            })
        })
        .collect()
}

/// Backend that scrapes catalog pages
pub struct HtmlBackend {
    client: Client,
    list_url: String,
    chapter_url: String,
    empty_markers: Vec<String>,
    selectors: CompiledSelectors,
}

impl HtmlBackend {
    /// Creates the backend from the source configuration
    pub fn new(client: Client, config: &SourceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            list_url: config.list_url.clone(),
            chapter_url: config.chapter_url.clone(),
            empty_markers: config.empty_markers.clone(),
            selectors: CompiledSelectors::compile(&config.selectors)?,
        })
    }
}

#[async_trait]
impl ItemSource for HtmlBackend {
    async fn try_list(&self, page: u32) -> FetchResult<Vec<ItemReference>> {
        let url = listing_url(&self.list_url, page);
        let body = fetch_text(&self.client, &url).await?;
        let base = parse_base(&url)?;
        Ok(parse_listing(&body, &base, &self.selectors))
    }
}

#[async_trait]
impl DetailExtractor for HtmlBackend {
    async fn fetch(&self, item: &ItemReference) -> FetchResult<ItemDetail> {
        let body = fetch_text(&self.client, &item.locator).await?;
        let base = parse_base(&item.locator)?;
        Ok(parse_detail(&body, &base, &self.selectors, item))
    }
}

#[async_trait]
impl ChapterProbe for HtmlBackend {
    async fn probe(&self, item: &ItemReference, index: u32) -> FetchResult<Vec<String>> {
        let url = chapter_url(&self.chapter_url, &item.locator, index);
        let body = fetch_text(&self.client, &url).await?;

        if let Some(marker) = self.empty_markers.iter().find(|m| body.contains(m.as_str())) {
            tracing::debug!("{} carries the '{}' marker", url, marker);
            return Ok(Vec::new());
        }

        let base = parse_base(&url)?;
        Ok(parse_chapter_images(&body, &base, &self.selectors.chapter_image))
    }
}

fn parse_base(url: &str) -> FetchResult<Url> {
    Url::parse(url).map_err(|e| FetchError::Extraction {
        url: url.to_string(),
        message: format!("Invalid URL: {}", e),
    })
}

/// Extracts item references from a listing page
///
/// Links are resolved against `base_url`; the first occurrence of each
/// locator on the page wins. The anchor's `title` attribute (or its text)
/// and a nested image become the listing summary.
pub fn parse_listing(html: &str, base_url: &Url, selectors: &CompiledSelectors) -> Vec<ItemReference> {
    let document = Html::parse_document(html);

    selectors
        .item_link
        .iter()
        .map(|selector| listing_items(&document, base_url, selector))
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

fn listing_items(document: &Html, base_url: &Url, selector: &Selector) -> Vec<ItemReference> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for anchor in document.select(selector) {
        let Some(locator) = anchor.value().attr("href").and_then(|h| resolve_link(h, base_url)) else {
            continue;
        };

        if !seen.insert(locator.clone()) {
            continue;
        }

        let title = anchor
            .value()
            .attr("title")
            .map(str::to_string)
            .or_else(|| non_empty(element_text(&anchor)));
        let thumbnail = first_image(&anchor, base_url);

        let mut reference = ItemReference::from_locator(locator);
        if title.is_some() || thumbnail.is_some() {
            reference = reference.with_summary(ItemSummary {
                title,
                thumbnail,
                ..Default::default()
            });
        }
        items.push(reference);
    }

    items
}

/// Extracts item metadata from a detail page
pub fn parse_detail(
    html: &str,
    base_url: &Url,
    selectors: &CompiledSelectors,
    item: &ItemReference,
) -> ItemDetail {
    let document = Html::parse_document(html);

    let text_of = |chain: &[Selector]| {
        chain.iter().find_map(|selector| {
            document
                .select(selector)
                .next()
                .and_then(|element| non_empty(element_text(&element)))
        })
    };

    let thumbnail = selectors.thumbnail.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .and_then(|img| image_source(&img, base_url))
    });

    let chapter_count = selectors
        .chapter_list
        .iter()
        .find_map(|selector| count_chapters(&document, selector));

    let fields = ExtractedFields {
        id: derive_item_id(&item.locator),
        title: text_of(&selectors.title),
        author: text_of(&selectors.author),
        description: text_of(&selectors.description),
        thumbnail,
        chapter_count,
    };

    ItemDetail::from_fields(item, fields)
}

/// Extracts chapter image URLs in page order
///
/// Relative sources are resolved, non-HTTP(S) sources dropped, and logos,
/// favicons and icons filtered out. The first selector in `chain` that
/// leaves any image decides the result.
pub fn parse_chapter_images(html: &str, base_url: &Url, chain: &[Selector]) -> Vec<String> {
    let document = Html::parse_document(html);

    chain
        .iter()
        .map(|selector| {
            document
                .select(selector)
                .filter_map(|img| image_source(&img, base_url))
                .filter(|src| !is_decorative_image(src))
                .collect::<Vec<_>>()
        })
        .find(|images| !images.is_empty())
        .unwrap_or_default()
}

/// Learns the chapter count from the detail page's chapter list
///
/// Uses the highest "chapter N" number in the link texts; falls back to the
/// number of links when none of them carries a number.
fn count_chapters(document: &Html, selector: &Selector) -> Option<u32> {
    let texts: Vec<String> = document
        .select(selector)
        .map(|link| element_text(&link).to_lowercase())
        .collect();

    if texts.is_empty() {
        return None;
    }

    let numbered = texts
        .iter()
        .filter_map(|text| text.strip_prefix("chapter"))
        .filter_map(|rest| {
            rest.trim()
                .split(|c: char| !c.is_ascii_digit())
                .next()
                .and_then(|digits| digits.parse::<u32>().ok())
        })
        .max();

    numbered.or(u32::try_from(texts.len()).ok())
}

fn image_source(img: &ElementRef<'_>, base_url: &Url) -> Option<String> {
    IMAGE_ATTRIBUTES
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .find_map(|src| resolve_link(src, base_url))
}

fn first_image(anchor: &ElementRef<'_>, base_url: &Url) -> Option<String> {
    let img = Selector::parse("img").ok()?;
    anchor
        .select(&img)
        .next()
        .and_then(|element| image_source(&element, base_url))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
