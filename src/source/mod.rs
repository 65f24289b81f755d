//! Catalog backends
//!
//! The coordinator only talks to three capabilities:
//! - `ItemSource`: listing page index -> item references
//! - `DetailExtractor`: item reference -> item metadata
//! - `ChapterProbe`: (item, chapter index) -> chapter images
//!
//! Two backends implement all three: `HtmlBackend` scrapes pages with CSS
//! selectors, `ApiBackend` reads a JSON catalog API. The backend is chosen
//! once, in [`Backend::from_config`].

mod api;
mod fetcher;
mod html;

pub use api::ApiBackend;
pub use fetcher::{build_http_client, fetch_json, fetch_text};
pub use html::{parse_chapter_images, parse_detail, parse_listing, CompiledSelectors, HtmlBackend};

use crate::config::{Config, SourceKind};
use crate::model::{ItemDetail, ItemReference};
use crate::{ConfigError, FetchResult, HarvestError};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the item references of one listing page
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Lists a page, reporting why it failed
    async fn try_list(&self, page: u32) -> FetchResult<Vec<ItemReference>>;

    /// Lists a page; any failure yields an empty list
    ///
    /// Callers cannot tell an empty page from a failed one. The cause is
    /// logged here.
    async fn list(&self, page: u32) -> Vec<ItemReference> {
        match self.try_list(page).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Listing page {} failed: {}", page, e);
                Vec::new()
            }
        }
    }
}

/// Extracts the metadata of one item
#[async_trait]
pub trait DetailExtractor: Send + Sync {
    /// Fetches the item's detail resource
    ///
    /// Missing optional fields are filled with the `UNKNOWN` sentinel; an
    /// error means the resource itself could not be retrieved or parsed.
    async fn fetch(&self, item: &ItemReference) -> FetchResult<ItemDetail>;
}

/// Probes one numbered chapter of an item
#[async_trait]
pub trait ChapterProbe: Send + Sync {
    /// Returns the chapter's image URLs
    ///
    /// `Ok(vec![])` means the chapter does not exist (or is not published).
    async fn probe(&self, item: &ItemReference, index: u32) -> FetchResult<Vec<String>>;
}

/// The three capabilities the coordinator needs, behind trait objects
#[derive(Clone)]
pub struct Backend {
    pub source: Arc<dyn ItemSource>,
    pub extractor: Arc<dyn DetailExtractor>,
    pub probe: Arc<dyn ChapterProbe>,
}

impl Backend {
    /// Uses one value for all three capabilities
    pub fn from_shared<B>(backend: B) -> Self
    where
        B: ItemSource + DetailExtractor + ChapterProbe + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            source: backend.clone(),
            extractor: backend.clone(),
            probe: backend,
        }
    }

    /// Builds the backend selected by `source.kind`
    ///
    /// # Returns
    ///
    /// * `Ok(Backend)` - Backend ready to use
    /// * `Err(HarvestError)` - Invalid selectors, API base or HTTP settings
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let source = &config.source;
        let client = build_http_client(&config.http, source.api_key.as_deref())?;

        let backend = match source.kind {
            SourceKind::Html => {
                tracing::info!("Using html backend ({})", source.list_url);
                Self::from_shared(HtmlBackend::new(client, source)?)
            }
            SourceKind::Api => {
                let base = source.api_base.as_deref().ok_or_else(|| {
                    ConfigError::Validation("api-base is required for the api source".to_string())
                })?;
                tracing::info!("Using api backend ({})", base);
                Self::from_shared(ApiBackend::new(client, base)?)
            }
        };

        Ok(backend)
    }
}
