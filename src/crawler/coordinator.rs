//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the page loop that coordinates a run:
//! - Walking listing pages in ascending order
//! - Extracting each item's metadata and collecting its chapters
//! - Isolating page, item and chapter failures from one another
//! - Handing the finished collection to the writer, then the publisher

use crate::config::Config;
use crate::crawler::collector::ChapterCollector;
use crate::model::{Collection, ItemRecord, ItemReference};
use crate::output::{
    generate_markdown_summary, CollectionWriter, HarvestStats, JsonFileWriter, RunReport,
};
use crate::publish::{build_publisher, PublishStatus, Publisher};
use crate::source::Backend;
use crate::state::StopReason;
use crate::HarvestError;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Inclusive range of listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Page indices in ascending order; empty when `start > end`
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Result of walking a page range
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub collection: Collection,
    pub stats: HarvestStats,
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    backend: Backend,
    collector: ChapterCollector,
    writer: Box<dyn CollectionWriter>,
    publisher: Option<Box<dyn Publisher>>,
}

impl Coordinator {
    /// Creates a coordinator from configuration
    ///
    /// Selects the backend, builds the JSON writer for `output.path` and,
    /// when all publish settings are present, the git publisher.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The backend could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let backend = Backend::from_config(&config)?;
        let writer = Box::new(JsonFileWriter::new(&config.output.path));
        let publisher = build_publisher(&config.publish);

        Ok(Self::with_parts(config, backend, writer, publisher))
    }

    /// Creates a coordinator from explicit parts
    pub fn with_parts(
        config: Config,
        backend: Backend,
        writer: Box<dyn CollectionWriter>,
        publisher: Option<Box<dyn Publisher>>,
    ) -> Self {
        let collector = ChapterCollector::new(
            backend.probe.clone(),
            config.crawler.chapter_bound,
            config.crawler.max_chapters,
        );

        Self {
            config: Arc::new(config),
            backend,
            collector,
            writer,
            publisher,
        }
    }

    /// Drops the publisher so the run ends after writing
    pub fn without_publisher(mut self) -> Self {
        self.publisher = None;
        self
    }

    /// The configured page range
    pub fn page_range(&self) -> PageRange {
        PageRange::new(self.config.crawler.start_page, self.config.crawler.end_page)
    }

    /// Walks `range` and assembles the collection
    ///
    /// Never fails. A page that cannot be listed contributes no items, an
    /// item whose detail cannot be extracted is skipped, and a failed chapter
    /// probe only ends that item's chapter list.
    pub async fn harvest(&self, range: PageRange) -> Harvest {
        let mut harvest = Harvest::default();
        let mut budget = self.config.crawler.max_items;
        let concurrency = self.config.crawler.concurrency.max(1) as usize;

        for page in range.iter() {
            if budget == Some(0) {
                tracing::info!("Item limit reached, stopping before page {}", page);
                break;
            }

            let mut items = self.backend.source.list(page).await;
            tracing::info!("Page {}: {} items", page, items.len());
            harvest.stats.record_page(items.len());

            if let Some(remaining) = budget.as_mut() {
                items.truncate(*remaining);
                *remaining -= items.len();
            }

            let total = items.len();
            let outcomes: Vec<Option<(ItemRecord, StopReason)>> =
                stream::iter(items.iter().enumerate())
                    .map(|(index, item)| self.process_item(page, index + 1, total, item))
                    .buffered(concurrency)
                    .collect()
                    .await;

            for outcome in outcomes {
                match outcome {
                    Some((record, stop)) => {
                        harvest.stats.record_persisted(&record, stop);
                        harvest.collection.push(record);
                    }
                    None => harvest.stats.record_skipped(),
                }
            }
        }

        tracing::info!(
            "Harvest finished: {} items persisted, {} skipped, {} pages",
            harvest.stats.items_persisted,
            harvest.stats.items_skipped,
            harvest.stats.pages_visited
        );

        harvest
    }

    /// Processes a single item
    ///
    /// This method:
    /// 1. Extracts the item's metadata (failure skips the item)
    /// 2. Collects chapters until the first gap
    /// 3. Waits `item-delay-ms` before returning
    async fn process_item(
        &self,
        page: u32,
        position: usize,
        total: usize,
        item: &ItemReference,
    ) -> Option<(ItemRecord, StopReason)> {
        let outcome = match self.backend.extractor.fetch(item).await {
            Ok(detail) => {
                let run = self.collector.collect(item, detail.chapter_count).await;
                tracing::info!(
                    "Page {} [{}/{}] {}: {} chapters ({})",
                    page,
                    position,
                    total,
                    detail.id,
                    run.chapters.len(),
                    run.stop
                );
                Some((ItemRecord::new(detail, run.chapters), run.stop))
            }
            Err(e) => {
                tracing::warn!(
                    "Page {} [{}/{}] skipping {}: {}",
                    page,
                    position,
                    total,
                    item.id,
                    e
                );
                None
            }
        };

        if self.config.crawler.item_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.crawler.item_delay_ms)).await;
        }

        outcome
    }

    /// Runs a complete harvest
    ///
    /// 1. Harvests the configured page range
    /// 2. Writes the collection (failure aborts the run)
    /// 3. Publishes the artifact (failure is reported, not returned)
    /// 4. Writes the markdown summary if `output.summary-path` is set
    pub async fn run(&self) -> Result<RunReport, HarvestError> {
        let started_at = Utc::now();
        let range = self.page_range();
        tracing::info!("Starting harvest of pages {}..={}", range.start, range.end);

        let Harvest { collection, stats } = self.harvest(range).await;

        let output_path = self.writer.write(&collection)?;
        tracing::info!(
            "Wrote {} items to {}",
            collection.len(),
            output_path.display()
        );

        let publish = match &self.publisher {
            None => PublishStatus::Disabled,
            Some(publisher) => match publisher.publish(&output_path).await {
                Ok(outcome) => PublishStatus::Published(outcome),
                Err(e) => {
                    tracing::error!("Publishing failed: {}", e);
                    PublishStatus::Failed(e.to_string())
                }
            },
        };

        let report = RunReport {
            output_path,
            stats,
            publish,
            started_at,
            finished_at: Utc::now(),
        };

        if let Some(summary_path) = &self.config.output.summary_path {
            match generate_markdown_summary(&report, Path::new(summary_path)) {
                Ok(()) => tracing::info!("Summary written to {}", summary_path),
                Err(e) => tracing::warn!("Failed to write summary: {}", e),
            }
        }

        Ok(report)
    }
}

/// Builds a coordinator from `config` and runs it
///
/// # Example
///
/// ```no_run
/// use story_harvest::config::resolve_config;
/// use story_harvest::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, _) = resolve_config(None)?;
/// let report = run_harvest(config).await?;
/// println!("{} items", report.stats.items_persisted);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<RunReport, HarvestError> {
    Coordinator::new(config)?.run().await
}
