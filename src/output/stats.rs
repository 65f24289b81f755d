//! Run statistics and collection statistics
//!
//! `HarvestStats` is accumulated by the coordinator while a run progresses.
//! `CollectionStatistics` is computed from a written collection and backs
//! the `--stats` command.

use crate::model::{ItemRecord, UNKNOWN};
use crate::publish::PublishStatus;
use crate::state::StopReason;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Counters for one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Listing pages requested
    pub pages_visited: u64,

    /// Listing pages that yielded no items (empty or failed)
    pub empty_pages: u64,

    /// Item references produced by listing pages
    pub items_seen: u64,

    /// Items that made it into the collection
    pub items_persisted: u64,

    /// Items dropped because their detail could not be extracted
    pub items_skipped: u64,

    /// Chapters across all persisted items
    pub chapters_collected: u64,

    /// Images across all persisted items
    pub images_collected: u64,

    /// How each persisted item's chapter loop ended
    pub stop_reasons: BTreeMap<StopReason, u64>,
}

impl HarvestStats {
    /// Records a visited listing page
    pub fn record_page(&mut self, item_count: usize) {
        self.pages_visited += 1;
        if item_count == 0 {
            self.empty_pages += 1;
        }
        self.items_seen += item_count as u64;
    }

    /// Records an item that was added to the collection
    pub fn record_persisted(&mut self, record: &ItemRecord, stop: StopReason) {
        self.items_persisted += 1;
        self.chapters_collected += record.chapters.len() as u64;
        self.images_collected += record.image_count() as u64;
        *self.stop_reasons.entry(stop).or_insert(0) += 1;
    }

    /// Records an item that was skipped
    pub fn record_skipped(&mut self) {
        self.items_skipped += 1;
    }

    /// Count of persisted items whose chapter loop ended for `reason`
    pub fn stopped_by(&self, reason: StopReason) -> u64 {
        self.stop_reasons.get(&reason).copied().unwrap_or(0)
    }
}

/// Everything a finished run reports back
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Where the collection was written
    pub output_path: PathBuf,

    pub stats: HarvestStats,

    pub publish: PublishStatus,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Statistics computed from a written collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStatistics {
    pub items: u64,
    pub chapters: u64,
    pub images: u64,

    /// Items persisted with an empty chapter list
    pub items_without_chapters: u64,

    /// Items with at least one metadata field set to the unknown sentinel
    pub items_with_unknown_fields: u64,

    /// Item with the most chapters, as (id, chapter count)
    pub longest_item: Option<(String, u64)>,
}

impl CollectionStatistics {
    /// Computes statistics for a collection
    pub fn from_collection(collection: &[ItemRecord]) -> Self {
        let mut stats = Self::default();

        for record in collection {
            let chapters = record.chapters.len() as u64;

            stats.items += 1;
            stats.chapters += chapters;
            stats.images += record.image_count() as u64;

            if chapters == 0 {
                stats.items_without_chapters += 1;
            }

            let fields = [
                &record.title,
                &record.author,
                &record.description,
                &record.thumbnail,
            ];
            if fields.iter().any(|field| field.as_str() == UNKNOWN) {
                stats.items_with_unknown_fields += 1;
            }

            let longer = match &stats.longest_item {
                Some((_, best)) => chapters > *best,
                None => true,
            };
            if longer {
                stats.longest_item = Some((record.id.clone(), chapters));
            }
        }

        stats
    }

    /// Average chapters per item
    pub fn average_chapters(&self) -> f64 {
        if self.items == 0 {
            0.0
        } else {
            self.chapters as f64 / self.items as f64
        }
    }
}

/// Prints the outcome of a run to stdout
///
/// The publish result is printed on its own line so it is not mistaken for
/// the outcome of the harvest itself.
pub fn print_report(report: &RunReport) {
    let stats = &report.stats;

    println!("=== Harvest Complete ===\n");
    println!("Output: {}", report.output_path.display());
    println!("Duration: {}s", report.duration_seconds());
    println!();

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Empty or failed: {}", stats.empty_pages);
    println!();

    println!("Items:");
    println!("  Seen: {}", stats.items_seen);
    println!("  Persisted: {}", stats.items_persisted);
    println!("  Skipped: {}", stats.items_skipped);
    println!("  Chapters: {}", stats.chapters_collected);
    println!("  Images: {}", stats.images_collected);
    println!();

    println!("Chapter loops stopped by:");
    for reason in StopReason::all() {
        println!("  {}: {}", reason, stats.stopped_by(reason));
    }
    println!();

    println!("Publish: {}", report.publish);
}

/// Prints collection statistics to stdout
pub fn print_statistics(stats: &CollectionStatistics) {
    println!("=== Collection Statistics ===\n");

    println!("Overview:");
    println!("  Items: {}", stats.items);
    println!("  Chapters: {}", stats.chapters);
    println!("  Images: {}", stats.images);
    println!("  Average chapters per item: {:.1}", stats.average_chapters());
    println!();

    println!("Gaps:");
    println!("  Items without chapters: {}", stats.items_without_chapters);
    println!(
        "  Items with unknown fields: {}",
        stats.items_with_unknown_fields
    );

    if let Some((id, chapters)) = &stats.longest_item {
        println!();
        println!("Longest item: {} ({} chapters)", id, chapters);
    }
}
