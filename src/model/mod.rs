//! Data model for a harvest run
//!
//! - `ItemReference`: what a listing page yields for one story
//! - `ItemDetail`: what the detail extractor returns for one story
//! - `ItemRecord` / `ChapterRecord`: the persisted shape
//! - `Collection`: the ordered result of one run

mod chapter;
mod item;

pub use chapter::ChapterRecord;
pub use item::{or_unknown, ExtractedFields, ItemDetail, ItemRecord, ItemReference, ItemSummary, UNKNOWN};

/// Ordered sequence of item records in crawl completion order
pub type Collection = Vec<ItemRecord>;
