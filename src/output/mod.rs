//! Output module for persisting the collection and reporting on runs
//!
//! This module handles:
//! - Writing the collection as a JSON document
//! - Accumulating and printing run statistics
//! - Generating markdown summaries of runs

mod json;
mod markdown;
pub mod stats;
mod traits;

pub use json::{format_collection, read_collection, JsonFileWriter};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{
    print_report, print_statistics, CollectionStatistics, HarvestStats, RunReport,
};
pub use traits::{CollectionWriter, OutputError, OutputResult};
