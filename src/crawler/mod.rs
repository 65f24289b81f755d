//! Crawler module for harvesting a paginated catalog
//!
//! This module contains the core harvesting logic, including:
//! - The chapter collector and its termination heuristic
//! - Overall run coordination (pages, items, write, publish)

mod collector;
mod coordinator;

pub use collector::{ChapterCollector, ChapterRun};
pub use coordinator::{run_harvest, Coordinator, Harvest, PageRange};
