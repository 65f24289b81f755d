//! Configuration module for Story-Harvest
//!
//! This module handles loading, overriding, and validating the harvest
//! configuration. Values come from an optional TOML file, then from
//! environment variables; the result is an explicit `Config` handed to the
//! coordinator.
//!
//! # Example
//!
//! ```no_run
//! use story_harvest::config::resolve_config;
//! use std::path::Path;
//!
//! let (config, _hash) = resolve_config(Some(Path::new("harvest.toml"))).unwrap();
//! println!("Pages {}..={}", config.crawler.start_page, config.crawler.end_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ChapterBound, Config, CrawlerConfig, HttpConfig, OutputConfig, PublishConfig, SelectorConfig,
    SelectorList, SourceConfig, SourceKind,
};

// Re-export parser functions
pub use parser::{apply_env_overrides, compute_config_hash, load_config, resolve_config};
