//! Story-Harvest: a paginated catalog harvester
//!
//! This crate walks the listing pages of a story catalog, extracts each
//! story's metadata, probes its numbered chapters until the first gap, and
//! writes the assembled collection to a single JSON document.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod publish;
pub mod source;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Story-Harvest operations
///
/// Only configuration and output failures reach this type during a run;
/// page, item and chapter failures are absorbed by the coordinator.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Publish error: {0}")]
    Publish(#[from] publish::PublishError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Failure of a single unit of remote work (a listing page, a detail page
/// or a chapter probe)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network, DNS, TLS or timeout failure
    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The resource was retrieved but could not be interpreted
    #[error("Extraction failure for {url}: {message}")]
    Extraction { url: String, message: String },
}

impl FetchError {
    /// The URL of the unit that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Extraction { url, .. } => {
                url
            }
        }
    }

    /// Returns true for HTTP 404 and 410, which mean the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404 | 410, .. })
    }

    /// Returns true if the failure happened before any usable response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

/// Result type alias for Story-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, PageRange};
pub use model::{ChapterRecord, Collection, ItemRecord, ItemReference};
pub use state::{ProbeState, StopReason};
