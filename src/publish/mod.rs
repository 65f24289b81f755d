//! Publishing the written collection
//!
//! After the collection is written, it is committed and pushed to a remote
//! git repository. Publishing is optional: it is skipped when credentials
//! are missing, and a failure never invalidates the local artifact.

mod git;

pub use git::{is_nothing_to_commit, redact, GitPublisher};

use crate::config::PublishConfig;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while publishing
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Missing publish settings: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("Failed to run git {step}: {message}")]
    Spawn { step: &'static str, message: String },

    #[error("git {step} failed: {message}")]
    CommandFailed { step: &'static str, message: String },

    #[error("Cannot resolve {}: {message}", .path.display())]
    Resolve { path: PathBuf, message: String },

    #[error("{} is outside the publish working copy {}", .artifact.display(), .workdir.display())]
    OutsideWorkdir { artifact: PathBuf, workdir: PathBuf },
}

/// What a successful publish did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new commit was created and pushed
    Pushed,

    /// The artifact was unchanged; the branch was pushed without a new commit
    NothingToCommit,
}

/// Publish result as reported at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishStatus {
    /// Publishing was not configured or was turned off
    Disabled,

    Published(PublishOutcome),

    /// Publishing failed; the message is already redacted
    Failed(String),
}

impl PublishStatus {
    /// Returns true unless publishing was attempted and failed
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "skipped (not configured)"),
            Self::Published(PublishOutcome::Pushed) => write!(f, "pushed"),
            Self::Published(PublishOutcome::NothingToCommit) => {
                write!(f, "pushed (no changes to commit)")
            }
            Self::Failed(message) => write!(f, "FAILED: {}", message),
        }
    }
}

/// Pushes a written artifact somewhere
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes the artifact at `artifact`
    async fn publish(&self, artifact: &Path) -> Result<PublishOutcome, PublishError>;
}

/// Builds the git publisher if every required setting is present
///
/// # Returns
///
/// * `Some(publisher)` - Publishing is configured
/// * `None` - A required setting is missing; the missing names are logged
pub fn build_publisher(config: &PublishConfig) -> Option<Box<dyn Publisher>> {
    match GitPublisher::from_config(config) {
        Ok(publisher) => Some(Box::new(publisher)),
        Err(e) => {
            tracing::warn!("Publishing disabled: {}", e);
            None
        }
    }
}
