//! Chapter collector - the termination heuristic
//!
//! Chapters are probed at indices 1, 2, 3, ... and appended while probes
//! return images. The first empty result, missing chapter or failed probe
//! ends the sequence. The loop is driven by `ProbeState`, so the reason it
//! stopped is always known.

use crate::config::ChapterBound;
use crate::model::{ChapterRecord, ItemReference};
use crate::source::ChapterProbe;
use crate::state::{ProbeOutcome, ProbeState, StopReason};
use std::sync::Arc;

/// Chapters collected for one item and why collection stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRun {
    pub chapters: Vec<ChapterRecord>,
    pub stop: StopReason,
}

/// Runs the chapter probe loop for items
#[derive(Clone)]
pub struct ChapterCollector {
    probe: Arc<dyn ChapterProbe>,
    strategy: ChapterBound,
    max_chapters: u32,
}

impl ChapterCollector {
    /// Creates a collector
    ///
    /// # Arguments
    ///
    /// * `probe` - The chapter probe of the active backend
    /// * `strategy` - Cap-only, or known chapter count when available
    /// * `max_chapters` - Hard cap applied in both strategies
    pub fn new(probe: Arc<dyn ChapterProbe>, strategy: ChapterBound, max_chapters: u32) -> Self {
        Self {
            probe,
            strategy,
            max_chapters,
        }
    }

    /// Highest chapter index that may be probed for an item
    pub fn bound_for(&self, known_count: Option<u32>) -> u32 {
        match (self.strategy, known_count) {
            (ChapterBound::KnownCount, Some(count)) => count.min(self.max_chapters),
            _ => self.max_chapters,
        }
    }

    /// Probes chapters of `item` from index 1 until the first gap
    ///
    /// Never fails: a failed probe at index k keeps chapters [1, k) and
    /// records `StopReason::TransportFailure`.
    pub async fn collect(&self, item: &ItemReference, known_count: Option<u32>) -> ChapterRun {
        let bound = self.bound_for(known_count);
        let mut state = ProbeState::start();
        let mut chapters = Vec::new();

        while let Some(index) = state.next_index(bound) {
            let outcome = match self.probe.probe(item, index).await {
                Ok(images) => {
                    let outcome = ProbeOutcome::from_count(images.len());
                    if let Some(chapter) = ChapterRecord::numbered(index, images) {
                        tracing::debug!(
                            "{} - {}: {} images",
                            item.id,
                            chapter.name,
                            chapter.images.len()
                        );
                        chapters.push(chapter);
                    }
                    outcome
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!("{} - chapter {} does not exist", item.id, index);
                    ProbeOutcome::Empty
                }
                Err(e) => {
                    tracing::warn!(
                        "{} - chapter {} probe failed, keeping {} chapters: {}",
                        item.id,
                        index,
                        chapters.len(),
                        e
                    );
                    ProbeOutcome::Failed
                }
            };

            state = state.step(outcome);
        }

        let stop = state.stop_reason().unwrap_or(StopReason::BoundReached);
        ChapterRun { chapters, stop }
    }
}
