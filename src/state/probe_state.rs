//! Probe state definitions for the chapter termination heuristic
//!
//! Chapter existence cannot be queried directly; it is inferred from whether
//! probing index `i` yields images. The first empty or failed probe ends the
//! sequence, so a transient network error and a missing chapter stop the
//! loop the same way. `StopReason` keeps the two apart in logs and stats.

use std::fmt;

/// Why a chapter probe loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StopReason {
    /// The probe succeeded structurally but found no images (or the chapter
    /// is reported as missing)
    EmptyResult,

    /// The probe could not fetch or interpret the chapter
    TransportFailure,

    /// The configured cap or the known chapter count was reached
    BoundReached,
}

impl StopReason {
    /// Stable identifier used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyResult => "empty_result",
            Self::TransportFailure => "transport_failure",
            Self::BoundReached => "bound_reached",
        }
    }

    /// Returns all stop reasons
    pub fn all() -> [Self; 3] {
        [Self::EmptyResult, Self::TransportFailure, Self::BoundReached]
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a single probe observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The chapter exists and has this many images (always > 0)
    Found(usize),

    /// No images, or the chapter does not exist
    Empty,

    /// Transport or parse failure
    Failed,
}

impl ProbeOutcome {
    /// Classifies an image count
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::Empty
        } else {
            Self::Found(count)
        }
    }
}

/// Position of a chapter probe loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// About to probe this 1-based chapter index
    Probing(u32),

    /// The loop has ended
    Stopped(StopReason),
}

impl ProbeState {
    /// The state every probe loop starts in
    pub fn start() -> Self {
        Self::Probing(1)
    }

    /// Returns true once the loop has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// Returns the index to probe next, if still probing within `bound`
    ///
    /// An index above `bound` moves the state to `Stopped(BoundReached)`
    /// without probing.
    pub fn next_index(&mut self, bound: u32) -> Option<u32> {
        match *self {
            Self::Probing(index) if index > bound => {
                *self = Self::Stopped(StopReason::BoundReached);
                None
            }
            Self::Probing(index) => Some(index),
            Self::Stopped(_) => None,
        }
    }

    /// Applies the outcome of probing the current index
    ///
    /// `Found` advances to the next index; `Empty` and `Failed` stop
    /// immediately. There is no retry and no skipping ahead.
    pub fn step(self, outcome: ProbeOutcome) -> Self {
        match self {
            Self::Probing(index) => match outcome {
                ProbeOutcome::Found(_) => match index.checked_add(1) {
                    Some(next) => Self::Probing(next),
                    None => Self::Stopped(StopReason::BoundReached),
                },
                ProbeOutcome::Empty => Self::Stopped(StopReason::EmptyResult),
                ProbeOutcome::Failed => Self::Stopped(StopReason::TransportFailure),
            },
            stopped @ Self::Stopped(_) => stopped,
        }
    }

    /// The reason the loop stopped, if it has
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Stopped(reason) => Some(*reason),
            Self::Probing(_) => None,
        }
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probing(index) => write!(f, "probing({})", index),
            Self::Stopped(reason) => write!(f, "stopped({})", reason),
        }
    }
}
