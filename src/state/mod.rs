//! State module for tracking chapter probing
//!
//! # Components
//!
//! - `ProbeState`: where the chapter probe loop of one item currently is
//! - `StopReason`: why a probe loop ended
//! - `ProbeOutcome`: what a single probe observed

mod probe_state;

pub use probe_state::{ProbeOutcome, ProbeState, StopReason};
