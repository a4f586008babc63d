//! Events emitted during simulation ticks
//!
//! Every tick produces one aggregated event list: background system effects,
//! process lifecycle transitions, and executed decisions all land here. The
//! host consumes these alongside state snapshots.

use crate::core::types::{ItemId, ProcessId, ProcessKind, ResourceKind, Tick};
use serde::{Deserialize, Serialize};

/// A single observable occurrence within a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A chosen action was executed and its deltas applied
    ActionExecuted {
        action_id: String,
        description: String,
    },
    /// An action's delta batch failed preconditions and was rolled back whole
    ActionFailed { action_id: String, reason: String },
    /// A multi-tick process was started
    ProcessStarted {
        id: ProcessId,
        kind: ProcessKind,
        target: ItemId,
    },
    /// A process ran to completion and its outputs were granted
    ProcessCompleted {
        id: ProcessId,
        kind: ProcessKind,
        target: ItemId,
        outputs: Vec<(ItemId, u32)>,
    },
    /// A process was cancelled (starvation or explicit), distinct from completion
    ProcessCancelled {
        id: ProcessId,
        kind: ProcessKind,
        target: ItemId,
        reason: String,
    },
    /// A tracked resource dropped under its configured shortage threshold
    Shortage { resource: ResourceKind, level: f64 },
    /// The decision engine entered emergency mode this tick
    Emergency { reason: String },
    /// A milestone was completed
    MilestoneReached { milestone: String },
    /// The agent gained a level
    LevelUp { level: u32 },
    /// A GameSystem failed its background tick and was skipped for this tick
    SystemSkipped { system: String, detail: String },
    /// Terminal event for the run
    RunEnded { tick: Tick, reason: String },
}
