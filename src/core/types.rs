//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a content-table entry (item, seed, recipe, expedition, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Simulated time in seconds since run start
pub type SimTime = f64;

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Number of simulated seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Identifier for an active process, allocated sequentially per run
/// so two identically-seeded runs allocate identical ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub u64);

/// Game screens / areas the agent can act in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Screen {
    Farm,
    Town,
    Forge,
    Mine,
    Adventure,
    Tower,
    Helpers,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Farm,
        Screen::Town,
        Screen::Forge,
        Screen::Mine,
        Screen::Adventure,
        Screen::Tower,
        Screen::Helpers,
    ];
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Scalar resource pools tracked on the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Gold,
    Water,
    Energy,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Kinds of multi-tick processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProcessKind {
    Growth,
    Craft,
    Mine,
    Catch,
    Adventure,
    Train,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 6] = [
        ProcessKind::Growth,
        ProcessKind::Craft,
        ProcessKind::Mine,
        ProcessKind::Catch,
        ProcessKind::Adventure,
        ProcessKind::Train,
    ];
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Broad action categories used for persona score biasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Farming,
    Commerce,
    Crafting,
    Mining,
    Adventuring,
    Training,
    Helpers,
    Maintenance,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 8] = [
        ActionCategory::Farming,
        ActionCategory::Commerce,
        ActionCategory::Crafting,
        ActionCategory::Mining,
        ActionCategory::Adventuring,
        ActionCategory::Training,
        ActionCategory::Helpers,
        ActionCategory::Maintenance,
    ];
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
