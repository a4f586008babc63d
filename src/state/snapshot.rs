//! State snapshots - the versioned wire form of `GameState`
//!
//! Snapshots cross the host boundary as explicit, ordered key/value pairs:
//! every keyed collection is sorted before serialization so no key identity
//! is lost and two snapshots of equal states serialize identically.

use crate::core::error::{CroftError, Result};
use crate::core::types::{ItemId, Screen, SimTime, Tick};
use crate::state::process::ActiveProcess;
use crate::state::progression::{PlotState, Progression};
use crate::state::resources::ResourcePools;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// A complete, serializable copy of simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    pub tick: Tick,
    pub time: SimTime,
    pub gold: f64,
    pub water: f64,
    pub energy: f64,
    /// Item counts as sorted pairs (lossless keyed representation)
    pub items: Vec<(ItemId, u32)>,
    pub unlocked: Vec<ItemId>,
    pub unlocked_areas: Vec<Screen>,
    pub milestones: Vec<String>,
    pub level: u32,
    pub xp: u32,
    pub plots: Vec<PlotState>,
    /// All active processes, sorted by id
    pub processes: Vec<ActiveProcess>,
    pub screen: Screen,
    pub last_decision_time: SimTime,
    pub next_process_id: u64,
}

impl StateSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let mut items: Vec<(ItemId, u32)> = state
            .resources
            .items
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        items.sort();

        let mut unlocked: Vec<ItemId> = state.progression.unlocked.iter().cloned().collect();
        unlocked.sort();

        let mut unlocked_areas: Vec<Screen> =
            state.progression.unlocked_areas.iter().copied().collect();
        unlocked_areas.sort();

        let mut milestones: Vec<String> = state.progression.milestones.iter().cloned().collect();
        milestones.sort();

        let mut processes: Vec<ActiveProcess> = state.processes.iter_all().cloned().collect();
        processes.sort_by_key(|p| p.id);

        Self {
            version: SNAPSHOT_VERSION,
            tick: state.tick,
            time: state.time,
            gold: state.resources.gold,
            water: state.resources.water,
            energy: state.resources.energy,
            items,
            unlocked,
            unlocked_areas,
            milestones,
            level: state.progression.level,
            xp: state.progression.xp,
            plots: state.progression.plots.clone(),
            processes,
            screen: state.screen,
            last_decision_time: state.last_decision_time,
            next_process_id: state.next_process_id,
        }
    }

    /// Rebuild a `GameState` from a snapshot
    pub fn restore(&self) -> Result<GameState> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CroftError::SnapshotError(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }

        let mut state = GameState {
            time: self.time,
            tick: self.tick,
            resources: ResourcePools {
                gold: self.gold,
                water: self.water,
                energy: self.energy,
                items: self.items.iter().cloned().collect(),
            },
            progression: Progression {
                unlocked: self.unlocked.iter().cloned().collect(),
                unlocked_areas: self.unlocked_areas.iter().copied().collect(),
                milestones: self.milestones.iter().cloned().collect(),
                level: self.level,
                xp: self.xp,
                plots: self.plots.clone(),
            },
            processes: Default::default(),
            screen: self.screen,
            last_decision_time: self.last_decision_time,
            next_process_id: self.next_process_id,
        };
        for process in &self.processes {
            state.processes.push(process.clone());
        }
        Ok(state)
    }
}
