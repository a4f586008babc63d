//! Per-kind process behavior
//!
//! A handler decides whether a process may start, how much working time it
//! accrues over a tick window, and what happens when it completes or is
//! cancelled. Handlers never remove processes themselves; the manager owns
//! the lifecycle.

use crate::content::table::{ContentTable, ItemCategory, ResourceCost};
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::{ItemId, ProcessKind, SimTime};
use crate::state::process::{ActiveProcess, ProcessDetail};
use crate::state::progression::PlotState;
use crate::state::GameState;

/// Kind-specific process behavior
pub trait ProcessHandler: Send + Sync {
    fn kind(&self) -> ProcessKind;

    /// Kind-specific start checks, beyond the concurrency limit
    fn can_start(
        &self,
        state: &GameState,
        detail: &ProcessDetail,
        content: &ContentTable,
    ) -> Result<()>;

    /// Working seconds accrued over the window `[window_start, window_start + dt]`
    fn accrue(
        &self,
        process: &ActiveProcess,
        state: &GameState,
        dt: f64,
        window_start: SimTime,
    ) -> f64 {
        let _ = (process, state, window_start);
        dt
    }

    /// Apply completion effects; returns the outputs granted.
    ///
    /// An error here means the process starved (e.g. inputs were sold out
    /// from under it) and the manager cancels it instead.
    fn complete(
        &self,
        process: &ActiveProcess,
        state: &mut GameState,
        content: &ContentTable,
        events: &mut Vec<GameEvent>,
    ) -> Result<Vec<(ItemId, u32)>>;

    /// Cleanup when the process is cancelled rather than completed
    fn on_cancel(&self, process: &ActiveProcess, state: &mut GameState) {
        let _ = (process, state);
    }
}

fn entry_with_duration<'a>(
    content: &'a ContentTable,
    id: &ItemId,
    kind: ProcessKind,
) -> Result<&'a crate::content::table::ContentEntry> {
    let entry = content
        .get(id)
        .ok_or_else(|| CroftError::UnknownItem(id.clone()))?;
    if entry.duration.is_none() {
        return Err(CroftError::ProcessRejected {
            kind,
            reason: format!("'{}' is not a process-backed entry", id),
        });
    }
    Ok(entry)
}

/// Crop growth on a farm plot. Progress accrues only while the plot is
/// watered; an unwatered plot stalls rather than failing.
pub struct GrowthHandler;

impl ProcessHandler for GrowthHandler {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Growth
    }

    fn can_start(
        &self,
        state: &GameState,
        detail: &ProcessDetail,
        content: &ContentTable,
    ) -> Result<()> {
        let ProcessDetail::Growth { plot, seed, .. } = detail else {
            return Err(CroftError::ProcessRejected {
                kind: self.kind(),
                reason: "wrong detail kind".into(),
            });
        };
        if *plot >= state.progression.plots.len() {
            return Err(CroftError::ProcessRejected {
                kind: self.kind(),
                reason: format!("no plot {}", plot),
            });
        }
        if state.processes.growth_on_plot(*plot).is_some() {
            return Err(CroftError::ProcessRejected {
                kind: self.kind(),
                reason: format!("plot {} already growing", plot),
            });
        }
        let entry = entry_with_duration(content, seed, self.kind())?;
        if entry.category != ItemCategory::Seed {
            return Err(CroftError::ProcessRejected {
                kind: self.kind(),
                reason: format!("'{}' is not a seed", seed),
            });
        }
        Ok(())
    }

    fn accrue(
        &self,
        process: &ActiveProcess,
        _state: &GameState,
        dt: f64,
        window_start: SimTime,
    ) -> f64 {
        match &process.detail {
            // Only the watered portion of the window counts
            ProcessDetail::Growth { watered_until, .. } => {
                (watered_until - window_start).clamp(0.0, dt)
            }
            _ => dt,
        }
    }

    fn complete(
        &self,
        process: &ActiveProcess,
        state: &mut GameState,
        content: &ContentTable,
        events: &mut Vec<GameEvent>,
    ) -> Result<Vec<(ItemId, u32)>> {
        let ProcessDetail::Growth { plot, seed, .. } = &process.detail else {
            return Err(CroftError::ProcessRejected {
                kind: self.kind(),
                reason: "wrong detail kind".into(),
            });
        };
        let entry = content
            .get(seed)
            .ok_or_else(|| CroftError::UnknownItem(seed.clone()))?;
        let (crop, count) = entry.yields.first().cloned().ok_or_else(|| {
            CroftError::ProcessRejected {
                kind: self.kind(),
                reason: format!("seed '{}' yields nothing", seed),
            }
        })?;
        // The crop waits on the plot until harvested
        if let Some(slot) = state.progression.plots.get_mut(*plot) {
            *slot = PlotState::Ready {
                crop: crop.clone(),
                count,
            };
        }
        state.award_xp(entry.xp, events);
        Ok(vec![(crop, count)])
    }

    fn on_cancel(&self, process: &ActiveProcess, state: &mut GameState) {
        if let ProcessDetail::Growth { plot, .. } = &process.detail {
            if let Some(slot) = state.progression.plots.get_mut(*plot) {
                *slot = PlotState::Empty;
            }
        }
    }
}

/// Forge crafting. Item inputs are consumed at completion; if they were
/// sold out from under the process it starves and is cancelled.
pub struct CraftHandler;

impl ProcessHandler for CraftHandler {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Craft
    }

    fn can_start(
        &self,
        _state: &GameState,
        detail: &ProcessDetail,
        content: &ContentTable,
    ) -> Result<()> {
        let ProcessDetail::Craft { recipe } = detail else {
            return Err(CroftError::ProcessRejected {
                kind: self.kind(),
                reason: "wrong detail kind".into(),
            });
        };
        entry_with_duration(content, recipe, self.kind())?;
        Ok(())
    }

    fn complete(
        &self,
        process: &ActiveProcess,
        state: &mut GameState,
        content: &ContentTable,
        events: &mut Vec<GameEvent>,
    ) -> Result<Vec<(ItemId, u32)>> {
        let recipe = process.detail.target();
        let entry = content
            .get(recipe)
            .ok_or_else(|| CroftError::UnknownItem(recipe.clone()))?;
        let inputs = ResourceCost {
            items: entry.cost.items.clone(),
            ..ResourceCost::default()
        };
        state.resources.spend(&inputs)?;
        for (id, count) in &entry.yields {
            state.grant_items(id, *count, content, events);
        }
        state.award_xp(entry.xp, events);
        Ok(entry.yields.clone())
    }
}

/// Mining, catching, adventuring and training share one shape: energy was
/// paid at start, yields and XP arrive at completion.
pub struct ExpeditionHandler {
    kind: ProcessKind,
}

impl ExpeditionHandler {
    pub fn new(kind: ProcessKind) -> Self {
        Self { kind }
    }
}

impl ProcessHandler for ExpeditionHandler {
    fn kind(&self) -> ProcessKind {
        self.kind
    }

    fn can_start(
        &self,
        _state: &GameState,
        detail: &ProcessDetail,
        content: &ContentTable,
    ) -> Result<()> {
        if detail.kind() != self.kind {
            return Err(CroftError::ProcessRejected {
                kind: self.kind,
                reason: "wrong detail kind".into(),
            });
        }
        entry_with_duration(content, detail.target(), self.kind)?;
        Ok(())
    }

    fn complete(
        &self,
        process: &ActiveProcess,
        state: &mut GameState,
        content: &ContentTable,
        events: &mut Vec<GameEvent>,
    ) -> Result<Vec<(ItemId, u32)>> {
        let target = process.detail.target();
        let entry = content
            .get(target)
            .ok_or_else(|| CroftError::UnknownItem(target.clone()))?;
        for (id, count) in &entry.yields {
            state.grant_items(id, *count, content, events);
        }
        state.award_xp(entry.xp, events);
        Ok(entry.yields.clone())
    }
}
