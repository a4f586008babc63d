//! Game systems - one per screen
//!
//! A system owns the rules of its screen: it surfaces candidate actions,
//! answers whether a candidate could execute right now, executes chosen
//! actions by returning delta batches, and applies background effects on
//! its tick. Systems are registered in a fixed order so candidate
//! generation is deterministic.

pub mod adventure;
pub mod farm;
pub mod forge;
pub mod helpers;
pub mod mine;
pub mod tower;
pub mod town;

pub use adventure::AdventureSystem;
pub use farm::FarmSystem;
pub use forge::ForgeSystem;
pub use helpers::HelpersSystem;
pub use mine::MineSystem;
pub use tower::TowerSystem;
pub use town::TownSystem;

use crate::action::{ActionResult, GameAction, StateDelta};
use crate::content::table::{ContentTable, ResourceCost};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::events::GameEvent;
use crate::core::types::{ProcessKind, Screen};
use crate::process::ProcessManager;
use crate::state::GameState;
use crate::validation::{ValidationIssue, ValidationResult, ValidationService};

/// Shared services handed to systems during a tick
pub struct SystemContext<'a> {
    pub content: &'a ContentTable,
    pub config: &'a SimulationConfig,
    pub validation: &'a mut ValidationService,
    pub processes: &'a ProcessManager,
}

/// The rules of one screen
pub trait GameSystem: Send {
    fn name(&self) -> &'static str;

    fn screen(&self) -> Screen;

    /// Process kind this action would start, if any; drives the capacity
    /// portion of `can_execute`
    fn process_kind(&self, _action: &GameAction) -> Option<ProcessKind> {
        None
    }

    /// Background effects for one tick window of `dt` simulated seconds
    fn tick(
        &mut self,
        _state: &mut GameState,
        _ctx: &mut SystemContext,
        _dt: f64,
    ) -> Result<Vec<GameEvent>> {
        Ok(Vec::new())
    }

    /// Candidate actions available from the current state
    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction>;

    /// Whether the action could execute against this exact state.
    ///
    /// Cached validation covers prerequisites, resources and location;
    /// process capacity is composed on top uncached since it depends on
    /// state the cache digest deliberately excludes.
    fn can_execute(
        &self,
        action: &GameAction,
        state: &GameState,
        ctx: &mut SystemContext,
    ) -> ValidationResult {
        let mut result = ctx.validation.validate(action, state, state.time);
        if let Some(kind) = self.process_kind(action) {
            if state.processes.count(kind) >= ctx.processes.limit(kind) {
                result.issues.push(ValidationIssue::AtCapacity(kind));
                result.satisfied = false;
            }
        }
        result
    }

    /// Execute a chosen action, returning the delta batch to apply
    fn execute(
        &mut self,
        action: &GameAction,
        state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult>;
}

/// All systems in registration order
pub fn default_systems() -> Vec<Box<dyn GameSystem>> {
    vec![
        Box::new(FarmSystem),
        Box::new(TownSystem),
        Box::new(ForgeSystem),
        Box::new(MineSystem),
        Box::new(AdventureSystem),
        Box::new(TowerSystem),
        Box::new(HelpersSystem),
    ]
}

/// Deltas paying the scalar portion of a cost; item inputs are handled by
/// the consumer (removed up front, or consumed at process completion)
pub(crate) fn scalar_cost_deltas(cost: &ResourceCost) -> Vec<StateDelta> {
    let mut deltas = Vec::new();
    if cost.gold > 0.0 {
        deltas.push(StateDelta::Gold(-cost.gold));
    }
    if cost.water > 0.0 {
        deltas.push(StateDelta::Water(-cost.water));
    }
    if cost.energy > 0.0 {
        deltas.push(StateDelta::Energy(-cost.energy));
    }
    deltas
}

/// Gold-equivalent value of an entry's yields
pub(crate) fn yields_value(content: &ContentTable, yields: &[(crate::core::types::ItemId, u32)]) -> f64 {
    yields
        .iter()
        .filter_map(|(id, count)| content.get(id).map(|e| e.value * *count as f64))
        .sum()
}
