//! Candidate actions, execution results, and atomic state deltas
//!
//! Systems never mutate state while executing an action: `execute` returns
//! an `ActionResult` whose deltas the tick driver applies as one atomic
//! batch. A failing precondition anywhere in the batch leaves the state
//! untouched.

use crate::content::table::{ContentTable, ResourceCost};
use crate::core::config::SimulationConfig;
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::{ActionCategory, ItemId, ResourceKind, Screen, SimTime};
use crate::process::manager::ProcessManager;
use crate::state::process::ProcessDetail;
use crate::state::progression::PlotState;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

/// Discrete action types the agent can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Plant,
    WaterPlots,
    Harvest,
    Buy,
    Sell,
    RefillWater,
    Rest,
    Craft,
    Mine,
    Catch,
    Adventure,
    Train,
    Hire,
}

impl ActionType {
    /// Category used for persona biasing and base scoring
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionType::Plant | ActionType::WaterPlots | ActionType::Harvest => {
                ActionCategory::Farming
            }
            ActionType::Buy | ActionType::Sell => ActionCategory::Commerce,
            ActionType::RefillWater | ActionType::Rest => ActionCategory::Maintenance,
            ActionType::Craft => ActionCategory::Crafting,
            ActionType::Mine => ActionCategory::Mining,
            ActionType::Catch | ActionType::Adventure => ActionCategory::Adventuring,
            ActionType::Train => ActionCategory::Training,
            ActionType::Hire => ActionCategory::Helpers,
        }
    }
}

/// A candidate action produced by a GameSystem
///
/// The score is zero until the scorer fills it in; filtering always runs
/// before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAction {
    /// Stable identifier, e.g. `plant:turnip_seed:plot0`
    pub id: String,
    pub action_type: ActionType,
    /// Content entry this action operates on
    pub target: Option<ItemId>,
    /// Plot index for plot-addressed farm actions
    pub plot: Option<usize>,
    /// Screen the action belongs to
    pub screen: Screen,
    /// Name of the system that produced (and will execute) the action
    pub system: String,
    pub cost: ResourceCost,
    pub prerequisites: Vec<ItemId>,
    /// Rough gold-equivalent reward estimate used by the scorer
    pub expected_reward: f64,
    /// Priority score, assigned only after filtering
    pub score: f64,
}

impl GameAction {
    pub fn new(
        id: impl Into<String>,
        action_type: ActionType,
        screen: Screen,
        system: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action_type,
            target: None,
            plot: None,
            screen,
            system: system.into(),
            cost: ResourceCost::default(),
            prerequisites: Vec::new(),
            expected_reward: 0.0,
            score: 0.0,
        }
    }

    pub fn with_target(mut self, target: ItemId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_plot(mut self, plot: usize) -> Self {
        self.plot = Some(plot);
        self
    }

    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: Vec<ItemId>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn with_reward(mut self, expected_reward: f64) -> Self {
        self.expected_reward = expected_reward;
        self
    }
}

/// One element of an atomic state mutation batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateDelta {
    /// Signed gold change; a negative change failing sufficiency aborts the batch
    Gold(f64),
    /// Signed water change, clamped to capacity on gain
    Water(f64),
    /// Signed energy change, clamped to capacity on gain
    Energy(f64),
    AddItems(ItemId, u32),
    RemoveItems(ItemId, u32),
    Unlock(ItemId),
    Milestone(String),
    Xp(u32),
    SetPlot(usize, PlotState),
    /// Mark a plot's growth process watered until the given time
    WaterPlot { plot: usize, until: SimTime },
    StartProcess { detail: ProcessDetail, duration: f64 },
    SetScreen(Screen),
}

/// Result of executing one action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub description: String,
    pub deltas: Vec<StateDelta>,
    pub events: Vec<GameEvent>,
}

impl ActionResult {
    pub fn ok(description: impl Into<String>, deltas: Vec<StateDelta>) -> Self {
        Self {
            success: true,
            description: description.into(),
            deltas,
            events: Vec::new(),
        }
    }
}

/// Apply a delta batch atomically.
///
/// The batch is staged on a scratch copy of the state and committed only if
/// every delta applies cleanly, so a failing precondition can never leave a
/// partial mutation behind. Returns the events raised by the batch.
pub fn apply_deltas(
    state: &mut GameState,
    deltas: &[StateDelta],
    content: &ContentTable,
    config: &SimulationConfig,
    manager: &ProcessManager,
    now: SimTime,
) -> Result<Vec<GameEvent>> {
    let mut scratch = state.clone();
    let mut events = Vec::new();

    for delta in deltas {
        apply_one(&mut scratch, delta, content, config, manager, now, &mut events)?;
    }

    *state = scratch;
    Ok(events)
}

fn apply_one(
    state: &mut GameState,
    delta: &StateDelta,
    content: &ContentTable,
    config: &SimulationConfig,
    manager: &ProcessManager,
    now: SimTime,
    events: &mut Vec<GameEvent>,
) -> Result<()> {
    match delta {
        StateDelta::Gold(amount) => {
            if *amount < 0.0 {
                state.resources.try_spend_scalar(ResourceKind::Gold, -amount)?;
            } else {
                state.resources.add_scalar(ResourceKind::Gold, *amount, None);
            }
        }
        StateDelta::Water(amount) => {
            if *amount < 0.0 {
                state.resources.try_spend_scalar(ResourceKind::Water, -amount)?;
            } else {
                state
                    .resources
                    .add_scalar(ResourceKind::Water, *amount, Some(config.water_capacity));
            }
        }
        StateDelta::Energy(amount) => {
            if *amount < 0.0 {
                state.resources.try_spend_scalar(ResourceKind::Energy, -amount)?;
            } else {
                state
                    .resources
                    .add_scalar(ResourceKind::Energy, *amount, Some(config.energy_capacity));
            }
        }
        StateDelta::AddItems(id, count) => {
            state.grant_items(id, *count, content, events);
        }
        StateDelta::RemoveItems(id, count) => {
            state.resources.remove_items(id, *count)?;
        }
        StateDelta::Unlock(id) => {
            if !content.contains(id) {
                return Err(CroftError::UnknownItem(id.clone()));
            }
            state.progression.unlocked.insert(id.clone());
        }
        StateDelta::Milestone(milestone) => {
            if state.progression.milestones.insert(milestone.clone()) {
                events.push(GameEvent::MilestoneReached {
                    milestone: milestone.clone(),
                });
            }
        }
        StateDelta::Xp(amount) => {
            state.award_xp(*amount, events);
        }
        StateDelta::SetPlot(plot, plot_state) => {
            let slot = state
                .progression
                .plots
                .get_mut(*plot)
                .ok_or_else(|| CroftError::InvalidAction(format!("no plot {}", plot)))?;
            *slot = plot_state.clone();
        }
        StateDelta::WaterPlot { plot, until } => {
            let process = state
                .processes
                .growth
                .iter_mut()
                .find(|p| matches!(p.detail, ProcessDetail::Growth { plot: pl, .. } if pl == *plot))
                .ok_or_else(|| {
                    CroftError::InvalidAction(format!("nothing growing on plot {}", plot))
                })?;
            if let ProcessDetail::Growth { watered_until, .. } = &mut process.detail {
                *watered_until = (*watered_until).max(*until);
            }
        }
        StateDelta::StartProcess { detail, duration } => {
            let id = manager.try_start(state, detail.clone(), *duration, now, content)?;
            events.push(GameEvent::ProcessStarted {
                id,
                kind: detail.kind(),
                target: detail.target().clone(),
            });
        }
        StateDelta::SetScreen(screen) => {
            state.screen = *screen;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::manager::ProcessManager;

    fn setup() -> (GameState, ContentTable, SimulationConfig, ProcessManager) {
        let config = SimulationConfig::default();
        let state = GameState::new(&config);
        let content = ContentTable::with_defaults();
        let manager = ProcessManager::with_defaults(&config);
        (state, content, config, manager)
    }

    #[test]
    fn test_failed_batch_leaves_state_untouched() {
        let (mut state, content, config, manager) = setup();
        let before = state.clone();
        // Second delta overdraws gold, so the first must not stick either
        let deltas = vec![
            StateDelta::AddItems("turnip".into(), 3),
            StateDelta::Gold(-(state.resources.gold + 1.0)),
        ];
        let result = apply_deltas(&mut state, &deltas, &content, &config, &manager, 0.0);
        assert!(result.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_water_gain_clamps_to_capacity() {
        let (mut state, content, config, manager) = setup();
        let deltas = vec![StateDelta::Water(1_000.0)];
        apply_deltas(&mut state, &deltas, &content, &config, &manager, 0.0).unwrap();
        assert_eq!(state.resources.water, config.water_capacity);
    }

    #[test]
    fn test_area_key_opens_area() {
        let (mut state, content, config, manager) = setup();
        assert!(!state.progression.area_open(Screen::Mine));
        let deltas = vec![StateDelta::AddItems("mine_map".into(), 1)];
        apply_deltas(&mut state, &deltas, &content, &config, &manager, 0.0).unwrap();
        assert!(state.progression.area_open(Screen::Mine));
        assert!(state.progression.is_unlocked(&"mine_map".into()));
    }

    #[test]
    fn test_plot_deed_grants_plot() {
        let (mut state, content, config, manager) = setup();
        let plots_before = state.progression.plots.len();
        let deltas = vec![StateDelta::AddItems("plot_deed".into(), 1)];
        apply_deltas(&mut state, &deltas, &content, &config, &manager, 0.0).unwrap();
        assert_eq!(state.progression.plots.len(), plots_before + 1);
    }

    #[test]
    fn test_milestone_event_emitted_once() {
        let (mut state, content, config, manager) = setup();
        let deltas = vec![StateDelta::Milestone("pumpkin_prize".into())];
        let events =
            apply_deltas(&mut state, &deltas, &content, &config, &manager, 0.0).unwrap();
        assert_eq!(events.len(), 1);
        // Re-applying the same milestone raises no second event
        let events =
            apply_deltas(&mut state, &deltas, &content, &config, &manager, 0.0).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_xp_delta_raises_level_up() {
        let (mut state, content, config, manager) = setup();
        let events = apply_deltas(
            &mut state,
            &[StateDelta::Xp(150)],
            &content,
            &config,
            &manager,
            0.0,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![GameEvent::LevelUp { level: 2 }]
        );
    }
}
