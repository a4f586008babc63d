//! The hiring board: helpers and their passive income

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::ItemCategory;
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::{ResourceKind, Screen};
use crate::state::GameState;
use crate::systems::{scalar_cost_deltas, GameSystem, SystemContext};

pub struct HelpersSystem;

impl GameSystem for HelpersSystem {
    fn name(&self) -> &'static str {
        "helpers"
    }

    fn screen(&self) -> Screen {
        Screen::Helpers
    }

    fn tick(
        &mut self,
        state: &mut GameState,
        ctx: &mut SystemContext,
        dt: f64,
    ) -> Result<Vec<GameEvent>> {
        let helpers = state.helper_count(ctx.content);
        if helpers > 0 {
            let income = helpers as f64 * ctx.config.helper_gold_per_hour * dt / 3_600.0;
            state.resources.add_scalar(ResourceKind::Gold, income, None);
        }
        Ok(Vec::new())
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        let _ = state;
        ctx.content
            .by_category(ItemCategory::Helper)
            .map(|entry| {
                GameAction::new(
                    format!("hire:{}", entry.id),
                    ActionType::Hire,
                    Screen::Helpers,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(entry.cost.clone())
                .with_prerequisites(entry.prerequisites.clone())
                // Expected first day of income
                .with_reward(ctx.config.helper_gold_per_hour * 24.0)
            })
            .collect()
    }

    fn execute(
        &mut self,
        action: &GameAction,
        _state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        let helper = action
            .target
            .clone()
            .ok_or_else(|| CroftError::InvalidAction("hire without helper".into()))?;
        let entry = ctx
            .content
            .get(&helper)
            .ok_or_else(|| CroftError::UnknownItem(helper.clone()))?;
        let mut deltas = scalar_cost_deltas(&entry.cost);
        deltas.push(StateDelta::AddItems(helper.clone(), 1));
        if entry.xp > 0 {
            deltas.push(StateDelta::Xp(entry.xp));
        }
        Ok(ActionResult::ok(format!("hired a {}", entry.name), deltas))
    }
}
