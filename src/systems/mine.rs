//! The mine: ore expeditions as Mine processes

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::ItemCategory;
use crate::core::error::{CroftError, Result};
use crate::core::types::{ProcessKind, Screen};
use crate::state::process::ProcessDetail;
use crate::state::GameState;
use crate::systems::{scalar_cost_deltas, yields_value, GameSystem, SystemContext};

pub struct MineSystem;

impl GameSystem for MineSystem {
    fn name(&self) -> &'static str {
        "mine"
    }

    fn screen(&self) -> Screen {
        Screen::Mine
    }

    fn process_kind(&self, _action: &GameAction) -> Option<ProcessKind> {
        Some(ProcessKind::Mine)
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        let _ = state;
        ctx.content
            .by_category(ItemCategory::Expedition)
            .filter(|entry| entry.screen == Screen::Mine && entry.duration.is_some())
            .map(|entry| {
                GameAction::new(
                    format!("mine:{}", entry.id),
                    ActionType::Mine,
                    Screen::Mine,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(entry.cost.clone())
                .with_prerequisites(entry.prerequisites.clone())
                .with_reward(yields_value(ctx.content, &entry.yields))
            })
            .collect()
    }

    fn execute(
        &mut self,
        action: &GameAction,
        _state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        let vein = action
            .target
            .clone()
            .ok_or_else(|| CroftError::InvalidAction("mine without vein".into()))?;
        let entry = ctx
            .content
            .get(&vein)
            .ok_or_else(|| CroftError::UnknownItem(vein.clone()))?;
        let duration = entry
            .duration
            .ok_or_else(|| CroftError::InvalidAction(format!("vein '{}' has no duration", vein)))?;
        let mut deltas = scalar_cost_deltas(&entry.cost);
        deltas.push(StateDelta::StartProcess {
            detail: ProcessDetail::Mine { vein: vein.clone() },
            duration,
        });
        Ok(ActionResult::ok(
            format!("started working the {}", entry.name),
            deltas,
        ))
    }
}
