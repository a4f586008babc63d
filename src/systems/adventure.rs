//! The wilds: catching creatures and walking expeditions
//!
//! Catching and questing use separate process slots, so a patient net
//! session does not block a long trail walk.

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::ItemCategory;
use crate::core::error::{CroftError, Result};
use crate::core::types::{ProcessKind, Screen};
use crate::state::process::ProcessDetail;
use crate::state::GameState;
use crate::systems::{scalar_cost_deltas, yields_value, GameSystem, SystemContext};

pub struct AdventureSystem;

impl GameSystem for AdventureSystem {
    fn name(&self) -> &'static str {
        "adventure"
    }

    fn screen(&self) -> Screen {
        Screen::Adventure
    }

    fn process_kind(&self, action: &GameAction) -> Option<ProcessKind> {
        match action.action_type {
            ActionType::Catch => Some(ProcessKind::Catch),
            ActionType::Adventure => Some(ProcessKind::Adventure),
            _ => None,
        }
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        let _ = state;
        let mut actions = Vec::new();

        for entry in ctx.content.by_category(ItemCategory::Creature) {
            if entry.duration.is_none() {
                continue;
            }
            actions.push(
                GameAction::new(
                    format!("catch:{}", entry.id),
                    ActionType::Catch,
                    Screen::Adventure,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(entry.cost.clone())
                .with_prerequisites(entry.prerequisites.clone())
                .with_reward(entry.value),
            );
        }

        for entry in ctx.content.by_category(ItemCategory::Expedition) {
            if entry.screen != Screen::Adventure || entry.duration.is_none() {
                continue;
            }
            actions.push(
                GameAction::new(
                    format!("quest:{}", entry.id),
                    ActionType::Adventure,
                    Screen::Adventure,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(entry.cost.clone())
                .with_prerequisites(entry.prerequisites.clone())
                .with_reward(yields_value(ctx.content, &entry.yields)),
            );
        }

        actions
    }

    fn execute(
        &mut self,
        action: &GameAction,
        _state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        let target = action
            .target
            .clone()
            .ok_or_else(|| CroftError::InvalidAction("adventure without target".into()))?;
        let entry = ctx
            .content
            .get(&target)
            .ok_or_else(|| CroftError::UnknownItem(target.clone()))?;
        let duration = entry.duration.ok_or_else(|| {
            CroftError::InvalidAction(format!("'{}' has no duration", target))
        })?;
        let detail = match action.action_type {
            ActionType::Catch => ProcessDetail::Catch {
                creature: target.clone(),
            },
            ActionType::Adventure => ProcessDetail::Adventure {
                quest: target.clone(),
            },
            _ => {
                return Err(CroftError::SystemError {
                    system: self.name().into(),
                    detail: format!("cannot execute {:?}", action.action_type),
                })
            }
        };
        let mut deltas = scalar_cost_deltas(&entry.cost);
        deltas.push(StateDelta::StartProcess { detail, duration });
        Ok(ActionResult::ok(format!("set out for {}", entry.name), deltas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::table::ContentTable;
    use crate::core::config::SimulationConfig;
    use crate::process::ProcessManager;
    use crate::validation::ValidationService;

    #[test]
    fn test_catch_and_quest_use_separate_slots() {
        let config = SimulationConfig::default();
        let content = ContentTable::with_defaults();
        let mut validation = ValidationService::new(&content, config.validation_cache_ttl);
        let manager = ProcessManager::with_defaults(&config);
        let mut state = GameState::new(&config);
        state.progression.unlocked_areas.insert(Screen::Adventure);

        manager
            .try_start(
                &mut state,
                ProcessDetail::Catch {
                    creature: "pond_frog".into(),
                },
                1_800.0,
                0.0,
                &content,
            )
            .unwrap();

        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        let actions = AdventureSystem.evaluate_actions(&state, &mut ctx);
        let catch = actions.iter().find(|a| a.id == "catch:pond_frog").unwrap();
        let quest = actions.iter().find(|a| a.id == "quest:forest_trail").unwrap();
        assert!(!AdventureSystem.can_execute(catch, &state, &mut ctx).satisfied);
        assert!(AdventureSystem.can_execute(quest, &state, &mut ctx).satisfied);
    }
}
