//! The forge: crafting recipes as Craft processes
//!
//! Recipe inputs must be on hand to start but are only consumed when the
//! craft finishes; selling them mid-craft starves the process.

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::ItemCategory;
use crate::core::error::{CroftError, Result};
use crate::core::types::{ProcessKind, Screen};
use crate::state::process::ProcessDetail;
use crate::state::GameState;
use crate::systems::{scalar_cost_deltas, GameSystem, SystemContext};

pub struct ForgeSystem;

impl GameSystem for ForgeSystem {
    fn name(&self) -> &'static str {
        "forge"
    }

    fn screen(&self) -> Screen {
        Screen::Forge
    }

    fn process_kind(&self, _action: &GameAction) -> Option<ProcessKind> {
        Some(ProcessKind::Craft)
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        let _ = state;
        ctx.content
            .by_category(ItemCategory::Recipe)
            .filter(|entry| entry.screen == Screen::Forge && entry.duration.is_some())
            .map(|entry| {
                GameAction::new(
                    format!("craft:{}", entry.id),
                    ActionType::Craft,
                    Screen::Forge,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(entry.cost.clone())
                .with_prerequisites(entry.prerequisites.clone())
                .with_reward(entry.value)
            })
            .collect()
    }

    fn execute(
        &mut self,
        action: &GameAction,
        _state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        let recipe = action
            .target
            .clone()
            .ok_or_else(|| CroftError::InvalidAction("craft without recipe".into()))?;
        let entry = ctx
            .content
            .get(&recipe)
            .ok_or_else(|| CroftError::UnknownItem(recipe.clone()))?;
        let duration = entry.duration.ok_or_else(|| {
            CroftError::InvalidAction(format!("recipe '{}' has no duration", recipe))
        })?;
        let mut deltas = scalar_cost_deltas(&entry.cost);
        deltas.push(StateDelta::StartProcess {
            detail: ProcessDetail::Craft {
                recipe: recipe.clone(),
            },
            duration,
        });
        Ok(ActionResult::ok(
            format!("started crafting {}", entry.name),
            deltas,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::table::ContentTable;
    use crate::core::config::SimulationConfig;
    use crate::process::ProcessManager;
    use crate::validation::{ValidationIssue, ValidationService};

    #[test]
    fn test_craft_blocked_at_capacity() {
        let config = SimulationConfig::default();
        let content = ContentTable::with_defaults();
        let mut validation = ValidationService::new(&content, config.validation_cache_ttl);
        let manager = ProcessManager::with_defaults(&config);
        let mut state = GameState::new(&config);
        state.progression.unlocked_areas.insert(Screen::Forge);
        state.resources.add_items(&"iron_ore".into(), 6);

        // Occupy the single craft slot
        manager
            .try_start(
                &mut state,
                ProcessDetail::Craft {
                    recipe: "iron_bar".into(),
                },
                100.0,
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
        let action = ForgeSystem
            .evaluate_actions(&state, &mut ctx)
            .into_iter()
            .find(|a| a.id == "craft:iron_bar")
            .expect("craft candidate");
        let result = ForgeSystem.can_execute(&action, &state, &mut ctx);
        assert!(!result.satisfied);
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::AtCapacity(ProcessKind::Craft))));
    }

    #[test]
    fn test_craft_requires_inputs_on_hand() {
        let config = SimulationConfig::default();
        let content = ContentTable::with_defaults();
        let mut validation = ValidationService::new(&content, config.validation_cache_ttl);
        let manager = ProcessManager::with_defaults(&config);
        let mut state = GameState::new(&config);
        state.progression.unlocked_areas.insert(Screen::Forge);

        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        let action = ForgeSystem
            .evaluate_actions(&state, &mut ctx)
            .into_iter()
            .find(|a| a.id == "craft:iron_bar")
            .expect("craft candidate");
        let result = ForgeSystem.can_execute(&action, &state, &mut ctx);
        assert!(!result.satisfied, "no iron ore on hand");
    }
}
