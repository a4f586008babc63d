//! The training tower: courses as Train processes
//!
//! A course that has already granted its badge is not offered again.

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::ItemCategory;
use crate::core::error::{CroftError, Result};
use crate::core::types::{ProcessKind, Screen};
use crate::state::process::ProcessDetail;
use crate::state::GameState;
use crate::systems::{scalar_cost_deltas, GameSystem, SystemContext};

pub struct TowerSystem;

impl GameSystem for TowerSystem {
    fn name(&self) -> &'static str {
        "tower"
    }

    fn screen(&self) -> Screen {
        Screen::Tower
    }

    fn process_kind(&self, _action: &GameAction) -> Option<ProcessKind> {
        Some(ProcessKind::Train)
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        ctx.content
            .by_category(ItemCategory::Training)
            .filter(|entry| entry.duration.is_some())
            .filter(|entry| {
                entry
                    .yields
                    .iter()
                    .any(|(id, _)| state.resources.item_count(id) == 0)
            })
            .map(|entry| {
                GameAction::new(
                    format!("train:{}", entry.id),
                    ActionType::Train,
                    Screen::Tower,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(entry.cost.clone())
                .with_prerequisites(entry.prerequisites.clone())
            })
            .collect()
    }

    fn execute(
        &mut self,
        action: &GameAction,
        _state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        let course = action
            .target
            .clone()
            .ok_or_else(|| CroftError::InvalidAction("train without course".into()))?;
        let entry = ctx
            .content
            .get(&course)
            .ok_or_else(|| CroftError::UnknownItem(course.clone()))?;
        let duration = entry.duration.ok_or_else(|| {
            CroftError::InvalidAction(format!("course '{}' has no duration", course))
        })?;
        let mut deltas = scalar_cost_deltas(&entry.cost);
        deltas.push(StateDelta::StartProcess {
            detail: ProcessDetail::Train {
                course: course.clone(),
            },
            duration,
        });
        Ok(ActionResult::ok(format!("enrolled in {}", entry.name), deltas))
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
    fn test_completed_course_not_offered() {
        let config = SimulationConfig::default();
        let content = ContentTable::with_defaults();
        let mut validation = ValidationService::new(&content, config.validation_cache_ttl);
        let manager = ProcessManager::with_defaults(&config);
        let mut state = GameState::new(&config);

        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        assert!(TowerSystem
            .evaluate_actions(&state, &mut ctx)
            .iter()
            .any(|a| a.id == "train:strength_course"));

        state.resources.add_items(&"strength_badge".into(), 1);
        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        assert!(TowerSystem.evaluate_actions(&state, &mut ctx).is_empty());
    }
}
