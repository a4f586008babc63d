//! The town: shopping, selling, the well, and the inn
//!
//! Town also owns passive energy regeneration on its background tick.

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::{ItemCategory, ResourceCost};
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::{ResourceKind, Screen};
use crate::state::GameState;
use crate::systems::{scalar_cost_deltas, GameSystem, SystemContext};

/// Categories purchasable at the town shop
const SHOP_CATEGORIES: [ItemCategory; 3] = [
    ItemCategory::Seed,
    ItemCategory::Upgrade,
    ItemCategory::AreaKey,
];

/// Categories the shop buys back
const SELLABLE: [ItemCategory; 4] = [
    ItemCategory::Crop,
    ItemCategory::Material,
    ItemCategory::Creature,
    ItemCategory::Recipe,
];

pub struct TownSystem;

impl GameSystem for TownSystem {
    fn name(&self) -> &'static str {
        "town"
    }

    fn screen(&self) -> Screen {
        Screen::Town
    }

    fn tick(
        &mut self,
        state: &mut GameState,
        ctx: &mut SystemContext,
        dt: f64,
    ) -> Result<Vec<GameEvent>> {
        let regen = ctx.config.energy_regen_per_hour * dt / 3_600.0;
        state
            .resources
            .add_scalar(ResourceKind::Energy, regen, Some(ctx.config.energy_capacity));
        Ok(Vec::new())
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        let mut actions = Vec::new();

        // Buy: seeds are always restockable; upgrades and keys only until owned
        for category in SHOP_CATEGORIES {
            for entry in ctx.content.by_category(category) {
                if entry.cost.is_free() {
                    continue;
                }
                if category != ItemCategory::Seed && state.resources.item_count(&entry.id) > 0 {
                    continue;
                }
                actions.push(
                    GameAction::new(
                        format!("buy:{}", entry.id),
                        ActionType::Buy,
                        Screen::Town,
                        self.name(),
                    )
                    .with_target(entry.id.clone())
                    .with_cost(entry.cost.clone())
                    .with_prerequisites(entry.prerequisites.clone()),
                );
            }
        }

        // Sell: everything the shop buys back, full stack at a time
        for entry in ctx.content.iter() {
            if !SELLABLE.contains(&entry.category) || entry.value <= 0.0 {
                continue;
            }
            let count = state.resources.item_count(&entry.id);
            if count == 0 {
                continue;
            }
            actions.push(
                GameAction::new(
                    format!("sell:{}", entry.id),
                    ActionType::Sell,
                    Screen::Town,
                    self.name(),
                )
                .with_target(entry.id.clone())
                .with_cost(ResourceCost {
                    items: vec![(entry.id.clone(), count)],
                    ..ResourceCost::default()
                })
                .with_reward(entry.value * count as f64),
            );
        }

        // The well
        if state.resources.water + 1e-9 < ctx.config.water_capacity {
            actions.push(
                GameAction::new("refill:water", ActionType::RefillWater, Screen::Town, self.name())
                    .with_cost(ResourceCost {
                        energy: ctx.config.refill_energy_cost,
                        ..ResourceCost::default()
                    })
                    .with_reward(ctx.config.water_capacity - state.resources.water),
            );
        }

        // The inn
        if state.resources.energy + 1e-9 < ctx.config.energy_capacity {
            actions.push(
                GameAction::new("rest:inn", ActionType::Rest, Screen::Town, self.name())
                    .with_reward(ctx.config.rest_energy_gain),
            );
        }

        actions
    }

    fn execute(
        &mut self,
        action: &GameAction,
        state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        match action.action_type {
            ActionType::Buy => {
                let target = action
                    .target
                    .clone()
                    .ok_or_else(|| CroftError::InvalidAction("buy without target".into()))?;
                let entry = ctx
                    .content
                    .get(&target)
                    .ok_or_else(|| CroftError::UnknownItem(target.clone()))?;
                let mut deltas = scalar_cost_deltas(&entry.cost);
                deltas.push(StateDelta::AddItems(target.clone(), 1));
                if entry.xp > 0 {
                    deltas.push(StateDelta::Xp(entry.xp));
                }
                Ok(ActionResult::ok(format!("bought {}", entry.name), deltas))
            }
            ActionType::Sell => {
                let target = action
                    .target
                    .clone()
                    .ok_or_else(|| CroftError::InvalidAction("sell without target".into()))?;
                let entry = ctx
                    .content
                    .get(&target)
                    .ok_or_else(|| CroftError::UnknownItem(target.clone()))?;
                let count = state.resources.item_count(&target);
                if count == 0 {
                    return Err(CroftError::InvalidAction(format!(
                        "nothing to sell for '{}'",
                        target
                    )));
                }
                let deltas = vec![
                    StateDelta::RemoveItems(target.clone(), count),
                    StateDelta::Gold(entry.value * count as f64),
                ];
                Ok(ActionResult::ok(
                    format!("sold {} {} for {} gold", count, entry.name, entry.value * count as f64),
                    deltas,
                ))
            }
            ActionType::RefillWater => {
                let deltas = vec![
                    StateDelta::Energy(-ctx.config.refill_energy_cost),
                    // Clamped to capacity on apply
                    StateDelta::Water(ctx.config.water_capacity),
                ];
                Ok(ActionResult::ok("refilled water at the well", deltas))
            }
            ActionType::Rest => Ok(ActionResult::ok(
                "rested at the inn",
                vec![StateDelta::Energy(ctx.config.rest_energy_gain)],
            )),
            _ => Err(CroftError::SystemError {
                system: self.name().into(),
                detail: format!("cannot execute {:?}", action.action_type),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::table::ContentTable;
    use crate::core::config::SimulationConfig;
    use crate::process::ProcessManager;
    use crate::validation::ValidationService;

    fn fixture() -> (
        GameState,
        ContentTable,
        SimulationConfig,
        ValidationService,
        ProcessManager,
    ) {
        let config = SimulationConfig::default();
        let content = ContentTable::with_defaults();
        let validation = ValidationService::new(&content, config.validation_cache_ttl);
        let manager = ProcessManager::with_defaults(&config);
        (GameState::new(&config), content, config, validation, manager)
    }

    #[test]
    fn test_owned_upgrades_not_offered_again() {
        let (mut state, content, config, mut validation, manager) = fixture();
        state.resources.add_items(&"watering_can".into(), 1);
        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        let actions = TownSystem.evaluate_actions(&state, &mut ctx);
        assert!(!actions.iter().any(|a| a.id == "buy:watering_can"));
        // Seeds stay purchasable forever
        assert!(actions.iter().any(|a| a.id == "buy:turnip_seed"));
    }

    #[test]
    fn test_sell_clears_stack_and_pays_value() {
        let (mut state, content, config, mut validation, manager) = fixture();
        state.resources.add_items(&"turnip".into(), 4);
        let gold_before = state.resources.gold;
        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        let action = TownSystem
            .evaluate_actions(&state, &mut ctx)
            .into_iter()
            .find(|a| a.id == "sell:turnip")
            .expect("sell candidate");
        let result = TownSystem.execute(&action, &state, &mut ctx).unwrap();
        crate::action::apply_deltas(&mut state, &result.deltas, &content, &config, &manager, 0.0)
            .unwrap();
        assert_eq!(state.resources.item_count(&"turnip".into()), 0);
        assert_eq!(state.resources.gold, gold_before + 4.0 * 12.0);
    }

    #[test]
    fn test_tick_regenerates_energy_to_cap() {
        let (mut state, content, config, mut validation, manager) = fixture();
        state.resources.energy = 10.0;
        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        // One simulated hour of regen
        TownSystem.tick(&mut state, &mut ctx, 3_600.0).unwrap();
        assert_eq!(state.resources.energy, 10.0 + config.energy_regen_per_hour);
    }

    #[test]
    fn test_refill_clamps_at_capacity() {
        let (mut state, content, config, mut validation, manager) = fixture();
        state.resources.water = 3.0;
        let mut ctx = SystemContext {
            content: &content,
            config: &config,
            validation: &mut validation,
            processes: &manager,
        };
        let action = GameAction::new("refill:water", ActionType::RefillWater, Screen::Town, "town");
        let result = TownSystem.execute(&action, &state, &mut ctx).unwrap();
        crate::action::apply_deltas(&mut state, &result.deltas, &content, &config, &manager, 0.0)
            .unwrap();
        assert_eq!(state.resources.water, config.water_capacity);
    }
}
