//! The farm: planting, watering, harvesting
//!
//! Growth itself is a process; the farm system only starts it and collects
//! the results. Watering is a single action covering every plot that has
//! gone dry, so one decision fixes the whole farm.

use crate::action::{ActionResult, ActionType, GameAction, StateDelta};
use crate::content::table::{ItemCategory, ResourceCost};
use crate::core::error::{CroftError, Result};
use crate::core::types::{ProcessKind, Screen, SimTime};
use crate::state::process::ProcessDetail;
use crate::state::progression::PlotState;
use crate::state::GameState;
use crate::systems::{yields_value, GameSystem, SystemContext};
use crate::validation::{ValidationIssue, ValidationResult};

pub struct FarmSystem;

impl FarmSystem {
    /// Plots whose growth has gone (or is about to go) dry
    fn thirsty_plots(state: &GameState, now: SimTime) -> Vec<usize> {
        state
            .processes
            .growth
            .iter()
            .filter_map(|p| match &p.detail {
                ProcessDetail::Growth {
                    plot,
                    watered_until,
                    ..
                } if *watered_until <= now => Some(*plot),
                _ => None,
            })
            .collect()
    }

    /// Value still locked up in thirsty plots, used as the watering reward
    fn thirsty_value(state: &GameState, ctx: &SystemContext, now: SimTime) -> f64 {
        state
            .processes
            .growth
            .iter()
            .filter(|p| matches!(&p.detail, ProcessDetail::Growth { watered_until, .. }
                if *watered_until <= now))
            .filter_map(|p| ctx.content.get(p.detail.target()))
            .map(|entry| yields_value(ctx.content, &entry.yields))
            .sum()
    }
}

impl GameSystem for FarmSystem {
    fn name(&self) -> &'static str {
        "farm"
    }

    fn screen(&self) -> Screen {
        Screen::Farm
    }

    fn process_kind(&self, action: &GameAction) -> Option<ProcessKind> {
        matches!(action.action_type, ActionType::Plant).then_some(ProcessKind::Growth)
    }

    fn evaluate_actions(&self, state: &GameState, ctx: &mut SystemContext) -> Vec<GameAction> {
        let now = state.time;
        let mut actions = Vec::new();

        // Plant: one candidate per owned seed type, on the first free plot
        if let Some(plot) = state.progression.first_empty_plot() {
            for seed in ctx.content.by_category(ItemCategory::Seed) {
                if state.resources.item_count(&seed.id) == 0 {
                    continue;
                }
                let cost = ResourceCost {
                    water: ctx.config.water_per_plot,
                    items: vec![(seed.id.clone(), 1)],
                    ..ResourceCost::default()
                };
                actions.push(
                    GameAction::new(
                        format!("plant:{}:plot{}", seed.id, plot),
                        ActionType::Plant,
                        Screen::Farm,
                        self.name(),
                    )
                    .with_target(seed.id.clone())
                    .with_plot(plot)
                    .with_cost(cost)
                    .with_prerequisites(seed.prerequisites.clone())
                    .with_reward(yields_value(ctx.content, &seed.yields)),
                );
            }
        }

        // Water: one action covering every dry plot
        let thirsty = Self::thirsty_plots(state, now);
        if !thirsty.is_empty() {
            let cost = ResourceCost {
                water: thirsty.len() as f64 * ctx.config.water_per_plot,
                ..ResourceCost::default()
            };
            actions.push(
                GameAction::new("water:plots", ActionType::WaterPlots, Screen::Farm, self.name())
                    .with_cost(cost)
                    .with_reward(Self::thirsty_value(state, ctx, now)),
            );
        }

        // Harvest: one per ready plot
        for (plot, slot) in state.progression.plots.iter().enumerate() {
            if let PlotState::Ready { crop, count } = slot {
                let value = ctx.content.get(crop).map(|e| e.value).unwrap_or(0.0);
                actions.push(
                    GameAction::new(
                        format!("harvest:plot{}", plot),
                        ActionType::Harvest,
                        Screen::Farm,
                        self.name(),
                    )
                    .with_target(crop.clone())
                    .with_plot(plot)
                    .with_reward(value * *count as f64),
                );
            }
        }

        actions
    }

    fn can_execute(
        &self,
        action: &GameAction,
        state: &GameState,
        ctx: &mut SystemContext,
    ) -> ValidationResult {
        let mut result = ctx.validation.validate(action, state, state.time);
        match action.action_type {
            ActionType::Plant => {
                if state.processes.count(ProcessKind::Growth)
                    >= ctx.processes.limit(ProcessKind::Growth)
                {
                    result.issues.push(ValidationIssue::AtCapacity(ProcessKind::Growth));
                }
                if let Some(plot) = action.plot {
                    let free = state
                        .progression
                        .plots
                        .get(plot)
                        .is_some_and(PlotState::is_empty)
                        && state.processes.growth_on_plot(plot).is_none();
                    if !free {
                        result.issues.push(ValidationIssue::PlotOccupied(plot));
                    }
                }
            }
            ActionType::Harvest => {
                if let Some(plot) = action.plot {
                    let ready = matches!(
                        state.progression.plots.get(plot),
                        Some(PlotState::Ready { .. })
                    );
                    if !ready {
                        result.issues.push(ValidationIssue::PlotOccupied(plot));
                    }
                }
            }
            _ => {}
        }
        result.satisfied = result.issues.is_empty();
        result
    }

    fn execute(
        &mut self,
        action: &GameAction,
        state: &GameState,
        ctx: &mut SystemContext,
    ) -> Result<ActionResult> {
        let now = state.time;
        match action.action_type {
            ActionType::Plant => {
                let seed = action
                    .target
                    .clone()
                    .ok_or_else(|| CroftError::InvalidAction("plant without seed".into()))?;
                let plot = action
                    .plot
                    .ok_or_else(|| CroftError::InvalidAction("plant without plot".into()))?;
                let entry = ctx
                    .content
                    .get(&seed)
                    .ok_or_else(|| CroftError::UnknownItem(seed.clone()))?;
                let duration = entry.duration.ok_or_else(|| {
                    CroftError::InvalidAction(format!("seed '{}' has no growth duration", seed))
                })?;
                let deltas = vec![
                    StateDelta::Water(-ctx.config.water_per_plot),
                    StateDelta::RemoveItems(seed.clone(), 1),
                    StateDelta::SetPlot(plot, PlotState::Planted { seed: seed.clone() }),
                    StateDelta::StartProcess {
                        detail: ProcessDetail::Growth {
                            plot,
                            seed: seed.clone(),
                            // Planting includes the first watering
                            watered_until: now + ctx.config.watering_duration,
                        },
                        duration,
                    },
                ];
                Ok(ActionResult::ok(
                    format!("planted {} on plot {}", seed, plot),
                    deltas,
                ))
            }
            ActionType::WaterPlots => {
                let thirsty = Self::thirsty_plots(state, now);
                if thirsty.is_empty() {
                    return Err(CroftError::InvalidAction("no plot needs water".into()));
                }
                let mut deltas = vec![StateDelta::Water(
                    -(thirsty.len() as f64 * ctx.config.water_per_plot),
                )];
                for plot in &thirsty {
                    deltas.push(StateDelta::WaterPlot {
                        plot: *plot,
                        until: now + ctx.config.watering_duration,
                    });
                }
                Ok(ActionResult::ok(
                    format!("watered {} plots", thirsty.len()),
                    deltas,
                ))
            }
            ActionType::Harvest => {
                let plot = action
                    .plot
                    .ok_or_else(|| CroftError::InvalidAction("harvest without plot".into()))?;
                let Some(PlotState::Ready { crop, count }) = state.progression.plots.get(plot)
                else {
                    return Err(CroftError::InvalidAction(format!(
                        "plot {} has nothing to harvest",
                        plot
                    )));
                };
                let deltas = vec![
                    StateDelta::AddItems(crop.clone(), *count),
                    StateDelta::SetPlot(plot, PlotState::Empty),
                ];
                Ok(ActionResult::ok(
                    format!("harvested {} {} from plot {}", count, crop, plot),
                    deltas,
                ))
            }
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

    struct Fixture {
        state: GameState,
        content: ContentTable,
        config: SimulationConfig,
        validation: ValidationService,
        manager: ProcessManager,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SimulationConfig::default();
            let content = ContentTable::with_defaults();
            Self {
                state: GameState::new(&config),
                validation: ValidationService::new(&content, config.validation_cache_ttl),
                manager: ProcessManager::with_defaults(&config),
                content,
                config,
            }
        }

        fn ctx(&mut self) -> SystemContext<'_> {
            SystemContext {
                content: &self.content,
                config: &self.config,
                validation: &mut self.validation,
                processes: &self.manager,
            }
        }
    }

    #[test]
    fn test_plant_candidates_only_for_owned_seeds() {
        let mut fx = Fixture::new();
        let state = fx.state.clone();
        let actions = FarmSystem.evaluate_actions(&state, &mut fx.ctx());
        let plants: Vec<_> = actions
            .iter()
            .filter(|a| a.action_type == ActionType::Plant)
            .collect();
        // Starter inventory has turnip seeds only
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].target.as_ref().map(|t| t.as_str()), Some("turnip_seed"));
    }

    #[test]
    fn test_plant_executes_into_growth_process() {
        let mut fx = Fixture::new();
        let state = fx.state.clone();
        let actions = FarmSystem.evaluate_actions(&state, &mut fx.ctx());
        let plant = actions
            .iter()
            .find(|a| a.action_type == ActionType::Plant)
            .expect("plant candidate")
            .clone();

        let result = FarmSystem.execute(&plant, &state, &mut fx.ctx()).unwrap();
        let mut state = state;
        crate::action::apply_deltas(
            &mut state,
            &result.deltas,
            &fx.content,
            &fx.config,
            &fx.manager,
            0.0,
        )
        .unwrap();
        assert_eq!(state.processes.growth.len(), 1);
        assert!(matches!(
            state.progression.plots[0],
            PlotState::Planted { .. }
        ));
        assert_eq!(state.resources.item_count(&"turnip_seed".into()), 1);
    }

    #[test]
    fn test_water_candidate_appears_for_dry_plots() {
        let mut fx = Fixture::new();
        let mut state = fx.state.clone();
        state.time = 1_000.0;
        let id = state.allocate_process_id();
        state.processes.push(crate::state::process::ActiveProcess {
            id,
            started_at: 0.0,
            duration: 14_400.0,
            elapsed: 500.0,
            detail: ProcessDetail::Growth {
                plot: 0,
                seed: "turnip_seed".into(),
                watered_until: 500.0,
            },
        });
        let actions = FarmSystem.evaluate_actions(&state, &mut fx.ctx());
        assert!(actions
            .iter()
            .any(|a| a.action_type == ActionType::WaterPlots));
    }

    #[test]
    fn test_watering_repriced_by_new_dry_plots_is_rejected() {
        let mut fx = Fixture::new();
        let mut state = fx.state.clone();
        state.time = 1_000.0;
        state.resources.water = 5.0;
        let dry_growth = |state: &mut GameState, plot: usize| {
            let id = state.allocate_process_id();
            state.processes.push(crate::state::process::ActiveProcess {
                id,
                started_at: 0.0,
                duration: 14_400.0,
                elapsed: 500.0,
                detail: ProcessDetail::Growth {
                    plot,
                    seed: "turnip_seed".into(),
                    watered_until: 500.0,
                },
            });
        };

        // One dry plot: 4.0 water, affordable, result lands in the cache
        dry_growth(&mut state, 0);
        let actions = FarmSystem.evaluate_actions(&state, &mut fx.ctx());
        let water = actions
            .iter()
            .find(|a| a.action_type == ActionType::WaterPlots)
            .expect("watering candidate")
            .clone();
        assert_eq!(water.cost.water, 4.0);
        assert!(FarmSystem.can_execute(&water, &state, &mut fx.ctx()).satisfied);

        // Two more plots go dry without touching anything the state
        // digest tracks; the repriced action must be rechecked
        dry_growth(&mut state, 1);
        dry_growth(&mut state, 2);
        let actions = FarmSystem.evaluate_actions(&state, &mut fx.ctx());
        let water = actions
            .iter()
            .find(|a| a.action_type == ActionType::WaterPlots)
            .expect("watering candidate")
            .clone();
        assert_eq!(water.cost.water, 12.0);
        let result = FarmSystem.can_execute(&water, &state, &mut fx.ctx());
        assert!(!result.satisfied, "12.0 water against a 5.0 pool");
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::InsufficientResource { .. })));
    }

    #[test]
    fn test_plant_on_occupied_plot_not_executable() {
        let mut fx = Fixture::new();
        let mut state = fx.state.clone();
        state.progression.plots[0] = PlotState::Planted {
            seed: "turnip_seed".into(),
        };
        let action = GameAction::new("plant:turnip_seed:plot0", ActionType::Plant, Screen::Farm, "farm")
            .with_target("turnip_seed".into())
            .with_plot(0)
            .with_cost(ResourceCost {
                water: 4.0,
                items: vec![("turnip_seed".into(), 1)],
                ..ResourceCost::default()
            });
        let result = FarmSystem.can_execute(&action, &state, &mut fx.ctx());
        assert!(!result.satisfied);
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::PlotOccupied(0))));
    }
}
