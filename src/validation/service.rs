//! Action validation with digest-keyed caching
//!
//! Validation answers "could this action execute right now?" and is asked
//! far more often than state changes in ways that matter to it. Results
//! are cached under the action id, its cost, and a digest of exactly the
//! state validation reads: unlocked entries, item counts, the three
//! scalar pools, and unlocked areas. Any other state change (time,
//! processes, plots) leaves the digest untouched and cache entries valid.
//! The cost is part of the key because an action id can recur with a
//! state-derived cost (watering scales with the dry-plot count).

use crate::action::GameAction;
use crate::content::table::{ContentTable, ResourceCost};
use crate::core::types::{ItemId, ProcessKind, Screen, SimTime};
use crate::state::GameState;
use crate::validation::graph::PrerequisiteGraph;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One reason an action cannot execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationIssue {
    MissingPrerequisite(ItemId),
    /// The prerequisite sits in a dependency cycle and can never be met
    CyclicPrerequisite(ItemId),
    InsufficientResource {
        resource: String,
        required: f64,
        available: f64,
    },
    /// The action's screen has not been unlocked
    WrongLocation(Screen),
    /// The process kind this action would start is at its concurrency limit.
    /// Composed by systems, never cached (the digest excludes processes).
    AtCapacity(ProcessKind),
    /// The targeted farm plot is not free. Composed by systems, never cached.
    PlotOccupied(usize),
}

/// Outcome of validating one action against one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub satisfied: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            satisfied: issues.is_empty(),
            issues,
        }
    }

    /// Prerequisites (cyclic or not) still missing
    pub fn missing(&self) -> impl Iterator<Item = &ItemId> {
        self.issues.iter().filter_map(|issue| match issue {
            ValidationIssue::MissingPrerequisite(id)
            | ValidationIssue::CyclicPrerequisite(id) => Some(id),
            _ => None,
        })
    }
}

/// The exact slice of state validation depends on, in canonical order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateDigest {
    gold_bits: u64,
    water_bits: u64,
    energy_bits: u64,
    items: Vec<(ItemId, u32)>,
    unlocked: Vec<ItemId>,
    unlocked_areas: Vec<Screen>,
}

impl StateDigest {
    pub fn of(state: &GameState) -> Self {
        let mut items: Vec<(ItemId, u32)> = state
            .resources
            .items
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        items.sort();
        let mut unlocked: Vec<ItemId> = state.progression.unlocked.iter().cloned().collect();
        unlocked.sort();
        let mut unlocked_areas: Vec<Screen> =
            state.progression.unlocked_areas.iter().copied().collect();
        unlocked_areas.sort();
        Self {
            gold_bits: state.resources.gold.to_bits(),
            water_bits: state.resources.water.to_bits(),
            energy_bits: state.resources.energy.to_bits(),
            items,
            unlocked,
            unlocked_areas,
        }
    }
}

/// An action's cost, in hashable form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CostKey {
    gold_bits: u64,
    water_bits: u64,
    energy_bits: u64,
    items: Vec<(ItemId, u32)>,
}

impl CostKey {
    fn of(cost: &ResourceCost) -> Self {
        Self {
            gold_bits: cost.gold.to_bits(),
            water_bits: cost.water.to_bits(),
            energy_bits: cost.energy.to_bits(),
            items: cost.items.clone(),
        }
    }
}

/// Validation service with a digest-keyed result cache
pub struct ValidationService {
    graph: PrerequisiteGraph,
    cache: AHashMap<(String, CostKey, StateDigest), ValidationResult>,
    /// Simulated time of the last cache reset
    last_reset: SimTime,
    ttl: f64,
}

impl ValidationService {
    pub fn new(content: &ContentTable, ttl: f64) -> Self {
        Self {
            graph: PrerequisiteGraph::build(content),
            cache: AHashMap::new(),
            last_reset: 0.0,
            ttl,
        }
    }

    pub fn graph(&self) -> &PrerequisiteGraph {
        &self.graph
    }

    /// Drop every cached result
    pub fn invalidate(&mut self, now: SimTime) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "validation cache cleared");
        }
        self.cache.clear();
        self.last_reset = now;
    }

    /// Validate an action, consulting the cache first
    pub fn validate(
        &mut self,
        action: &GameAction,
        state: &GameState,
        now: SimTime,
    ) -> ValidationResult {
        if now - self.last_reset >= self.ttl {
            self.invalidate(now);
        }
        let key = (
            action.id.clone(),
            CostKey::of(&action.cost),
            StateDigest::of(state),
        );
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let result = self.check(action, state);
        self.cache.insert(key, result.clone());
        result
    }

    fn check(&self, action: &GameAction, state: &GameState) -> ValidationResult {
        let mut issues = Vec::new();

        if !state.progression.area_open(action.screen) {
            issues.push(ValidationIssue::WrongLocation(action.screen));
        }

        for prereq in &action.prerequisites {
            if self.graph.is_unsatisfiable(prereq) {
                issues.push(ValidationIssue::CyclicPrerequisite(prereq.clone()));
            } else if !state.progression.is_unlocked(prereq)
                && state.resources.item_count(prereq) == 0
            {
                issues.push(ValidationIssue::MissingPrerequisite(prereq.clone()));
            }
        }

        for short in state.resources.shortfalls(&action.cost) {
            issues.push(ValidationIssue::InsufficientResource {
                resource: short.resource,
                required: short.required,
                available: short.available,
            });
        }

        ValidationResult::from_issues(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;
    use crate::content::table::ResourceCost;
    use crate::core::config::SimulationConfig;

    fn service() -> ValidationService {
        ValidationService::new(&ContentTable::with_defaults(), 3_600.0)
    }

    fn buy_greenhouse() -> GameAction {
        GameAction::new("buy:greenhouse", ActionType::Buy, Screen::Town, "town")
            .with_target("greenhouse".into())
            .with_cost(ResourceCost::gold(400.0))
            .with_prerequisites(vec!["watering_can".into()])
    }

    #[test]
    fn test_missing_prerequisite_and_gold_reported() {
        let mut service = service();
        let state = GameState::new(&SimulationConfig::default());
        let result = service.validate(&buy_greenhouse(), &state, 0.0);
        assert!(!result.satisfied);
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::MissingPrerequisite(id) if id.as_str() == "watering_can")));
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::InsufficientResource { .. })));
    }

    #[test]
    fn test_locked_area_reported() {
        let mut service = service();
        let state = GameState::new(&SimulationConfig::default());
        let action = GameAction::new("mine:copper_vein", ActionType::Mine, Screen::Mine, "mine");
        let result = service.validate(&action, &state, 0.0);
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::WrongLocation(Screen::Mine))));
    }

    #[test]
    fn test_digest_ignores_time_and_processes() {
        let mut a = GameState::new(&SimulationConfig::default());
        let mut b = a.clone();
        b.time = 9_999.0;
        b.tick = 42;
        b.last_decision_time = 5.0;
        assert_eq!(StateDigest::of(&a), StateDigest::of(&b));

        // Anything validation reads must change the digest
        a.resources.gold += 1.0;
        assert_ne!(StateDigest::of(&a), StateDigest::of(&b));
        a = b.clone();
        a.resources.add_items(&"turnip".into(), 1);
        assert_ne!(StateDigest::of(&a), StateDigest::of(&b));
        a = b.clone();
        a.progression.unlocked.insert("watering_can".into());
        assert_ne!(StateDigest::of(&a), StateDigest::of(&b));
        a = b.clone();
        a.progression.unlocked_areas.insert(Screen::Forge);
        assert_ne!(StateDigest::of(&a), StateDigest::of(&b));
    }

    #[test]
    fn test_stale_result_not_served_after_relevant_change() {
        let mut service = service();
        let mut state = GameState::new(&SimulationConfig::default());
        state.progression.unlocked.insert("watering_can".into());
        let action = buy_greenhouse();

        let before = service.validate(&action, &state, 0.0);
        assert!(!before.satisfied, "cannot afford 400 gold yet");

        state.resources.gold = 500.0;
        let after = service.validate(&action, &state, 1.0);
        assert!(after.satisfied, "gold change must key a fresh result");
    }

    #[test]
    fn test_repriced_action_id_keys_fresh_result() {
        // Watering reuses one id while its cost tracks the dry-plot
        // count, which the state digest does not see. A warm cheap
        // result must not answer for the repriced action.
        let mut service = service();
        let mut state = GameState::new(&SimulationConfig::default());
        state.resources.water = 5.0;

        let one_plot = GameAction::new("water:plots", ActionType::WaterPlots, Screen::Farm, "farm")
            .with_cost(ResourceCost {
                water: 4.0,
                ..ResourceCost::default()
            });
        assert!(service.validate(&one_plot, &state, 0.0).satisfied);

        let three_plots = GameAction::new("water:plots", ActionType::WaterPlots, Screen::Farm, "farm")
            .with_cost(ResourceCost {
                water: 12.0,
                ..ResourceCost::default()
            });
        let result = service.validate(&three_plots, &state, 0.0);
        assert!(!result.satisfied, "12.0 water against a 5.0 pool");
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::InsufficientResource { .. })));
    }

    #[test]
    fn test_ttl_clears_cache() {
        let mut service = ValidationService::new(&ContentTable::with_defaults(), 100.0);
        let state = GameState::new(&SimulationConfig::default());
        let action = buy_greenhouse();
        service.validate(&action, &state, 0.0);
        assert!(!service.cache.is_empty());
        service.validate(&action, &state, 150.0);
        assert_eq!(service.cache.len(), 1, "reset then repopulated");
        assert_eq!(service.last_reset, 150.0);
    }

    #[test]
    fn test_cyclic_prerequisite_flagged() {
        use crate::content::table::{ContentEntry, ItemCategory};
        let mut content = ContentTable::new();
        for (id, prereq) in [("a", "b"), ("b", "a")] {
            content.add(ContentEntry {
                id: id.into(),
                name: id.into(),
                category: ItemCategory::Upgrade,
                screen: Screen::Town,
                prerequisites: vec![prereq.into()],
                cost: ResourceCost::default(),
                value: 0.0,
                duration: None,
                yields: vec![],
                xp: 0,
                plot_grant: 0,
                milestone: None,
                effect: String::new(),
            });
        }
        let mut service = ValidationService::new(&content, 3_600.0);
        let state = GameState::new(&SimulationConfig::default());
        let action = GameAction::new("buy:a", ActionType::Buy, Screen::Town, "town")
            .with_prerequisites(vec!["b".into()]);
        let result = service.validate(&action, &state, 0.0);
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::CyclicPrerequisite(_))));
    }
}
