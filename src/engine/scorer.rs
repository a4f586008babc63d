//! Action scoring
//!
//! Score order is fixed: category base plus reward term, urgency spike if
//! the action addresses an active shortage, future-value bonus for targets
//! that gate further content, and the persona multiplier strictly last.
//! Ranking ties break on cheaper cost, then action id, so selection is
//! fully deterministic.

use crate::action::{ActionType, GameAction};
use crate::content::table::{ContentTable, ItemCategory};
use crate::core::config::SimulationConfig;
use crate::core::types::ActionCategory;
use crate::engine::decision::ShortageReport;
use crate::engine::persona::Persona;
use crate::validation::PrerequisiteGraph;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// The components of one action's score, kept for the decision trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub reward: f64,
    /// Whether the urgency spike multiplier was applied
    pub urgent: bool,
    pub future_value: f64,
    pub persona_multiplier: f64,
    pub total: f64,
}

fn base_weight(config: &SimulationConfig, category: ActionCategory) -> f64 {
    let w = &config.weights;
    match category {
        ActionCategory::Farming => w.farming,
        ActionCategory::Commerce => w.commerce,
        ActionCategory::Crafting => w.crafting,
        ActionCategory::Mining => w.mining,
        ActionCategory::Adventuring => w.adventuring,
        ActionCategory::Training => w.training,
        ActionCategory::Helpers => w.helpers,
        ActionCategory::Maintenance => w.maintenance,
    }
}

/// Content gated behind an action's target: prerequisite dependents, or
/// for an area key, everything on the screen it opens
fn unlock_count(action: &GameAction, content: &ContentTable, graph: &PrerequisiteGraph) -> usize {
    let relevant = matches!(
        action.action_type,
        ActionType::Buy | ActionType::Craft | ActionType::Train
    );
    if !relevant {
        return 0;
    }
    let Some(target) = &action.target else {
        return 0;
    };
    let Some(entry) = content.get(target) else {
        return 0;
    };
    if entry.category == ItemCategory::AreaKey {
        content
            .by_screen(entry.screen)
            .filter(|e| e.id != entry.id)
            .count()
    } else {
        graph.dependent_count(target)
    }
}

/// Score one admitted action
pub fn score_action(
    action: &GameAction,
    content: &ContentTable,
    config: &SimulationConfig,
    graph: &PrerequisiteGraph,
    shortages: &ShortageReport,
    persona: &Persona,
) -> ScoreBreakdown {
    let category = action.action_type.category();
    let base = base_weight(config, category);
    let reward = action.expected_reward * config.weights.reward;
    let mut subtotal = base + reward;

    let urgent = shortages.addressed_by(action, content);
    if urgent {
        subtotal *= config.weights.urgency_spike;
    }

    let future_value = unlock_count(action, content, graph) as f64 * config.weights.future_value;
    let persona_multiplier = persona.multiplier(category);
    let total = (subtotal + future_value) * persona_multiplier;

    ScoreBreakdown {
        base,
        reward,
        urgent,
        future_value,
        persona_multiplier,
        total,
    }
}

/// Sort scored actions: highest score first, cheaper cost then action id
/// as deterministic tie-breaks
pub fn rank(scored: &mut [(GameAction, ScoreBreakdown)]) {
    scored.sort_by(|a, b| {
        OrderedFloat(b.1.total)
            .cmp(&OrderedFloat(a.1.total))
            .then_with(|| {
                OrderedFloat(a.0.cost.magnitude()).cmp(&OrderedFloat(b.0.cost.magnitude()))
            })
            .then_with(|| a.0.id.cmp(&b.0.id))
    });
}
