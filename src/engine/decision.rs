//! The decision engine
//!
//! One decision pass runs the full pipeline: shortage scan, emergency
//! check, persona cadence gate, candidate generation across all systems,
//! filtering, scoring, and deterministic selection. Emergencies override
//! the cadence gate and narrow the candidate set to actions that address
//! the emergency, falling back to the full set if none of those are
//! executable.

use crate::action::{ActionType, GameAction};
use crate::content::table::{ContentTable, ItemCategory};
use crate::core::config::ShortageThresholds;
use crate::core::events::GameEvent;
use crate::core::types::ResourceKind;
use crate::engine::filter::{filter_candidates, FilterOutcome, RejectedCandidate};
use crate::engine::persona::Persona;
use crate::engine::scorer::{rank, score_action, ScoreBreakdown};
use crate::state::GameState;
use crate::systems::{GameSystem, SystemContext};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Active shortages, scanned at the top of every decision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortageReport {
    /// Seed inventory below the configured buffer
    pub seeds: bool,
    /// Water pool below threshold
    pub water: bool,
    /// Energy pool below threshold
    pub energy: bool,
    /// At least one growth process stalled dry
    pub stalled_growth: bool,
}

impl ShortageReport {
    pub fn scan(state: &GameState, content: &ContentTable, thresholds: &ShortageThresholds) -> Self {
        Self {
            seeds: state.seed_count(content) < thresholds.seed_buffer_min,
            water: state.resources.water < thresholds.water_low,
            energy: state.resources.energy < thresholds.energy_low,
            stalled_growth: state.has_stalled_growth(),
        }
    }

    pub fn any(&self) -> bool {
        self.seeds || self.water || self.energy || self.stalled_growth
    }

    /// Whether executing this action would relieve one of the shortages
    pub fn addressed_by(&self, action: &GameAction, content: &ContentTable) -> bool {
        match action.action_type {
            ActionType::RefillWater => self.water,
            ActionType::Rest => self.energy,
            ActionType::WaterPlots => self.stalled_growth,
            ActionType::Buy => {
                self.seeds
                    && action
                        .target
                        .as_ref()
                        .and_then(|t| content.get(t))
                        .is_some_and(|e| e.category == ItemCategory::Seed)
            }
            _ => false,
        }
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.seeds {
            parts.push("seed buffer empty");
        }
        if self.water {
            parts.push("water low");
        }
        if self.energy {
            parts.push("energy low");
        }
        if self.stalled_growth {
            parts.push("growth stalled");
        }
        parts.join(", ")
    }
}

/// What one decision pass concluded
#[derive(Debug, Default)]
pub struct DecisionOutcome {
    /// Chosen action with its score breakdown, if the engine acted
    pub chosen: Option<(GameAction, ScoreBreakdown)>,
    /// Emergency description, if this pass ran in emergency mode
    pub emergency: Option<String>,
    /// Shortage / emergency edge events raised by this pass
    pub events: Vec<GameEvent>,
    pub candidates_considered: usize,
    pub rejected: Vec<RejectedCandidate>,
    /// False when the persona cadence gate skipped the pass entirely
    pub acted: bool,
}

/// Runs the decision pipeline for one persona
pub struct DecisionEngine {
    persona: Persona,
    rng: ChaCha8Rng,
    /// Previous pass's shortages, for edge-triggered events
    last_shortages: ShortageReport,
}

impl DecisionEngine {
    pub fn new(persona: Persona, rng: ChaCha8Rng) -> Self {
        Self {
            persona,
            rng,
            last_shortages: ShortageReport::default(),
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Shortage events for thresholds crossed since the last pass
    fn edge_events(&mut self, state: &GameState, shortages: &ShortageReport) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if shortages.water && !self.last_shortages.water {
            events.push(GameEvent::Shortage {
                resource: ResourceKind::Water,
                level: state.resources.water,
            });
        }
        if shortages.energy && !self.last_shortages.energy {
            events.push(GameEvent::Shortage {
                resource: ResourceKind::Energy,
                level: state.resources.energy,
            });
        }
        if shortages.any() && !self.last_shortages.any() {
            events.push(GameEvent::Emergency {
                reason: shortages.describe(),
            });
        }
        self.last_shortages = shortages.clone();
        events
    }

    /// Run one full decision pass. Does not execute the chosen action;
    /// the driver owns execution and delta application.
    pub fn decide(
        &mut self,
        state: &GameState,
        systems: &[Box<dyn GameSystem>],
        ctx: &mut SystemContext,
    ) -> DecisionOutcome {
        let shortages = ShortageReport::scan(state, ctx.content, &ctx.config.thresholds);
        let emergency = shortages.any().then(|| shortages.describe());
        let mut outcome = DecisionOutcome {
            events: self.edge_events(state, &shortages),
            emergency: emergency.clone(),
            ..DecisionOutcome::default()
        };

        // Cadence gate; emergencies play through it
        let jitter = self.rng.gen_range(0.9..1.1);
        if emergency.is_none() && !self.persona.wants_to_act(state, jitter) {
            return outcome;
        }
        outcome.acted = true;

        let mut candidates = Vec::new();
        for system in systems {
            candidates.extend(system.evaluate_actions(state, ctx));
        }
        outcome.candidates_considered = candidates.len();

        // In an emergency, prefer the candidates that fix it
        let outcome_filter = if emergency.is_some() {
            let (fixing, rest): (Vec<_>, Vec<_>) = candidates
                .into_iter()
                .partition(|a| shortages.addressed_by(a, ctx.content));
            let fixing_outcome = filter_candidates(fixing, systems, state, ctx);
            if fixing_outcome.admitted.is_empty() {
                // Nothing executable fixes it; play on normally
                let mut full = filter_candidates(rest, systems, state, ctx);
                full.rejected.extend(fixing_outcome.rejected);
                full
            } else {
                fixing_outcome
            }
        } else {
            filter_candidates(candidates, systems, state, ctx)
        };
        let FilterOutcome { admitted, rejected } = outcome_filter;
        outcome.rejected = rejected;

        let mut scored: Vec<(GameAction, ScoreBreakdown)> = admitted
            .into_iter()
            .map(|action| {
                let breakdown = score_action(
                    &action,
                    ctx.content,
                    ctx.config,
                    ctx.validation.graph(),
                    &shortages,
                    &self.persona,
                );
                (action, breakdown)
            })
            .collect();
        rank(&mut scored);

        if let Some((action, breakdown)) = scored.into_iter().next() {
            debug!(
                action = %action.id,
                score = breakdown.total,
                emergency = emergency.is_some(),
                "decision"
            );
            outcome.chosen = Some((action, breakdown));
        }
        outcome
    }
}
