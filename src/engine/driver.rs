//! The tick driver
//!
//! One `step` runs the fixed tick order: advance time, system background
//! ticks, process updates, then up to `action_budget` decision passes.
//! A failing system tick is skipped and reported, never fatal; a failing
//! delta batch rolls back whole and surfaces as `ActionFailed`. Identical
//! seed, config, content and persona produce identical decision traces
//! and final states.

use crate::action::apply_deltas;
use crate::content::table::ContentTable;
use crate::core::config::SimulationConfig;
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::{SimTime, Tick, SECONDS_PER_DAY};
use crate::engine::decision::DecisionEngine;
use crate::engine::persona::Persona;
use crate::engine::trace::{ChosenRecord, DecisionRecord, DecisionTrace};
use crate::process::ProcessManager;
use crate::state::{GameState, StateSnapshot};
use crate::systems::{default_systems, GameSystem, SystemContext};
use crate::validation::ValidationService;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The configured victory milestone was reached
    Victory(String),
    /// No plot, level, or gold progress for the configured window;
    /// a valid analytical outcome, not an error
    Stuck,
    /// The requested number of days elapsed
    TimeLimit,
    /// The host asked the run to stop
    Stopped,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Victory(m) => write!(f, "victory: {}", m),
            TerminationReason::Stuck => write!(f, "stuck"),
            TerminationReason::TimeLimit => write!(f, "time limit"),
            TerminationReason::Stopped => write!(f, "stopped"),
        }
    }
}

/// Watches the progress axes that define "stuck": new maxima in plots,
/// level, or gold count as progress; spending gold back down does not.
#[derive(Debug, Clone)]
struct ProgressWatch {
    max_gold: f64,
    max_level: u32,
    max_plots: usize,
    last_progress: SimTime,
}

impl ProgressWatch {
    fn new(state: &GameState) -> Self {
        Self {
            max_gold: state.resources.gold,
            max_level: state.progression.level,
            max_plots: state.progression.plots.len(),
            last_progress: state.time,
        }
    }

    fn observe(&mut self, state: &GameState) {
        let mut progressed = false;
        if state.resources.gold > self.max_gold + 1e-9 {
            self.max_gold = state.resources.gold;
            progressed = true;
        }
        if state.progression.level > self.max_level {
            self.max_level = state.progression.level;
            progressed = true;
        }
        if state.progression.plots.len() > self.max_plots {
            self.max_plots = state.progression.plots.len();
            progressed = true;
        }
        if progressed {
            self.last_progress = state.time;
        }
    }

    fn is_stuck(&self, state: &GameState, stuck_days: f64) -> bool {
        state.time - self.last_progress >= stuck_days * SECONDS_PER_DAY
    }
}

/// Per-tick counters for the host and analysis tooling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickMetrics {
    /// Actions executed and applied this tick
    pub actions_taken: usize,
    /// Processes that ran to completion this tick
    pub processes_completed: usize,
    /// Wall time spent in decision passes, in microseconds
    pub decision_micros: u64,
}

/// What one tick produced
#[derive(Debug)]
pub struct TickOutput {
    pub tick: Tick,
    pub events: Vec<GameEvent>,
    pub metrics: TickMetrics,
    /// Present on the configured snapshot cadence and on the final tick
    pub snapshot: Option<StateSnapshot>,
    pub ended: Option<TerminationReason>,
}

/// End-of-run digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub termination: TerminationReason,
    pub ticks: Tick,
    pub days: f64,
    pub gold: f64,
    pub level: u32,
    pub milestones: Vec<String>,
    pub decisions: usize,
    pub final_state: StateSnapshot,
}

/// One simulation run: state, systems, and the decision engine
pub struct Simulation {
    config: SimulationConfig,
    content: ContentTable,
    state: GameState,
    systems: Vec<Box<dyn GameSystem>>,
    validation: ValidationService,
    processes: ProcessManager,
    engine: DecisionEngine,
    trace: DecisionTrace,
    watch: ProgressWatch,
    speed: f64,
    ended: Option<TerminationReason>,
}

impl Simulation {
    /// Build a run. Configuration or content problems here are fatal.
    pub fn new(config: SimulationConfig, content: ContentTable, persona: Persona) -> Result<Self> {
        config.validate()?;
        content.validate()?;
        let state = GameState::new(&config);
        let validation = ValidationService::new(&content, config.validation_cache_ttl);
        let processes = ProcessManager::with_defaults(&config);
        let engine = DecisionEngine::new(
            persona.clone(),
            ChaCha8Rng::seed_from_u64(config.seed),
        );
        let trace = DecisionTrace::new(persona.name(), config.seed);
        info!(
            run_id = %trace.run_id,
            persona = persona.name(),
            seed = config.seed,
            "simulation initialized"
        );
        Ok(Self {
            watch: ProgressWatch::new(&state),
            speed: config.speed,
            state,
            systems: default_systems(),
            validation,
            processes,
            engine,
            trace,
            content,
            config,
            ended: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Scenario and tooling hook; the engine itself only mutates state
    /// inside `step`
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentTable {
        &self.content
    }

    pub fn trace(&self) -> &DecisionTrace {
        &self.trace
    }

    pub fn ended(&self) -> Option<&TerminationReason> {
        self.ended.as_ref()
    }

    /// Change the speed multiplier; takes effect on the next tick
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if speed <= 0.0 {
            return Err(CroftError::ConfigError("speed must be positive".into()));
        }
        self.speed = speed;
        Ok(())
    }

    /// Stop the run from outside (host request)
    pub fn stop(&mut self) {
        if self.ended.is_none() {
            self.ended = Some(TerminationReason::Stopped);
        }
    }

    /// Advance one tick
    pub fn step(&mut self) -> Result<TickOutput> {
        if let Some(reason) = &self.ended {
            return Ok(TickOutput {
                tick: self.state.tick,
                events: Vec::new(),
                metrics: TickMetrics::default(),
                snapshot: None,
                ended: Some(reason.clone()),
            });
        }

        let dt = self.config.tick_seconds * self.speed;
        let window_start = self.state.time;
        self.state.time += dt;
        self.state.tick += 1;
        let mut events = Vec::new();
        let mut metrics = TickMetrics::default();

        let Self {
            systems,
            validation,
            processes,
            content,
            config,
            state,
            engine,
            trace,
            ..
        } = self;
        let mut ctx = SystemContext {
            content,
            config,
            validation,
            processes,
        };

        // Background system effects; a failing system is skipped this tick
        for system in systems.iter_mut() {
            match system.tick(state, &mut ctx, dt) {
                Ok(mut system_events) => events.append(&mut system_events),
                Err(err) => {
                    warn!(system = system.name(), %err, "system tick skipped");
                    events.push(GameEvent::SystemSkipped {
                        system: system.name().into(),
                        detail: err.to_string(),
                    });
                }
            }
        }

        // Process updates and completions over this window
        let process_events = ctx.processes.tick(state, ctx.content, dt, window_start);
        metrics.processes_completed = process_events
            .iter()
            .filter(|e| matches!(e, GameEvent::ProcessCompleted { .. }))
            .count();
        events.extend(process_events);

        // Decision passes
        for _ in 0..config.action_budget {
            let started = Instant::now();
            let outcome = engine.decide(state, systems.as_slice(), &mut ctx);
            events.extend(outcome.events);
            if !outcome.acted {
                break;
            }

            let mut chosen_record = None;
            if let Some((action, breakdown)) = outcome.chosen {
                let system = systems
                    .iter_mut()
                    .find(|s| s.name() == action.system)
                    .ok_or_else(|| CroftError::SystemError {
                        system: action.system.clone(),
                        detail: "chosen action has no owning system".into(),
                    })?;
                let executed = system
                    .execute(&action, state, &mut ctx)
                    .and_then(|result| {
                        let now = state.time;
                        apply_deltas(state, &result.deltas, ctx.content, ctx.config, ctx.processes, now)
                            .map(|delta_events| (result, delta_events))
                    });
                match executed {
                    Ok((result, delta_events)) => {
                        events.push(GameEvent::ActionExecuted {
                            action_id: action.id.clone(),
                            description: result.description.clone(),
                        });
                        events.extend(delta_events);
                        events.extend(result.events);
                        state.last_decision_time = state.time;
                        metrics.actions_taken += 1;
                        chosen_record = Some(ChosenRecord {
                            action_id: action.id.clone(),
                            description: result.description,
                            breakdown,
                        });
                    }
                    Err(err) => {
                        warn!(action = %action.id, %err, "action failed");
                        events.push(GameEvent::ActionFailed {
                            action_id: action.id.clone(),
                            reason: err.to_string(),
                        });
                    }
                }
            }

            let acted_on_something = chosen_record.is_some();
            let decision_micros = started.elapsed().as_micros() as u64;
            metrics.decision_micros += decision_micros;
            trace.record(DecisionRecord {
                tick: state.tick,
                time: state.time,
                candidates_considered: outcome.candidates_considered,
                rejected: outcome.rejected,
                chosen: chosen_record,
                emergency: outcome.emergency,
                decision_micros,
            });
            if !acted_on_something {
                break;
            }
        }

        // Termination checks
        self.watch.observe(&self.state);
        if let Some(milestone) = &self.config.victory_milestone {
            if self.state.progression.milestones.contains(milestone) {
                self.ended = Some(TerminationReason::Victory(milestone.clone()));
            }
        }
        if self.ended.is_none() && self.watch.is_stuck(&self.state, self.config.stuck_days) {
            self.ended = Some(TerminationReason::Stuck);
        }

        if let Some(reason) = &self.ended {
            info!(tick = self.state.tick, %reason, "run ended");
            events.push(GameEvent::RunEnded {
                tick: self.state.tick,
                reason: reason.to_string(),
            });
        }

        let snapshot_due = self.config.snapshot_every_ticks > 0
            && self.state.tick % self.config.snapshot_every_ticks == 0;
        let snapshot = (snapshot_due || self.ended.is_some())
            .then(|| StateSnapshot::capture(&self.state));

        Ok(TickOutput {
            tick: self.state.tick,
            events,
            metrics,
            snapshot,
            ended: self.ended.clone(),
        })
    }

    /// Run for up to `days` simulated days or until the run ends on its own
    pub fn run_days(&mut self, days: f64) -> Result<RunSummary> {
        let end_time = self.state.time + days * SECONDS_PER_DAY;
        while self.state.time < end_time && self.ended.is_none() {
            self.step()?;
        }
        Ok(self.summary())
    }

    /// Digest of the run so far
    pub fn summary(&self) -> RunSummary {
        let mut milestones: Vec<String> =
            self.state.progression.milestones.iter().cloned().collect();
        milestones.sort();
        RunSummary {
            termination: self
                .ended
                .clone()
                .unwrap_or(TerminationReason::TimeLimit),
            ticks: self.state.tick,
            days: self.state.time / SECONDS_PER_DAY,
            gold: self.state.resources.gold,
            level: self.state.progression.level,
            milestones,
            decisions: self.trace.len(),
            final_state: StateSnapshot::capture(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(persona: &str) -> Simulation {
        Simulation::new(
            SimulationConfig::default(),
            ContentTable::with_defaults(),
            Persona::builtin(persona).unwrap(),
        )
        .expect("simulation builds")
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = SimulationConfig::default();
        config.tick_seconds = 0.0;
        assert!(Simulation::new(
            config,
            ContentTable::with_defaults(),
            Persona::builtin("casual").unwrap()
        )
        .is_err());
    }

    #[test]
    fn test_step_advances_time_and_tick() {
        let mut sim = sim("casual");
        let output = sim.step().unwrap();
        assert_eq!(output.tick, 1);
        assert_eq!(sim.state().time, sim.config().tick_seconds);
    }

    #[test]
    fn test_tick_metrics_count_actions_and_completions() {
        let mut sim = sim("casual");
        let output = sim.step().unwrap();
        let executed = output
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ActionExecuted { .. }))
            .count();
        assert_eq!(output.metrics.actions_taken, executed);
        assert!(
            output.metrics.actions_taken >= 1,
            "the first check-in acts on the starter farm"
        );
        assert_eq!(output.metrics.processes_completed, 0);
    }

    #[test]
    fn test_snapshot_cadence() {
        let mut sim = sim("idle");
        let mut snapshots = 0;
        for _ in 0..120 {
            if sim.step().unwrap().snapshot.is_some() {
                snapshots += 1;
            }
        }
        // Every 60 ticks by default
        assert_eq!(snapshots, 2);
    }

    #[test]
    fn test_victory_ends_run() {
        let mut config = SimulationConfig::default();
        config.victory_milestone = Some("greenhouse_built".into());
        let mut sim = Simulation::new(
            config,
            ContentTable::with_defaults(),
            Persona::builtin("casual").unwrap(),
        )
        .unwrap();
        sim.state_mut()
            .progression
            .milestones
            .insert("greenhouse_built".into());
        let output = sim.step().unwrap();
        assert_eq!(
            output.ended,
            Some(TerminationReason::Victory("greenhouse_built".into()))
        );
        assert!(output
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::RunEnded { .. })));
        assert!(output.snapshot.is_some(), "final tick always snapshots");

        // Further steps are no-ops
        let after = sim.step().unwrap();
        assert!(after.events.is_empty());
        assert_eq!(sim.state().tick, output.tick);
    }

    #[test]
    fn test_stuck_detection_is_a_valid_outcome() {
        let mut config = SimulationConfig::default();
        config.stuck_days = 0.25;
        let mut sim = Simulation::new(
            config,
            ContentTable::with_defaults(),
            Persona::builtin("idle").unwrap(),
        )
        .unwrap();
        // Strip the economy so nothing can make progress
        {
            let state = sim.state_mut();
            state.resources.gold = 0.0;
            state.resources.water = 0.0;
            state.resources.energy = 0.0;
            state.resources.items.clear();
        }
        let summary = sim.run_days(2.0).unwrap();
        assert_eq!(summary.termination, TerminationReason::Stuck);
        assert!(summary.days < 2.0);
    }
}
