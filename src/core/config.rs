//! Simulation configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their purpose.
//! Parameter overrides (see `content::overrides`) are merged over these
//! defaults before a run starts; the set is immutable for the duration of
//! a tick and may only be swapped between ticks.

use crate::core::error::{CroftError, Result};
use serde::{Deserialize, Serialize};

/// Shortage thresholds that trigger urgency scoring and emergency mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortageThresholds {
    /// Minimum seed buffer across all seed types before restocking spikes
    pub seed_buffer_min: u32,
    /// Water pool level under which watering-related urgency spikes
    pub water_low: f64,
    /// Energy pool level under which rest urgency spikes
    pub energy_low: f64,
}

impl Default for ShortageThresholds {
    fn default() -> Self {
        Self {
            seed_buffer_min: 2,
            water_low: 5.0,
            energy_low: 15.0,
        }
    }
}

/// Weights for action scoring
///
/// Base scores are keyed by action category; urgency and future-value terms
/// are applied on top, and the persona multiplier is always applied last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Base score for farming actions (plant, water, harvest)
    pub farming: f64,
    /// Base score for commerce actions (buy, sell, refill, rest)
    pub commerce: f64,
    /// Base score for crafting actions
    pub crafting: f64,
    /// Base score for mining expeditions
    pub mining: f64,
    /// Base score for adventuring (catching, quests)
    pub adventuring: f64,
    /// Base score for training
    pub training: f64,
    /// Base score for helper management
    pub helpers: f64,
    /// Base score for maintenance actions (emergency refills, rest)
    pub maintenance: f64,
    /// Multiplier for an action's expected reward estimate
    pub reward: f64,
    /// Urgency multiplier applied when a shortage threshold is crossed
    pub urgency_spike: f64,
    /// Per-dependent bonus for actions whose target unlocks further content
    pub future_value: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            farming: 10.0,
            commerce: 6.0,
            crafting: 8.0,
            mining: 7.0,
            adventuring: 6.0,
            training: 5.0,
            helpers: 4.0,
            maintenance: 5.0,
            reward: 0.2,
            urgency_spike: 5.0,
            future_value: 1.5,
        }
    }
}

/// Concurrency limits per process kind
///
/// Starting a process of a kind at its limit is rejected outright, never
/// queued or overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessLimits {
    pub growth: usize,
    pub craft: usize,
    pub mine: usize,
    pub catch: usize,
    pub adventure: usize,
    pub train: usize,
}

impl Default for ProcessLimits {
    fn default() -> Self {
        Self {
            growth: 16,
            craft: 1,
            mine: 2,
            catch: 1,
            adventure: 1,
            train: 1,
        }
    }
}

/// Configuration for a single simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed; identical seeds with identical config and persona produce
    /// identical decision logs and final states
    pub seed: u64,

    /// Simulated seconds advanced per tick at speed 1.0
    ///
    /// At the default (60s), one simulated day is 1440 ticks. Speed changes
    /// rescale this, never the decision logic or execution order.
    pub tick_seconds: f64,

    /// Initial speed multiplier (host may change it between ticks)
    pub speed: f64,

    /// How many actions the decision engine may take per tick
    pub action_budget: usize,

    /// Snapshot emission cadence, in ticks, over the host boundary
    pub snapshot_every_ticks: u64,

    /// Run terminates as "stuck" after this many simulated days without
    /// any plot, level, or gold increase. A valid analytical outcome.
    pub stuck_days: f64,

    /// Validation cache lifetime in simulated seconds before a forced reset
    pub validation_cache_ttl: f64,

    /// Milestone whose completion ends the run as a victory
    pub victory_milestone: Option<String>,

    // === STARTING STATE ===
    /// Gold at run start
    pub start_gold: f64,
    /// Water at run start
    pub start_water: f64,
    /// Energy at run start
    pub start_energy: f64,
    /// Farm plots at run start
    pub start_plots: usize,

    // === POOL CAPS ===
    /// Water pool capacity (refilled at the town well)
    pub water_capacity: f64,
    /// Energy pool capacity
    pub energy_capacity: f64,

    // === FARMING ===
    /// Water spent to water one plot
    pub water_per_plot: f64,
    /// How long one watering keeps a plot growing, in simulated seconds
    pub watering_duration: f64,

    // === TOWN ===
    /// Energy cost of refilling the water pool at the well
    pub refill_energy_cost: f64,
    /// Energy restored by one rest action
    pub rest_energy_gain: f64,
    /// Passive energy regeneration per simulated hour
    pub energy_regen_per_hour: f64,

    // === HELPERS ===
    /// Gold generated per helper per simulated hour
    pub helper_gold_per_hour: f64,

    /// Shortage thresholds
    pub thresholds: ShortageThresholds,
    /// Scoring weights
    pub weights: ScoreWeights,
    /// Per-kind process concurrency limits
    pub process_limits: ProcessLimits,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            tick_seconds: 60.0,
            speed: 1.0,
            action_budget: 1,
            snapshot_every_ticks: 60,
            stuck_days: 3.0,
            validation_cache_ttl: 3_600.0,
            victory_milestone: None,

            start_gold: 50.0,
            start_water: 20.0,
            start_energy: 100.0,
            start_plots: 3,

            water_capacity: 40.0,
            energy_capacity: 100.0,

            water_per_plot: 4.0,
            watering_duration: 6.0 * 3_600.0,

            refill_energy_cost: 2.0,
            rest_energy_gain: 30.0,
            energy_regen_per_hour: 1.0,

            helper_gold_per_hour: 5.0,

            thresholds: ShortageThresholds::default(),
            weights: ScoreWeights::default(),
            process_limits: ProcessLimits::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_seconds <= 0.0 {
            return Err(CroftError::ConfigError(
                "tick_seconds must be positive".into(),
            ));
        }
        if self.speed <= 0.0 {
            return Err(CroftError::ConfigError("speed must be positive".into()));
        }
        if self.action_budget == 0 {
            return Err(CroftError::ConfigError(
                "action_budget must be at least 1".into(),
            ));
        }
        if self.stuck_days <= 0.0 {
            return Err(CroftError::ConfigError("stuck_days must be positive".into()));
        }
        if self.water_capacity < self.start_water {
            return Err(CroftError::ConfigError(format!(
                "start_water ({}) exceeds water_capacity ({})",
                self.start_water, self.water_capacity
            )));
        }
        if self.energy_capacity < self.start_energy {
            return Err(CroftError::ConfigError(format!(
                "start_energy ({}) exceeds energy_capacity ({})",
                self.start_energy, self.energy_capacity
            )));
        }
        if self.thresholds.water_low >= self.water_capacity {
            return Err(CroftError::ConfigError(
                "water_low threshold must be below water_capacity".into(),
            ));
        }
        Ok(())
    }
}
