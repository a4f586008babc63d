//! Parameter overrides - path-keyed values merged over defaults
//!
//! An override set is a list of `{path, value, timestamp}` entries applied
//! over the default configuration and content table before `init`. Later
//! timestamps win. The merged result is immutable for the duration of a
//! tick; swapping a new set in is only legal between ticks.

use crate::content::table::ContentTable;
use crate::core::config::SimulationConfig;
use crate::core::error::{CroftError, Result};
use crate::core::types::ItemId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single path-keyed override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterOverride {
    /// Dotted path, e.g. `sim.tick_seconds`, `weights.farming`,
    /// `thresholds.water_low`, `limits.craft`, `content.turnip_seed.cost.gold`
    pub path: String,
    pub value: serde_json::Value,
    /// Ordering key; later overrides win on path collisions
    #[serde(default)]
    pub timestamp: u64,
}

/// An ordered set of overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideSet {
    pub overrides: Vec<ParameterOverride>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, value: serde_json::Value) {
        let timestamp = self.overrides.len() as u64;
        self.overrides.push(ParameterOverride {
            path: path.into(),
            value,
            timestamp,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Load an override set from a JSON file (array of overrides)
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let overrides: Vec<ParameterOverride> = serde_json::from_str(&contents)?;
        Ok(Self { overrides })
    }

    /// Apply all overrides to a config and content table, in timestamp order.
    ///
    /// Returns the list of applied paths. An unknown path or type mismatch
    /// is an error; a simulation must not silently run with a typo'd
    /// override during balance analysis.
    pub fn apply(
        &self,
        config: &mut SimulationConfig,
        content: &mut ContentTable,
    ) -> Result<Vec<String>> {
        let mut ordered: Vec<&ParameterOverride> = self.overrides.iter().collect();
        ordered.sort_by_key(|o| o.timestamp);

        let mut applied = Vec::with_capacity(ordered.len());
        for o in ordered {
            apply_one(o, config, content)?;
            tracing::debug!(path = %o.path, value = %o.value, "applied override");
            applied.push(o.path.clone());
        }
        Ok(applied)
    }
}

fn as_f64(o: &ParameterOverride) -> Result<f64> {
    o.value
        .as_f64()
        .ok_or_else(|| CroftError::OverrideError(format!("{}: expected a number", o.path)))
}

fn as_usize(o: &ParameterOverride) -> Result<usize> {
    o.value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| CroftError::OverrideError(format!("{}: expected an integer", o.path)))
}

fn apply_one(
    o: &ParameterOverride,
    config: &mut SimulationConfig,
    content: &mut ContentTable,
) -> Result<()> {
    let unknown = || CroftError::OverrideError(format!("unknown override path '{}'", o.path));
    let parts: Vec<&str> = o.path.split('.').collect();

    match parts.as_slice() {
        ["sim", field] => match *field {
            "seed" => {
                config.seed = o
                    .value
                    .as_u64()
                    .ok_or_else(|| CroftError::OverrideError(format!("{}: expected an integer", o.path)))?
            }
            "tick_seconds" => config.tick_seconds = as_f64(o)?,
            "speed" => config.speed = as_f64(o)?,
            "action_budget" => config.action_budget = as_usize(o)?,
            "snapshot_every_ticks" => config.snapshot_every_ticks = as_usize(o)? as u64,
            "stuck_days" => config.stuck_days = as_f64(o)?,
            "validation_cache_ttl" => config.validation_cache_ttl = as_f64(o)?,
            "victory_milestone" => {
                config.victory_milestone = o.value.as_str().map(str::to_string)
            }
            "start_gold" => config.start_gold = as_f64(o)?,
            "start_water" => config.start_water = as_f64(o)?,
            "start_energy" => config.start_energy = as_f64(o)?,
            "start_plots" => config.start_plots = as_usize(o)?,
            "water_capacity" => config.water_capacity = as_f64(o)?,
            "energy_capacity" => config.energy_capacity = as_f64(o)?,
            "water_per_plot" => config.water_per_plot = as_f64(o)?,
            "watering_duration" => config.watering_duration = as_f64(o)?,
            "refill_energy_cost" => config.refill_energy_cost = as_f64(o)?,
            "rest_energy_gain" => config.rest_energy_gain = as_f64(o)?,
            "energy_regen_per_hour" => config.energy_regen_per_hour = as_f64(o)?,
            "helper_gold_per_hour" => config.helper_gold_per_hour = as_f64(o)?,
            _ => return Err(unknown()),
        },
        ["thresholds", field] => match *field {
            "seed_buffer_min" => config.thresholds.seed_buffer_min = as_usize(o)? as u32,
            "water_low" => config.thresholds.water_low = as_f64(o)?,
            "energy_low" => config.thresholds.energy_low = as_f64(o)?,
            _ => return Err(unknown()),
        },
        ["weights", field] => {
            let w = &mut config.weights;
            match *field {
                "farming" => w.farming = as_f64(o)?,
                "commerce" => w.commerce = as_f64(o)?,
                "crafting" => w.crafting = as_f64(o)?,
                "mining" => w.mining = as_f64(o)?,
                "adventuring" => w.adventuring = as_f64(o)?,
                "training" => w.training = as_f64(o)?,
                "helpers" => w.helpers = as_f64(o)?,
                "maintenance" => w.maintenance = as_f64(o)?,
                "reward" => w.reward = as_f64(o)?,
                "urgency_spike" => w.urgency_spike = as_f64(o)?,
                "future_value" => w.future_value = as_f64(o)?,
                _ => return Err(unknown()),
            }
        }
        ["limits", field] => {
            let l = &mut config.process_limits;
            match *field {
                "growth" => l.growth = as_usize(o)?,
                "craft" => l.craft = as_usize(o)?,
                "mine" => l.mine = as_usize(o)?,
                "catch" => l.catch = as_usize(o)?,
                "adventure" => l.adventure = as_usize(o)?,
                "train" => l.train = as_usize(o)?,
                _ => return Err(unknown()),
            }
        }
        ["content", id, rest @ ..] => {
            let item = ItemId::from(*id);
            let entry = content
                .get_mut(&item)
                .ok_or_else(|| CroftError::OverrideError(format!("{}: unknown item", o.path)))?;
            match rest {
                ["cost", "gold"] => entry.cost.gold = as_f64(o)?,
                ["cost", "water"] => entry.cost.water = as_f64(o)?,
                ["cost", "energy"] => entry.cost.energy = as_f64(o)?,
                ["duration"] => entry.duration = Some(as_f64(o)?),
                ["value"] => entry.value = as_f64(o)?,
                ["xp"] => entry.xp = as_usize(o)? as u32,
                _ => return Err(unknown()),
            }
        }
        _ => return Err(unknown()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_config_override() {
        let mut config = SimulationConfig::default();
        let mut content = ContentTable::with_defaults();
        let mut set = OverrideSet::new();
        set.push("sim.tick_seconds", json!(30.0));
        set.push("weights.farming", json!(20.0));
        set.push("limits.craft", json!(2));

        let applied = set.apply(&mut config, &mut content).unwrap();
        assert_eq!(applied.len(), 3);
        assert_eq!(config.tick_seconds, 30.0);
        assert_eq!(config.weights.farming, 20.0);
        assert_eq!(config.process_limits.craft, 2);
    }

    #[test]
    fn test_apply_content_override() {
        let mut config = SimulationConfig::default();
        let mut content = ContentTable::with_defaults();
        let mut set = OverrideSet::new();
        set.push("content.turnip_seed.cost.gold", json!(9.0));
        set.push("content.turnip_seed.duration", json!(600.0));

        set.apply(&mut config, &mut content).unwrap();
        let entry = content.get(&"turnip_seed".into()).unwrap();
        assert_eq!(entry.cost.gold, 9.0);
        assert_eq!(entry.duration, Some(600.0));
    }

    #[test]
    fn test_later_timestamp_wins() {
        let mut config = SimulationConfig::default();
        let mut content = ContentTable::with_defaults();
        let set = OverrideSet {
            overrides: vec![
                ParameterOverride {
                    path: "sim.start_gold".into(),
                    value: json!(500.0),
                    timestamp: 10,
                },
                ParameterOverride {
                    path: "sim.start_gold".into(),
                    value: json!(100.0),
                    timestamp: 5,
                },
            ],
        };
        set.apply(&mut config, &mut content).unwrap();
        assert_eq!(config.start_gold, 500.0);
    }

    #[test]
    fn test_unknown_path_is_error() {
        let mut config = SimulationConfig::default();
        let mut content = ContentTable::with_defaults();
        let mut set = OverrideSet::new();
        set.push("sim.no_such_knob", json!(1.0));
        assert!(set.apply(&mut config, &mut content).is_err());
    }
}
