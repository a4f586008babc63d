//! Player personas - who is "playing" the balance run
//!
//! A persona is pure data: how often it sits down to play (with separate
//! weekday and weekend cadence) and how it weights action categories. The
//! persona multiplier is always the last factor applied to a score, so a
//! persona can bias choices but never resurrect a filtered action.

use crate::core::error::{CroftError, Result};
use crate::core::types::ActionCategory;
use crate::state::{GameState, NEVER};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub name: String,
    pub description: String,
    /// Minimum simulated seconds between play sessions on weekdays
    pub weekday_interval: f64,
    /// Minimum simulated seconds between play sessions on weekends
    pub weekend_interval: f64,
    /// Score multiplier per action category; unlisted categories get 1.0
    #[serde(default)]
    pub multipliers: AHashMap<ActionCategory, f64>,
}

/// A persona driving one run
#[derive(Debug, Clone)]
pub struct Persona {
    profile: PersonaProfile,
}

impl Persona {
    pub fn new(profile: PersonaProfile) -> Result<Self> {
        if profile.weekday_interval <= 0.0 || profile.weekend_interval <= 0.0 {
            return Err(CroftError::ConfigError(format!(
                "persona '{}' has a non-positive session interval",
                profile.name
            )));
        }
        Ok(Self { profile })
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn description(&self) -> &str {
        &self.profile.description
    }

    /// Session interval applicable right now
    pub fn interval(&self, weekend: bool) -> f64 {
        if weekend {
            self.profile.weekend_interval
        } else {
            self.profile.weekday_interval
        }
    }

    /// Whether enough time has passed since the last decision for this
    /// persona to play again. `jitter` scales the interval (cadence noise
    /// from the run's seeded RNG).
    pub fn wants_to_act(&self, state: &GameState, jitter: f64) -> bool {
        if state.last_decision_time == NEVER {
            return true;
        }
        let interval = self.interval(state.is_weekend()) * jitter;
        state.time - state.last_decision_time >= interval
    }

    pub fn multiplier(&self, category: ActionCategory) -> f64 {
        self.profile
            .multipliers
            .get(&category)
            .copied()
            .unwrap_or(1.0)
    }

    /// Look up one of the built-in personas by name
    pub fn builtin(name: &str) -> Option<Self> {
        builtin_profiles()
            .into_iter()
            .find(|p| p.name == name)
            .map(|profile| Self { profile })
    }

    /// Names of the built-in personas
    pub fn builtin_names() -> Vec<String> {
        builtin_profiles().into_iter().map(|p| p.name).collect()
    }
}

fn multipliers(pairs: &[(ActionCategory, f64)]) -> AHashMap<ActionCategory, f64> {
    pairs.iter().copied().collect()
}

fn builtin_profiles() -> Vec<PersonaProfile> {
    vec![
        PersonaProfile {
            name: "casual".into(),
            description: "Plays a few sessions a day, likes tending the farm".into(),
            weekday_interval: 4.0 * 3_600.0,
            weekend_interval: 2.0 * 3_600.0,
            multipliers: multipliers(&[
                (ActionCategory::Farming, 1.2),
                (ActionCategory::Adventuring, 0.9),
                (ActionCategory::Crafting, 0.8),
                (ActionCategory::Mining, 0.8),
                (ActionCategory::Training, 0.7),
            ]),
        },
        PersonaProfile {
            name: "speedrunner".into(),
            description: "Checks in constantly, chases unlocks over comfort".into(),
            weekday_interval: 1_800.0,
            weekend_interval: 1_800.0,
            multipliers: multipliers(&[
                (ActionCategory::Commerce, 1.4),
                (ActionCategory::Crafting, 1.3),
                (ActionCategory::Mining, 1.2),
                (ActionCategory::Farming, 1.0),
                (ActionCategory::Maintenance, 0.9),
            ]),
        },
        PersonaProfile {
            name: "idle".into(),
            description: "Logs in twice a day, wants the farm to run itself".into(),
            weekday_interval: 12.0 * 3_600.0,
            weekend_interval: 12.0 * 3_600.0,
            multipliers: multipliers(&[
                (ActionCategory::Helpers, 2.0),
                (ActionCategory::Commerce, 1.1),
                (ActionCategory::Farming, 0.8),
                (ActionCategory::Adventuring, 0.6),
            ]),
        },
        PersonaProfile {
            name: "weekender".into(),
            description: "Barely plays on weekdays, binges on weekends".into(),
            weekday_interval: 24.0 * 3_600.0,
            weekend_interval: 3_600.0,
            multipliers: multipliers(&[
                (ActionCategory::Adventuring, 1.3),
                (ActionCategory::Mining, 1.1),
            ]),
        },
    ]
}

#[derive(Deserialize)]
struct PersonaFile {
    #[serde(default)]
    personas: Vec<PersonaProfile>,
}

/// Parse personas from TOML (`[[personas]]` blocks)
pub fn parse_personas(text: &str) -> Result<Vec<Persona>> {
    let file: PersonaFile = toml::from_str(text)?;
    if file.personas.is_empty() {
        return Err(CroftError::ConfigError(
            "persona file defines no personas".into(),
        ));
    }
    file.personas.into_iter().map(Persona::new).collect()
}

/// Load personas from a TOML file on disk
pub fn load_personas(path: &Path) -> Result<Vec<Persona>> {
    parse_personas(&std::fs::read_to_string(path)?)
}
