//! Decision trace - the analyzable record of a run
//!
//! Every decision pass that acted appends one record: what was considered,
//! what was rejected and why, what was chosen with its full score
//! breakdown, and how long the pass took in wall-clock microseconds.

use crate::core::error::Result;
use crate::core::types::{SimTime, Tick};
use crate::engine::filter::RejectedCandidate;
use crate::engine::scorer::ScoreBreakdown;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// The chosen action of one decision, with its scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChosenRecord {
    pub action_id: String,
    pub description: String,
    pub breakdown: ScoreBreakdown,
}

/// One decision pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub tick: Tick,
    pub time: SimTime,
    pub candidates_considered: usize,
    pub rejected: Vec<RejectedCandidate>,
    pub chosen: Option<ChosenRecord>,
    /// Emergency description when the pass ran in emergency mode
    pub emergency: Option<String>,
    /// Wall-clock duration of the decision pass
    pub decision_micros: u64,
}

/// Full trace of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub run_id: Uuid,
    pub persona: String,
    pub seed: u64,
    pub records: Vec<DecisionRecord>,
}

impl DecisionTrace {
    pub fn new(persona: impl Into<String>, seed: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            persona: persona.into(),
            seed,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, record: DecisionRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Action ids chosen over the run, in order; the comparison key for
    /// determinism checks
    pub fn chosen_ids(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|r| r.chosen.as_ref().map(|c| c.action_id.as_str()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_roundtrips_through_json() {
        let mut trace = DecisionTrace::new("casual", 42);
        trace.record(DecisionRecord {
            tick: 10,
            time: 600.0,
            candidates_considered: 5,
            rejected: vec![],
            chosen: Some(ChosenRecord {
                action_id: "plant:turnip_seed:plot0".into(),
                description: "planted turnip_seed on plot 0".into(),
                breakdown: ScoreBreakdown {
                    base: 10.0,
                    reward: 2.4,
                    urgent: false,
                    future_value: 0.0,
                    persona_multiplier: 1.2,
                    total: 14.88,
                },
            }),
            emergency: None,
            decision_micros: 120,
        });
        let json = trace.to_json().unwrap();
        let decoded: DecisionTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.chosen_ids(), vec!["plant:turnip_seed:plot0"]);
        assert_eq!(decoded.seed, 42);
    }
}
