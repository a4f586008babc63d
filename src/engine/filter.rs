//! Candidate filtering
//!
//! Filtering is pure: it partitions candidates into admitted and rejected
//! without touching state, and its admission test is each owning system's
//! `can_execute`. An admitted action is therefore executable against this
//! exact state by construction.

use crate::action::GameAction;
use crate::state::GameState;
use crate::systems::{GameSystem, SystemContext};
use crate::validation::ValidationIssue;
use serde::{Deserialize, Serialize};

/// A candidate that did not survive filtering, with its reasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub action_id: String,
    pub issues: Vec<ValidationIssue>,
}

/// Result of filtering one candidate set
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub admitted: Vec<GameAction>,
    pub rejected: Vec<RejectedCandidate>,
}

/// Partition candidates by executability
pub fn filter_candidates(
    candidates: Vec<GameAction>,
    systems: &[Box<dyn GameSystem>],
    state: &GameState,
    ctx: &mut SystemContext,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for action in candidates {
        let Some(system) = systems.iter().find(|s| s.name() == action.system) else {
            outcome.rejected.push(RejectedCandidate {
                action_id: action.id.clone(),
                issues: Vec::new(),
            });
            continue;
        };
        let result = system.can_execute(&action, state, ctx);
        if result.satisfied {
            outcome.admitted.push(action);
        } else {
            outcome.rejected.push(RejectedCandidate {
                action_id: action.id.clone(),
                issues: result.issues,
            });
        }
    }
    outcome
}
