//! Croft - autonomous game-balance simulator
//!
//! A headless farm-management game played by scripted personas. The engine
//! runs a deterministic tick loop: background systems, concurrent process
//! updates, then an AI decision pass (shortage scan, candidate generation,
//! filtering, scoring, persona-weighted selection). Every run yields a
//! decision trace and state snapshots for balance analysis.

pub mod action;
pub mod content;
pub mod core;
pub mod engine;
pub mod process;
pub mod state;
pub mod systems;
pub mod validation;

pub use crate::core::error::{CroftError, Result};
pub use crate::engine::{Persona, RunSummary, Simulation, SimulationHost, TerminationReason};
