//! The decision engine and tick driver

pub mod decision;
pub mod driver;
pub mod filter;
pub mod host;
pub mod persona;
pub mod scorer;
pub mod trace;

pub use decision::{DecisionEngine, DecisionOutcome, ShortageReport};
pub use driver::{RunSummary, Simulation, TerminationReason, TickMetrics, TickOutput};
pub use filter::{filter_candidates, FilterOutcome, RejectedCandidate};
pub use host::{HostEvent, HostRequest, SimulationHost};
pub use persona::{load_personas, parse_personas, Persona, PersonaProfile};
pub use scorer::{rank, score_action, ScoreBreakdown};
pub use trace::{ChosenRecord, DecisionRecord, DecisionTrace};
