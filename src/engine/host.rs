//! Host boundary - running a simulation on its own thread
//!
//! The host process talks to a run through two channels: requests in,
//! events out. Requests are only honored between ticks, so a command can
//! never observe or interrupt a half-applied tick. All state crosses the
//! boundary as snapshots; the host never touches `GameState` directly.

use crate::content::table::ContentTable;
use crate::core::config::SimulationConfig;
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::Tick;
use crate::engine::driver::{RunSummary, Simulation, TerminationReason, TickMetrics};
use crate::engine::persona::Persona;
use crate::state::StateSnapshot;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::error;
use uuid::Uuid;

/// Commands from the host, applied between ticks
#[derive(Debug, Clone)]
pub enum HostRequest {
    Pause,
    Resume,
    SetSpeed(f64),
    /// Request an immediate snapshot outside the regular cadence
    GetState,
    Stop,
}

/// Messages to the host
#[derive(Debug)]
pub enum HostEvent {
    Initialized {
        run_id: Uuid,
        persona: String,
        seed: u64,
    },
    /// Emitted every tick that produced events or a snapshot
    Tick {
        tick: Tick,
        events: Vec<GameEvent>,
        metrics: TickMetrics,
        snapshot: Option<StateSnapshot>,
    },
    /// Response to `GetState`
    State(StateSnapshot),
    Completed(Box<RunSummary>),
    Error(String),
}

/// Handle to a simulation running on its own thread
pub struct SimulationHost {
    requests: Sender<HostRequest>,
    events: Receiver<HostEvent>,
    handle: JoinHandle<()>,
}

impl SimulationHost {
    /// Spawn a run for `days` simulated days
    pub fn spawn(
        config: SimulationConfig,
        content: ContentTable,
        persona: Persona,
        days: f64,
    ) -> Result<Self> {
        // Fail fast on the caller's thread
        let sim = Simulation::new(config, content, persona)?;
        let (request_tx, request_rx) = channel::<HostRequest>();
        let (event_tx, event_rx) = channel::<HostEvent>();
        let handle = thread::Builder::new()
            .name("croft-sim".into())
            .spawn(move || run_loop(sim, days, request_rx, event_tx))
            .map_err(CroftError::IoError)?;
        Ok(Self {
            requests: request_tx,
            events: event_rx,
            handle,
        })
    }

    pub fn request(&self, request: HostRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| CroftError::HostChannelClosed)
    }

    pub fn events(&self) -> &Receiver<HostEvent> {
        &self.events
    }

    /// Wait for the run thread to finish
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| CroftError::SystemError {
                system: "host".into(),
                detail: "simulation thread panicked".into(),
            })
    }
}

fn run_loop(
    mut sim: Simulation,
    days: f64,
    requests: Receiver<HostRequest>,
    events: Sender<HostEvent>,
) {
    let _ = events.send(HostEvent::Initialized {
        run_id: sim.trace().run_id,
        persona: sim.trace().persona.clone(),
        seed: sim.config().seed,
    });

    let end_time = sim.state().time + days * crate::core::types::SECONDS_PER_DAY;
    let mut paused = false;

    loop {
        // Drain commands between ticks; block while paused
        loop {
            let request = if paused {
                match requests.recv() {
                    Ok(r) => Some(r),
                    Err(_) => {
                        sim.stop();
                        None
                    }
                }
            } else {
                match requests.try_recv() {
                    Ok(r) => Some(r),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => {
                        sim.stop();
                        None
                    }
                }
            };
            let Some(request) = request else { break };
            match request {
                HostRequest::Pause => paused = true,
                HostRequest::Resume => paused = false,
                HostRequest::SetSpeed(speed) => {
                    if let Err(err) = sim.set_speed(speed) {
                        let _ = events.send(HostEvent::Error(err.to_string()));
                    }
                }
                HostRequest::GetState => {
                    let _ = events.send(HostEvent::State(StateSnapshot::capture(sim.state())));
                }
                HostRequest::Stop => {
                    sim.stop();
                    paused = false;
                }
            }
            if !paused {
                break;
            }
        }

        if sim.ended().is_none() && sim.state().time >= end_time {
            break;
        }
        match sim.step() {
            Ok(output) => {
                let ended = output.ended.is_some();
                if !output.events.is_empty() || output.snapshot.is_some() {
                    let _ = events.send(HostEvent::Tick {
                        tick: output.tick,
                        events: output.events,
                        metrics: output.metrics,
                        snapshot: output.snapshot,
                    });
                }
                if ended {
                    break;
                }
            }
            Err(err) => {
                error!(%err, "simulation step failed");
                let _ = events.send(HostEvent::Error(err.to_string()));
                break;
            }
        }
    }

    let _ = events.send(HostEvent::Completed(Box::new(sim.summary())));
}
