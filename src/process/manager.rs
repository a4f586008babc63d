//! Process lifecycle management
//!
//! The manager owns one handler per process kind plus the concurrency
//! limits; the active instances themselves live on `GameState` so they
//! travel with snapshots. Starting a kind at its limit is rejected
//! outright, never queued.

use crate::content::table::ContentTable;
use crate::core::config::{ProcessLimits, SimulationConfig};
use crate::core::error::{CroftError, Result};
use crate::core::events::GameEvent;
use crate::core::types::{ProcessId, ProcessKind, SimTime};
use crate::process::handlers::{
    CraftHandler, ExpeditionHandler, GrowthHandler, ProcessHandler,
};
use crate::state::process::{ActiveProcess, ProcessDetail};
use crate::state::GameState;
use ahash::AHashMap;
use tracing::debug;

pub struct ProcessManager {
    handlers: AHashMap<ProcessKind, Box<dyn ProcessHandler>>,
    limits: ProcessLimits,
}

impl ProcessManager {
    /// Build the standard handler set from config limits
    pub fn with_defaults(config: &SimulationConfig) -> Self {
        let mut handlers: AHashMap<ProcessKind, Box<dyn ProcessHandler>> = AHashMap::new();
        handlers.insert(ProcessKind::Growth, Box::new(GrowthHandler));
        handlers.insert(ProcessKind::Craft, Box::new(CraftHandler));
        for kind in [
            ProcessKind::Mine,
            ProcessKind::Catch,
            ProcessKind::Adventure,
            ProcessKind::Train,
        ] {
            handlers.insert(kind, Box::new(ExpeditionHandler::new(kind)));
        }
        Self {
            handlers,
            limits: config.process_limits.clone(),
        }
    }

    /// Concurrency limit for a kind
    pub fn limit(&self, kind: ProcessKind) -> usize {
        match kind {
            ProcessKind::Growth => self.limits.growth,
            ProcessKind::Craft => self.limits.craft,
            ProcessKind::Mine => self.limits.mine,
            ProcessKind::Catch => self.limits.catch,
            ProcessKind::Adventure => self.limits.adventure,
            ProcessKind::Train => self.limits.train,
        }
    }

    fn handler(&self, kind: ProcessKind) -> Result<&dyn ProcessHandler> {
        self.handlers
            .get(&kind)
            .map(|h| h.as_ref())
            .ok_or(CroftError::ProcessRejected {
                kind,
                reason: "no handler registered".into(),
            })
    }

    /// Whether starting a process of this kind would pass all checks
    pub fn can_start(
        &self,
        state: &GameState,
        detail: &ProcessDetail,
        content: &ContentTable,
    ) -> Result<()> {
        let kind = detail.kind();
        if state.processes.count(kind) >= self.limit(kind) {
            return Err(CroftError::ProcessRejected {
                kind,
                reason: format!("at concurrency limit ({})", self.limit(kind)),
            });
        }
        self.handler(kind)?.can_start(state, detail, content)
    }

    /// Start a process, allocating its id
    pub fn try_start(
        &self,
        state: &mut GameState,
        detail: ProcessDetail,
        duration: f64,
        now: SimTime,
        content: &ContentTable,
    ) -> Result<ProcessId> {
        if duration <= 0.0 {
            return Err(CroftError::ProcessRejected {
                kind: detail.kind(),
                reason: "non-positive duration".into(),
            });
        }
        self.can_start(state, &detail, content)?;
        let id = state.allocate_process_id();
        debug!(id = id.0, kind = %detail.kind(), target = %detail.target(), "process started");
        state.processes.push(ActiveProcess {
            id,
            started_at: now,
            duration,
            elapsed: 0.0,
            detail,
        });
        Ok(id)
    }

    /// Cancel a process by id; growth cancellation frees its plot
    pub fn cancel(
        &self,
        state: &mut GameState,
        id: ProcessId,
        reason: impl Into<String>,
    ) -> Option<GameEvent> {
        let process = state.processes.remove(id)?;
        if let Ok(handler) = self.handler(process.kind()) {
            handler.on_cancel(&process, state);
        }
        Some(GameEvent::ProcessCancelled {
            id: process.id,
            kind: process.kind(),
            target: process.detail.target().clone(),
            reason: reason.into(),
        })
    }

    /// Advance every active process over the window
    /// `[window_start, window_start + dt]`, applying completions.
    ///
    /// A process whose completion effects fail (starvation) is cancelled,
    /// never retried. Returns the events of the window in process-id order
    /// within each kind.
    pub fn tick(
        &self,
        state: &mut GameState,
        content: &ContentTable,
        dt: f64,
        window_start: SimTime,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for kind in ProcessKind::ALL {
            let Ok(handler) = self.handler(kind) else {
                continue;
            };
            let list = std::mem::take(state.processes.list_mut(kind));
            let mut keep = Vec::with_capacity(list.len());
            for mut process in list {
                process.elapsed += handler.accrue(&process, state, dt, window_start);
                if !process.is_complete() {
                    keep.push(process);
                    continue;
                }
                match handler.complete(&process, state, content, &mut events) {
                    Ok(outputs) => {
                        debug!(id = process.id.0, kind = %kind, "process completed");
                        events.push(GameEvent::ProcessCompleted {
                            id: process.id,
                            kind,
                            target: process.detail.target().clone(),
                            outputs,
                        });
                    }
                    Err(err) => {
                        debug!(id = process.id.0, kind = %kind, %err, "process starved");
                        handler.on_cancel(&process, state);
                        events.push(GameEvent::ProcessCancelled {
                            id: process.id,
                            kind,
                            target: process.detail.target().clone(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
            *state.processes.list_mut(kind) = keep;
        }
        events
    }
}
