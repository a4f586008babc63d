//! Active process state - multi-tick activities in flight
//!
//! Instances live on `GameState` so snapshots carry them; the process
//! registry owns only handlers and concurrency limits.

use crate::core::types::{ItemId, ProcessId, ProcessKind, SimTime};
use serde::{Deserialize, Serialize};

/// Kind-specific payload of an active process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcessDetail {
    /// A seed growing on a plot; progress accrues only while watered
    Growth {
        plot: usize,
        seed: ItemId,
        /// Simulated time until which the plot counts as watered
        watered_until: SimTime,
    },
    Craft { recipe: ItemId },
    Mine { vein: ItemId },
    Catch { creature: ItemId },
    Adventure { quest: ItemId },
    Train { course: ItemId },
}

impl ProcessDetail {
    pub fn kind(&self) -> ProcessKind {
        match self {
            ProcessDetail::Growth { .. } => ProcessKind::Growth,
            ProcessDetail::Craft { .. } => ProcessKind::Craft,
            ProcessDetail::Mine { .. } => ProcessKind::Mine,
            ProcessDetail::Catch { .. } => ProcessKind::Catch,
            ProcessDetail::Adventure { .. } => ProcessKind::Adventure,
            ProcessDetail::Train { .. } => ProcessKind::Train,
        }
    }

    /// The content entry this process is working toward
    pub fn target(&self) -> &ItemId {
        match self {
            ProcessDetail::Growth { seed, .. } => seed,
            ProcessDetail::Craft { recipe } => recipe,
            ProcessDetail::Mine { vein } => vein,
            ProcessDetail::Catch { creature } => creature,
            ProcessDetail::Adventure { quest } => quest,
            ProcessDetail::Train { course } => course,
        }
    }
}

/// One active process occupying a concurrency slot of its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProcess {
    pub id: ProcessId,
    pub started_at: SimTime,
    /// Total working time required, in simulated seconds
    pub duration: f64,
    /// Accumulated working time; complete when `elapsed >= duration`
    pub elapsed: f64,
    pub detail: ProcessDetail,
}

impl ActiveProcess {
    pub fn kind(&self) -> ProcessKind {
        self.detail.kind()
    }

    /// Progress fraction in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed + 1e-9 >= self.duration
    }
}

/// All active processes, grouped per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessBook {
    pub growth: Vec<ActiveProcess>,
    pub craft: Vec<ActiveProcess>,
    pub mine: Vec<ActiveProcess>,
    pub catch: Vec<ActiveProcess>,
    pub adventure: Vec<ActiveProcess>,
    pub train: Vec<ActiveProcess>,
}

impl ProcessBook {
    pub fn list(&self, kind: ProcessKind) -> &Vec<ActiveProcess> {
        match kind {
            ProcessKind::Growth => &self.growth,
            ProcessKind::Craft => &self.craft,
            ProcessKind::Mine => &self.mine,
            ProcessKind::Catch => &self.catch,
            ProcessKind::Adventure => &self.adventure,
            ProcessKind::Train => &self.train,
        }
    }

    pub fn list_mut(&mut self, kind: ProcessKind) -> &mut Vec<ActiveProcess> {
        match kind {
            ProcessKind::Growth => &mut self.growth,
            ProcessKind::Craft => &mut self.craft,
            ProcessKind::Mine => &mut self.mine,
            ProcessKind::Catch => &mut self.catch,
            ProcessKind::Adventure => &mut self.adventure,
            ProcessKind::Train => &mut self.train,
        }
    }

    pub fn count(&self, kind: ProcessKind) -> usize {
        self.list(kind).len()
    }

    pub fn total(&self) -> usize {
        ProcessKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    pub fn push(&mut self, process: ActiveProcess) {
        self.list_mut(process.kind()).push(process);
    }

    /// Remove a process by id; returns it if found
    pub fn remove(&mut self, id: ProcessId) -> Option<ActiveProcess> {
        for kind in ProcessKind::ALL {
            let list = self.list_mut(kind);
            if let Some(pos) = list.iter().position(|p| p.id == id) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    pub fn get(&self, id: ProcessId) -> Option<&ActiveProcess> {
        self.iter_all().find(|p| p.id == id)
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &ActiveProcess> {
        ProcessKind::ALL
            .into_iter()
            .flat_map(move |kind| self.list(kind).iter())
    }

    /// Growth process running on a given plot, if any
    pub fn growth_on_plot(&self, plot: usize) -> Option<&ActiveProcess> {
        self.growth.iter().find(
            |p| matches!(p.detail, ProcessDetail::Growth { plot: pl, .. } if pl == plot),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn growth(id: u64, plot: usize) -> ActiveProcess {
        ActiveProcess {
            id: ProcessId(id),
            started_at: 0.0,
            duration: 100.0,
            elapsed: 0.0,
            detail: ProcessDetail::Growth {
                plot,
                seed: "turnip_seed".into(),
                watered_until: 0.0,
            },
        }
    }

    #[test]
    fn test_push_and_remove() {
        let mut book = ProcessBook::default();
        book.push(growth(1, 0));
        book.push(growth(2, 1));
        assert_eq!(book.count(ProcessKind::Growth), 2);
        assert_eq!(book.total(), 2);

        let removed = book.remove(ProcessId(1)).expect("should find process 1");
        assert_eq!(removed.id, ProcessId(1));
        assert_eq!(book.count(ProcessKind::Growth), 1);
        assert!(book.remove(ProcessId(1)).is_none());
    }

    #[test]
    fn test_completion_boundary() {
        let mut p = growth(1, 0);
        p.elapsed = 99.999_999;
        assert!(!p.is_complete());
        p.elapsed = 100.0;
        assert!(p.is_complete());
    }

    #[test]
    fn test_growth_on_plot() {
        let mut book = ProcessBook::default();
        book.push(growth(1, 2));
        assert!(book.growth_on_plot(2).is_some());
        assert!(book.growth_on_plot(0).is_none());
    }
}
