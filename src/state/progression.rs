//! Progression state - unlocks, milestones, level, and farm plots

use crate::core::types::{ItemId, Screen};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// State of one farm plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlotState {
    Empty,
    /// A growth process is running on this plot
    Planted { seed: ItemId },
    /// Growth completed; the crop is waiting to be harvested
    Ready { crop: ItemId, count: u32 },
}

impl PlotState {
    pub fn is_empty(&self) -> bool {
        matches!(self, PlotState::Empty)
    }
}

/// Progression: unlocked content, areas, milestones, level and plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Content ids the agent has unlocked (recipes known, upgrades owned)
    pub unlocked: AHashSet<ItemId>,
    /// Screens the agent may act on
    pub unlocked_areas: AHashSet<Screen>,
    /// Completed milestones
    pub milestones: AHashSet<String>,
    pub level: u32,
    pub xp: u32,
    /// Farm plots, index-addressed
    pub plots: Vec<PlotState>,
}

impl Progression {
    pub fn new(start_plots: usize) -> Self {
        let mut unlocked_areas = AHashSet::new();
        // Farm and town are open from the start; everything else needs a key
        unlocked_areas.insert(Screen::Farm);
        unlocked_areas.insert(Screen::Town);
        Self {
            unlocked: AHashSet::new(),
            unlocked_areas,
            milestones: AHashSet::new(),
            level: 1,
            xp: 0,
            plots: vec![PlotState::Empty; start_plots],
        }
    }

    pub fn is_unlocked(&self, id: &ItemId) -> bool {
        self.unlocked.contains(id)
    }

    pub fn area_open(&self, screen: Screen) -> bool {
        self.unlocked_areas.contains(&screen)
    }

    /// First empty plot index, if any
    pub fn first_empty_plot(&self) -> Option<usize> {
        self.plots.iter().position(PlotState::is_empty)
    }

    pub fn empty_plot_count(&self) -> usize {
        self.plots.iter().filter(|p| p.is_empty()).count()
    }

    /// XP required to advance from `level` to `level + 1`
    pub fn xp_for_level(level: u32) -> u32 {
        100 * level
    }

    /// Grant XP and resolve level-ups; returns levels gained
    pub fn grant_xp(&mut self, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= Self::xp_for_level(self.level) {
            self.xp -= Self::xp_for_level(self.level);
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
