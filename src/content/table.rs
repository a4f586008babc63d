//! Static content table - the read-only, ID-keyed source of game content
//!
//! Every item, seed, recipe, expedition, creature, training course, and
//! helper the game knows about is one row here. The table is loaded once
//! before simulation start and never mutated by the engine; parameter
//! overrides are applied to a copy before `Simulation::new`.

use crate::core::error::{CroftError, Result};
use crate::core::types::{ItemId, Screen};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Category of a content entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Plantable; growing it occupies a plot and a Growth slot
    Seed,
    /// Harvested produce, sellable in town
    Crop,
    /// Raw material from mining or adventuring
    Material,
    /// Crafted via a Craft process at the forge
    Recipe,
    /// A mining or adventuring expedition
    Expedition,
    /// A catchable creature
    Creature,
    /// A training course at the tower
    Training,
    /// Permanent upgrade owned by the agent
    Upgrade,
    /// Unlocks access to a screen when first acquired
    AreaKey,
    /// A hireable helper generating passive income
    Helper,
}

/// Resource cost of an action or entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCost {
    #[serde(default)]
    pub gold: f64,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub energy: f64,
    /// Item inputs, consumed on completion for process-backed entries
    #[serde(default)]
    pub items: Vec<(ItemId, u32)>,
}

impl ResourceCost {
    pub fn gold(amount: f64) -> Self {
        Self {
            gold: amount,
            ..Self::default()
        }
    }

    pub fn is_free(&self) -> bool {
        self.gold == 0.0 && self.water == 0.0 && self.energy == 0.0 && self.items.is_empty()
    }

    /// Scalar magnitude used as the deterministic tie-break key in scoring
    pub fn magnitude(&self) -> f64 {
        let items: u32 = self.items.iter().map(|(_, n)| *n).sum();
        self.gold + self.water + self.energy + items as f64
    }
}

/// One row of the content table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Unique identifier
    pub id: ItemId,
    /// Human-readable name
    pub name: String,
    /// Category, drives which system surfaces the entry
    pub category: ItemCategory,
    /// Screen the entry belongs to
    pub screen: Screen,
    /// Items that must be owned or unlocked before this entry is usable
    #[serde(default)]
    pub prerequisites: Vec<ItemId>,
    /// Acquisition cost (purchase price, or process start cost)
    #[serde(default)]
    pub cost: ResourceCost,
    /// Sell value in gold, for produce and materials
    #[serde(default)]
    pub value: f64,
    /// Process duration in simulated seconds, for process-backed entries
    #[serde(default)]
    pub duration: Option<f64>,
    /// Items granted on completion or harvest
    #[serde(default)]
    pub yields: Vec<(ItemId, u32)>,
    /// Experience granted on completion
    #[serde(default)]
    pub xp: u32,
    /// Extra farm plots granted when acquired
    #[serde(default)]
    pub plot_grant: usize,
    /// Milestone completed when this entry is first acquired
    #[serde(default)]
    pub milestone: Option<String>,
    /// Free-form effect text, surfaced to analysis tooling only
    #[serde(default)]
    pub effect: String,
}

/// The full content table, ID-keyed with stable iteration order
#[derive(Debug, Clone, Default)]
pub struct ContentTable {
    entries: AHashMap<ItemId, ContentEntry>,
    /// Insertion order, so candidate generation is deterministic
    order: Vec<ItemId>,
}

impl ContentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ContentEntry) {
        if !self.entries.contains_key(&entry.id) {
            self.order.push(entry.id.clone());
        }
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn get(&self, id: &ItemId) -> Option<&ContentEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut ContentEntry> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ContentEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Entries of one category, in insertion order
    pub fn by_category(&self, category: ItemCategory) -> impl Iterator<Item = &ContentEntry> {
        self.iter().filter(move |e| e.category == category)
    }

    /// Entries surfaced on one screen, in insertion order
    pub fn by_screen(&self, screen: Screen) -> impl Iterator<Item = &ContentEntry> {
        self.iter().filter(move |e| e.screen == screen)
    }

    /// Verify every prerequisite and yield reference resolves
    ///
    /// Called at init; a dangling reference is a fatal content error.
    pub fn validate(&self) -> Result<()> {
        for entry in self.iter() {
            for prereq in &entry.prerequisites {
                if !self.entries.contains_key(prereq) {
                    return Err(CroftError::ContentError(format!(
                        "entry '{}' references missing prerequisite '{}'",
                        entry.id, prereq
                    )));
                }
            }
            for (input, _) in &entry.cost.items {
                if !self.entries.contains_key(input) {
                    return Err(CroftError::ContentError(format!(
                        "entry '{}' references missing input '{}'",
                        entry.id, input
                    )));
                }
            }
            if entry.duration.is_some_and(|d| d <= 0.0) {
                return Err(CroftError::ContentError(format!(
                    "entry '{}' has non-positive duration",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    /// Built-in content set used by tests and the default runner
    pub fn with_defaults() -> Self {
        let mut table = Self::new();

        // Seeds and crops
        table.add(ContentEntry {
            id: "turnip_seed".into(),
            name: "Turnip Seed".into(),
            category: ItemCategory::Seed,
            screen: Screen::Farm,
            prerequisites: vec![],
            cost: ResourceCost::gold(5.0),
            value: 0.0,
            duration: Some(4.0 * 3_600.0),
            yields: vec![("turnip".into(), 1)],
            xp: 5,
            plot_grant: 0,
            milestone: None,
            effect: "Fast-growing starter crop".into(),
        });
        table.add(ContentEntry {
            id: "carrot_seed".into(),
            name: "Carrot Seed".into(),
            category: ItemCategory::Seed,
            screen: Screen::Farm,
            prerequisites: vec![],
            cost: ResourceCost::gold(8.0),
            value: 0.0,
            duration: Some(8.0 * 3_600.0),
            yields: vec![("carrot".into(), 1)],
            xp: 8,
            plot_grant: 0,
            milestone: None,
            effect: "Steady mid-tier crop".into(),
        });
        table.add(ContentEntry {
            id: "pumpkin_seed".into(),
            name: "Pumpkin Seed".into(),
            category: ItemCategory::Seed,
            screen: Screen::Farm,
            prerequisites: vec!["greenhouse".into()],
            cost: ResourceCost::gold(15.0),
            value: 0.0,
            duration: Some(24.0 * 3_600.0),
            yields: vec![("pumpkin".into(), 1)],
            xp: 15,
            plot_grant: 0,
            milestone: None,
            effect: "High-value crop, needs the greenhouse".into(),
        });
        table.add(ContentEntry {
            id: "turnip".into(),
            name: "Turnip".into(),
            category: ItemCategory::Crop,
            screen: Screen::Farm,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 12.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        });
        table.add(ContentEntry {
            id: "carrot".into(),
            name: "Carrot".into(),
            category: ItemCategory::Crop,
            screen: Screen::Farm,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 20.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        });
        table.add(ContentEntry {
            id: "pumpkin".into(),
            name: "Pumpkin".into(),
            category: ItemCategory::Crop,
            screen: Screen::Farm,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 45.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: Some("pumpkin_prize".into()),
            effect: String::new(),
        });

        // Upgrades and area keys sold in town
        table.add(ContentEntry {
            id: "watering_can".into(),
            name: "Copper Watering Can".into(),
            category: ItemCategory::Upgrade,
            screen: Screen::Town,
            prerequisites: vec![],
            cost: ResourceCost::gold(50.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: "Roomier can for the morning rounds".into(),
        });
        table.add(ContentEntry {
            id: "greenhouse".into(),
            name: "Greenhouse".into(),
            category: ItemCategory::Upgrade,
            screen: Screen::Town,
            prerequisites: vec!["watering_can".into()],
            cost: ResourceCost::gold(400.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 25,
            plot_grant: 0,
            milestone: Some("greenhouse_built".into()),
            effect: "Unlocks delicate crops".into(),
        });
        table.add(ContentEntry {
            id: "plot_deed".into(),
            name: "Plot Deed".into(),
            category: ItemCategory::Upgrade,
            screen: Screen::Town,
            prerequisites: vec![],
            cost: ResourceCost::gold(150.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 10,
            plot_grant: 1,
            milestone: None,
            effect: "One more farm plot".into(),
        });
        table.add(ContentEntry {
            id: "forge_key".into(),
            name: "Forge Key".into(),
            category: ItemCategory::AreaKey,
            screen: Screen::Forge,
            prerequisites: vec![],
            cost: ResourceCost::gold(100.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Opens the forge".into(),
        });
        table.add(ContentEntry {
            id: "mine_map".into(),
            name: "Mine Map".into(),
            category: ItemCategory::AreaKey,
            screen: Screen::Mine,
            prerequisites: vec![],
            cost: ResourceCost::gold(80.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Opens the mine".into(),
        });
        table.add(ContentEntry {
            id: "adventure_pass".into(),
            name: "Adventure Pass".into(),
            category: ItemCategory::AreaKey,
            screen: Screen::Adventure,
            prerequisites: vec![],
            cost: ResourceCost::gold(120.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Opens the wilds".into(),
        });
        table.add(ContentEntry {
            id: "tower_key".into(),
            name: "Tower Key".into(),
            category: ItemCategory::AreaKey,
            screen: Screen::Tower,
            prerequisites: vec![],
            cost: ResourceCost::gold(150.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Opens the training tower".into(),
        });
        table.add(ContentEntry {
            id: "helpers_permit".into(),
            name: "Helpers Permit".into(),
            category: ItemCategory::AreaKey,
            screen: Screen::Helpers,
            prerequisites: vec![],
            cost: ResourceCost::gold(200.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Opens the hiring board".into(),
        });

        // Mining
        table.add(ContentEntry {
            id: "copper_vein".into(),
            name: "Copper Vein".into(),
            category: ItemCategory::Expedition,
            screen: Screen::Mine,
            prerequisites: vec![],
            cost: ResourceCost {
                energy: 10.0,
                ..ResourceCost::default()
            },
            value: 0.0,
            duration: Some(3_600.0),
            yields: vec![("copper_ore".into(), 3)],
            xp: 8,
            plot_grant: 0,
            milestone: None,
            effect: "Shallow vein near the entrance".into(),
        });
        table.add(ContentEntry {
            id: "iron_vein".into(),
            name: "Iron Vein".into(),
            category: ItemCategory::Expedition,
            screen: Screen::Mine,
            prerequisites: vec![],
            cost: ResourceCost {
                energy: 15.0,
                ..ResourceCost::default()
            },
            value: 0.0,
            duration: Some(2.0 * 3_600.0),
            yields: vec![("iron_ore".into(), 3)],
            xp: 12,
            plot_grant: 0,
            milestone: None,
            effect: "Deeper and harder going".into(),
        });
        table.add(ContentEntry {
            id: "copper_ore".into(),
            name: "Copper Ore".into(),
            category: ItemCategory::Material,
            screen: Screen::Mine,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 3.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        });
        table.add(ContentEntry {
            id: "iron_ore".into(),
            name: "Iron Ore".into(),
            category: ItemCategory::Material,
            screen: Screen::Mine,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 5.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        });

        // Forge recipes
        table.add(ContentEntry {
            id: "iron_bar".into(),
            name: "Iron Bar".into(),
            category: ItemCategory::Recipe,
            screen: Screen::Forge,
            prerequisites: vec![],
            cost: ResourceCost {
                energy: 5.0,
                items: vec![("iron_ore".into(), 3)],
                ..ResourceCost::default()
            },
            value: 25.0,
            duration: Some(2.0 * 3_600.0),
            yields: vec![("iron_bar".into(), 1)],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Smelted from three ore".into(),
        });
        table.add(ContentEntry {
            id: "lucky_charm".into(),
            name: "Lucky Charm".into(),
            category: ItemCategory::Recipe,
            screen: Screen::Forge,
            prerequisites: vec!["iron_bar".into()],
            cost: ResourceCost {
                energy: 8.0,
                items: vec![("copper_ore".into(), 2), ("iron_bar".into(), 1)],
                ..ResourceCost::default()
            },
            value: 120.0,
            duration: Some(4.0 * 3_600.0),
            yields: vec![("lucky_charm".into(), 1)],
            xp: 30,
            plot_grant: 0,
            milestone: Some("charmed".into()),
            effect: "The smith's masterpiece".into(),
        });

        // Adventure
        table.add(ContentEntry {
            id: "pond_frog".into(),
            name: "Pond Frog".into(),
            category: ItemCategory::Creature,
            screen: Screen::Adventure,
            prerequisites: vec![],
            cost: ResourceCost {
                energy: 5.0,
                ..ResourceCost::default()
            },
            value: 8.0,
            duration: Some(1_800.0),
            yields: vec![("pond_frog".into(), 1)],
            xp: 10,
            plot_grant: 0,
            milestone: None,
            effect: "Patient work with a net".into(),
        });
        table.add(ContentEntry {
            id: "forest_trail".into(),
            name: "Forest Trail".into(),
            category: ItemCategory::Expedition,
            screen: Screen::Adventure,
            prerequisites: vec![],
            cost: ResourceCost {
                energy: 20.0,
                ..ResourceCost::default()
            },
            value: 0.0,
            duration: Some(3.0 * 3_600.0),
            yields: vec![("wild_berry".into(), 2)],
            xp: 25,
            plot_grant: 0,
            milestone: None,
            effect: "A long walk with full pockets".into(),
        });
        table.add(ContentEntry {
            id: "wild_berry".into(),
            name: "Wild Berry".into(),
            category: ItemCategory::Material,
            screen: Screen::Adventure,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 6.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        });

        // Training
        table.add(ContentEntry {
            id: "strength_course".into(),
            name: "Strength Course".into(),
            category: ItemCategory::Training,
            screen: Screen::Tower,
            prerequisites: vec![],
            cost: ResourceCost {
                energy: 15.0,
                ..ResourceCost::default()
            },
            value: 0.0,
            duration: Some(2.0 * 3_600.0),
            yields: vec![("strength_badge".into(), 1)],
            xp: 20,
            plot_grant: 0,
            milestone: None,
            effect: "Lifting sacks until sundown".into(),
        });
        table.add(ContentEntry {
            id: "strength_badge".into(),
            name: "Strength Badge".into(),
            category: ItemCategory::Upgrade,
            screen: Screen::Tower,
            prerequisites: vec![],
            cost: ResourceCost::default(),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        });

        // Helpers
        table.add(ContentEntry {
            id: "farmhand".into(),
            name: "Farmhand".into(),
            category: ItemCategory::Helper,
            screen: Screen::Helpers,
            prerequisites: vec![],
            cost: ResourceCost::gold(250.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 15,
            plot_grant: 0,
            milestone: None,
            effect: "Keeps a trickle of gold coming in".into(),
        });

        table
    }
}
