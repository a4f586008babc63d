//! Content table loading from TOML
//!
//! Loads an `[[items]]` array into a `ContentTable` and validates it.
//! Malformed content (missing references, bad durations) aborts init with a
//! descriptive error before any tick runs.

use crate::content::table::{ContentEntry, ContentTable, ItemCategory, ResourceCost};
use crate::core::error::Result;
use crate::core::types::{ItemId, Screen};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TomlContent {
    #[serde(default)]
    items: Vec<TomlEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlEntry {
    id: String,
    name: String,
    category: ItemCategory,
    screen: Screen,
    #[serde(default)]
    prerequisites: Vec<String>,
    #[serde(default)]
    cost: TomlCost,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    yields: Vec<TomlYield>,
    #[serde(default)]
    xp: u32,
    #[serde(default)]
    plot_grant: usize,
    #[serde(default)]
    milestone: Option<String>,
    #[serde(default)]
    effect: String,
}

#[derive(Debug, Default, Deserialize)]
struct TomlCost {
    #[serde(default)]
    gold: f64,
    #[serde(default)]
    water: f64,
    #[serde(default)]
    energy: f64,
    #[serde(default)]
    items: Vec<TomlYield>,
}

#[derive(Debug, Deserialize)]
struct TomlYield {
    id: String,
    #[serde(default = "one")]
    count: u32,
}

fn one() -> u32 {
    1
}

impl TomlEntry {
    fn into_entry(self) -> ContentEntry {
        ContentEntry {
            id: ItemId::new(self.id),
            name: self.name,
            category: self.category,
            screen: self.screen,
            prerequisites: self.prerequisites.into_iter().map(ItemId::new).collect(),
            cost: ResourceCost {
                gold: self.cost.gold,
                water: self.cost.water,
                energy: self.cost.energy,
                items: self
                    .cost
                    .items
                    .into_iter()
                    .map(|y| (ItemId::new(y.id), y.count))
                    .collect(),
            },
            value: self.value,
            duration: self.duration,
            yields: self
                .yields
                .into_iter()
                .map(|y| (ItemId::new(y.id), y.count))
                .collect(),
            xp: self.xp,
            plot_grant: self.plot_grant,
            milestone: self.milestone,
            effect: self.effect,
        }
    }
}

/// Parse a content table from a TOML string and validate it
pub fn parse_content(toml_str: &str) -> Result<ContentTable> {
    let parsed: TomlContent = toml::from_str(toml_str)?;
    let mut table = ContentTable::new();
    for entry in parsed.items {
        table.add(entry.into_entry());
    }
    table.validate()?;
    Ok(table)
}

/// Load and validate a content table from a TOML file
pub fn load_content(path: &Path) -> Result<ContentTable> {
    let contents = std::fs::read_to_string(path)?;
    parse_content(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_content() {
        let toml_str = r#"
            [[items]]
            id = "radish_seed"
            name = "Radish Seed"
            category = "seed"
            screen = "Farm"
            duration = 3600.0
            cost = { gold = 4.0 }
            yields = [{ id = "radish" }]
            xp = 4

            [[items]]
            id = "radish"
            name = "Radish"
            category = "crop"
            screen = "Farm"
            value = 10.0
        "#;
        let table = parse_content(toml_str).expect("should parse");
        assert_eq!(table.len(), 2);
        let seed = table.get(&"radish_seed".into()).unwrap();
        assert_eq!(seed.cost.gold, 4.0);
        assert_eq!(seed.yields, vec![("radish".into(), 1)]);
    }

    #[test]
    fn test_parse_rejects_dangling_reference() {
        let toml_str = r#"
            [[items]]
            id = "odd_seed"
            name = "Odd Seed"
            category = "seed"
            screen = "Farm"
            prerequisites = ["missing_thing"]
        "#;
        assert!(parse_content(toml_str).is_err());
    }
}
