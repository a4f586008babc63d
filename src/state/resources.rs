//! Resource pools - scalar and keyed resources owned by the agent
//!
//! Pools are never allowed to go negative: every spend is checked first and
//! applied all-or-nothing.

use crate::content::table::ResourceCost;
use crate::core::error::{CroftError, Result};
use crate::core::types::{ItemId, ResourceKind};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A shortfall found while checking affordability
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    pub resource: String,
    pub required: f64,
    pub available: f64,
}

/// All resource pools: gold, water, energy, plus keyed item counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePools {
    pub gold: f64,
    pub water: f64,
    pub energy: f64,
    pub items: AHashMap<ItemId, u32>,
}

impl ResourcePools {
    pub fn scalar(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Gold => self.gold,
            ResourceKind::Water => self.water,
            ResourceKind::Energy => self.energy,
        }
    }

    fn scalar_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Gold => &mut self.gold,
            ResourceKind::Water => &mut self.water,
            ResourceKind::Energy => &mut self.energy,
        }
    }

    /// Add to a scalar pool, clamped to an optional capacity
    pub fn add_scalar(&mut self, kind: ResourceKind, amount: f64, cap: Option<f64>) {
        let pool = self.scalar_mut(kind);
        *pool += amount;
        if let Some(cap) = cap {
            *pool = pool.min(cap);
        }
    }

    /// Spend from a scalar pool; fails without mutating if insufficient
    pub fn try_spend_scalar(&mut self, kind: ResourceKind, amount: f64) -> Result<()> {
        let available = self.scalar(kind);
        if available + 1e-9 < amount {
            return Err(CroftError::InsufficientResource {
                resource: kind.to_string(),
                required: amount,
                available,
            });
        }
        *self.scalar_mut(kind) = (available - amount).max(0.0);
        Ok(())
    }

    pub fn item_count(&self, id: &ItemId) -> u32 {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn add_items(&mut self, id: &ItemId, count: u32) {
        if count > 0 {
            *self.items.entry(id.clone()).or_insert(0) += count;
        }
    }

    /// Remove items; fails without mutating if the count is short
    pub fn remove_items(&mut self, id: &ItemId, count: u32) -> Result<()> {
        let available = self.item_count(id);
        if available < count {
            return Err(CroftError::InsufficientResource {
                resource: id.to_string(),
                required: count as f64,
                available: available as f64,
            });
        }
        if available == count {
            self.items.remove(id);
        } else if let Some(slot) = self.items.get_mut(id) {
            *slot -= count;
        }
        Ok(())
    }

    /// Every shortfall preventing this cost from being paid (empty = affordable)
    pub fn shortfalls(&self, cost: &ResourceCost) -> Vec<Shortfall> {
        let mut out = Vec::new();
        for (kind, required) in [
            (ResourceKind::Gold, cost.gold),
            (ResourceKind::Water, cost.water),
            (ResourceKind::Energy, cost.energy),
        ] {
            let available = self.scalar(kind);
            if required > 0.0 && available + 1e-9 < required {
                out.push(Shortfall {
                    resource: kind.to_string(),
                    required,
                    available,
                });
            }
        }
        for (id, required) in &cost.items {
            let available = self.item_count(id);
            if available < *required {
                out.push(Shortfall {
                    resource: id.to_string(),
                    required: *required as f64,
                    available: available as f64,
                });
            }
        }
        out
    }

    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        self.shortfalls(cost).is_empty()
    }

    /// Pay a full cost atomically; fails without any mutation if short
    pub fn spend(&mut self, cost: &ResourceCost) -> Result<()> {
        if let Some(short) = self.shortfalls(cost).into_iter().next() {
            return Err(CroftError::InsufficientResource {
                resource: short.resource,
                required: short.required,
                available: short.available,
            });
        }
        self.try_spend_scalar(ResourceKind::Gold, cost.gold)?;
        self.try_spend_scalar(ResourceKind::Water, cost.water)?;
        self.try_spend_scalar(ResourceKind::Energy, cost.energy)?;
        for (id, count) in &cost.items {
            self.remove_items(id, *count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut pools = ResourcePools {
            gold: 10.0,
            water: 0.0,
            energy: 5.0,
            items: AHashMap::new(),
        };
        let cost = ResourceCost {
            gold: 5.0,
            water: 1.0,
            ..ResourceCost::default()
        };
        // Water is short, so nothing may change
        assert!(pools.spend(&cost).is_err());
        assert_eq!(pools.gold, 10.0);
        assert_eq!(pools.energy, 5.0);
    }

    #[test]
    fn test_remove_items_never_goes_negative() {
        let mut pools = ResourcePools::default();
        pools.add_items(&"turnip".into(), 2);
        assert!(pools.remove_items(&"turnip".into(), 3).is_err());
        assert_eq!(pools.item_count(&"turnip".into()), 2);
        pools.remove_items(&"turnip".into(), 2).unwrap();
        assert_eq!(pools.item_count(&"turnip".into()), 0);
        // Fully-drained entries are removed, not left at zero
        assert!(!pools.items.contains_key(&ItemId::from("turnip")));
    }

    #[test]
    fn test_scalar_cap() {
        let mut pools = ResourcePools::default();
        pools.add_scalar(ResourceKind::Water, 100.0, Some(40.0));
        assert_eq!(pools.water, 40.0);
    }

    #[test]
    fn test_shortfalls_report_every_missing_resource() {
        let pools = ResourcePools::default();
        let cost = ResourceCost {
            gold: 5.0,
            energy: 2.0,
            items: vec![("iron_ore".into(), 1)],
            ..ResourceCost::default()
        };
        let shorts = pools.shortfalls(&cost);
        assert_eq!(shorts.len(), 3);
    }
}
