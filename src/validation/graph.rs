//! Prerequisite dependency graph
//!
//! Built once from the content table at init. Tracks forward edges
//! (entry -> its prerequisites), reverse edges (entry -> entries that
//! need it), and the set of entries made unsatisfiable by prerequisite
//! cycles. Cyclic entries are excluded from play rather than aborting
//! the run.

use crate::content::table::ContentTable;
use crate::core::types::ItemId;
use ahash::{AHashMap, AHashSet};
use tracing::warn;

#[derive(Debug, Default)]
pub struct PrerequisiteGraph {
    /// Entry -> direct prerequisites
    prerequisites: AHashMap<ItemId, Vec<ItemId>>,
    /// Entry -> entries that list it as a prerequisite
    dependents: AHashMap<ItemId, Vec<ItemId>>,
    /// Entries in, or downstream of, a prerequisite cycle
    unsatisfiable: AHashSet<ItemId>,
}

impl PrerequisiteGraph {
    pub fn build(content: &ContentTable) -> Self {
        let mut graph = Self::default();
        for entry in content.iter() {
            graph
                .prerequisites
                .insert(entry.id.clone(), entry.prerequisites.clone());
            for prereq in &entry.prerequisites {
                graph
                    .dependents
                    .entry(prereq.clone())
                    .or_default()
                    .push(entry.id.clone());
            }
        }
        graph.unsatisfiable = graph.find_unsatisfiable(content);
        if !graph.unsatisfiable.is_empty() {
            let mut ids: Vec<_> = graph.unsatisfiable.iter().cloned().collect();
            ids.sort();
            warn!(?ids, "prerequisite cycle detected; entries excluded from play");
        }
        graph
    }

    /// Peel entries whose prerequisites all resolve; whatever remains is in
    /// a cycle or depends on one.
    fn find_unsatisfiable(&self, content: &ContentTable) -> AHashSet<ItemId> {
        let mut unresolved: AHashMap<ItemId, usize> = content
            .iter()
            .map(|e| (e.id.clone(), e.prerequisites.len()))
            .collect();
        let mut queue: Vec<ItemId> = content
            .iter()
            .filter(|e| e.prerequisites.is_empty())
            .map(|e| e.id.clone())
            .collect();

        while let Some(id) = queue.pop() {
            unresolved.remove(&id);
            if let Some(dependents) = self.dependents.get(&id) {
                for dependent in dependents {
                    if let Some(count) = unresolved.get_mut(dependent) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push(dependent.clone());
                        }
                    }
                }
            }
        }
        unresolved.into_keys().collect()
    }

    /// Direct prerequisites of an entry
    pub fn prerequisites(&self, id: &ItemId) -> &[ItemId] {
        self.prerequisites.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries that list `id` as a prerequisite
    pub fn dependents(&self, id: &ItemId) -> &[ItemId] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of entries gated behind `id`, for future-value scoring
    pub fn dependent_count(&self, id: &ItemId) -> usize {
        self.dependents(id).len()
    }

    /// Whether an entry can never have its prerequisites met
    pub fn is_unsatisfiable(&self, id: &ItemId) -> bool {
        self.unsatisfiable.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::table::{ContentEntry, ItemCategory, ResourceCost};
    use crate::core::types::Screen;

    fn entry(id: &str, prereqs: &[&str]) -> ContentEntry {
        ContentEntry {
            id: id.into(),
            name: id.into(),
            category: ItemCategory::Upgrade,
            screen: Screen::Town,
            prerequisites: prereqs.iter().map(|&p| p.into()).collect(),
            cost: ResourceCost::gold(1.0),
            value: 0.0,
            duration: None,
            yields: vec![],
            xp: 0,
            plot_grant: 0,
            milestone: None,
            effect: String::new(),
        }
    }

    #[test]
    fn test_default_content_has_no_cycles() {
        let graph = PrerequisiteGraph::build(&ContentTable::with_defaults());
        assert!(!graph.is_unsatisfiable(&"greenhouse".into()));
        assert!(!graph.is_unsatisfiable(&"lucky_charm".into()));
    }

    #[test]
    fn test_cycle_detection_terminates_and_marks_members() {
        let mut content = ContentTable::new();
        content.add(entry("a", &["b"]));
        content.add(entry("b", &["a"]));
        content.add(entry("c", &[]));
        let graph = PrerequisiteGraph::build(&content);
        assert!(graph.is_unsatisfiable(&"a".into()));
        assert!(graph.is_unsatisfiable(&"b".into()));
        assert!(!graph.is_unsatisfiable(&"c".into()));
    }

    #[test]
    fn test_downstream_of_cycle_is_unsatisfiable() {
        let mut content = ContentTable::new();
        content.add(entry("a", &["b"]));
        content.add(entry("b", &["a"]));
        content.add(entry("d", &["a"]));
        let graph = PrerequisiteGraph::build(&content);
        assert!(graph.is_unsatisfiable(&"d".into()));
    }

    #[test]
    fn test_dependent_count() {
        let graph = PrerequisiteGraph::build(&ContentTable::with_defaults());
        // watering_can gates the greenhouse
        assert_eq!(graph.dependent_count(&"watering_can".into()), 1);
        // greenhouse gates pumpkin seeds
        assert_eq!(graph.dependent_count(&"greenhouse".into()), 1);
        assert_eq!(graph.dependent_count(&"turnip".into()), 0);
    }
}
