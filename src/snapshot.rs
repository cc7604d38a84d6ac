// 📸 Snapshot - one fully ingested feed document
//
// Built once by `ingest`, never mutated afterwards. The next ingestion
// produces a new Snapshot; nothing is updated in place.

use crate::entities::{Builder, Plan, Subdivision};
use crate::resolver::ExternalId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ADJACENCY
// ============================================================================

/// Directed relationship kinds wired during one ingestion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    BuilderSubdivisions,
    BuilderPlans,
    SubdivisionBuilders,
    SubdivisionPlans,
    PlanBuilders,
    PlanSubdivisions,
}

/// Relationship lists keyed by (edge, owner ordinal within the pass)
///
/// Populated while the pass walks the tree; each owner's list is taken
/// exactly once, when that owner's subtree is complete.
#[derive(Debug, Default)]
pub struct Adjacency {
    lists: HashMap<(Edge, usize), Vec<ExternalId>>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `target` to the owner's list; unresolved targets are skipped
    pub fn link(&mut self, edge: Edge, owner: usize, target: Option<ExternalId>) -> bool {
        match target {
            Some(id) => {
                self.lists.entry((edge, owner)).or_default().push(id);
                true
            }
            None => false,
        }
    }

    /// Remove and return the owner's list (empty if nothing was linked)
    pub fn take(&mut self, edge: Edge, owner: usize) -> Vec<ExternalId> {
        self.lists.remove(&(edge, owner)).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Ordered entity collections of one feed document
///
/// Order is completion order of the top-down pass: a plan is recorded as soon
/// as it is built, a subdivision after all its plans, a builder after all its
/// subdivisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// File (or label) the document came from
    pub source: Option<String>,
    pub builders: Vec<Builder>,
    pub subdivisions: Vec<Subdivision>,
    pub plans: Vec<Plan>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty() && self.subdivisions.is_empty() && self.plans.is_empty()
    }

    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("<memory>")
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} builders, {} subdivisions, {} plans",
            self.source_label(),
            self.builders.len(),
            self.subdivisions.len(),
            self.plans.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_skips_unresolved() {
        let mut adjacency = Adjacency::new();
        assert!(adjacency.link(Edge::PlanBuilders, 0, Some(ExternalId(5))));
        assert!(!adjacency.link(Edge::PlanBuilders, 1, None));

        assert_eq!(adjacency.take(Edge::PlanBuilders, 0), vec![ExternalId(5)]);
        assert!(adjacency.take(Edge::PlanBuilders, 1).is_empty());
        assert!(adjacency.is_empty());
    }

    #[test]
    fn test_lists_are_per_edge_and_owner() {
        let mut adjacency = Adjacency::new();
        adjacency.link(Edge::BuilderPlans, 0, Some(ExternalId(1)));
        adjacency.link(Edge::BuilderPlans, 0, Some(ExternalId(2)));
        adjacency.link(Edge::BuilderSubdivisions, 0, Some(ExternalId(3)));
        adjacency.link(Edge::BuilderPlans, 1, Some(ExternalId(4)));

        assert_eq!(
            adjacency.take(Edge::BuilderPlans, 0),
            vec![ExternalId(1), ExternalId(2)]
        );
        assert_eq!(adjacency.take(Edge::BuilderSubdivisions, 0), vec![ExternalId(3)]);
        assert_eq!(adjacency.take(Edge::BuilderPlans, 1), vec![ExternalId(4)]);
    }

    #[test]
    fn test_empty_snapshot_summary() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.summary(), "<memory>: 0 builders, 0 subdivisions, 0 plans");
    }
}
