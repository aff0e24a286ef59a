// Migration statistics
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

use crate::models::{EntityType, RelationType};

/// Counts of what a run wrote to the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub nodes: BTreeMap<EntityType, usize>,
    pub edges: BTreeMap<RelationType, usize>,
    pub elapsed: Duration,
}

impl MigrationReport {
    pub fn record_node(&mut self, entity: EntityType) {
        *self.nodes.entry(entity).or_default() += 1;
    }

    pub fn record_edge(&mut self, relation: RelationType) {
        *self.edges.entry(relation).or_default() += 1;
    }

    pub fn nodes_of(&self, entity: EntityType) -> usize {
        self.nodes.get(&entity).copied().unwrap_or(0)
    }

    pub fn edges_of(&self, relation: RelationType) -> usize {
        self.edges.get(&relation).copied().unwrap_or(0)
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn total_edges(&self) -> usize {
        self.edges.values().sum()
    }

    pub fn log_summary(&self) {
        info!("=== Migration Complete ===");
        info!("Total time: {:.2}s", self.elapsed.as_secs_f64());
        for (entity, count) in &self.nodes {
            info!("{} nodes: {}", entity, count);
        }
        for (relation, count) in &self.edges {
            info!("{} relationships: {}", relation, count);
        }
        info!(
            "Total: {} nodes, {} relationships",
            self.total_nodes(),
            self.total_edges()
        );
    }
}
