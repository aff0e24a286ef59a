// In-memory graph store for dry runs and tests
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Attributes, EntityType, NodeId, RelationType};
use crate::store::GraphStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    pub id: NodeId,
    pub entity: EntityType,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub relation: RelationType,
}

#[derive(Debug, Default)]
struct MemoryGraph {
    nodes: Vec<StoredNode>,
    edges: Vec<StoredEdge>,
    writes: usize,
}

/// `GraphStore` that keeps nodes and edges in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: Mutex<MemoryGraph>,
    fail_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write after the first `writes` node or
    /// edge creations, simulating a dropped connection.
    pub fn failing_after(writes: usize) -> Self {
        Self {
            graph: Mutex::default(),
            fail_after: Some(writes),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_write(&self, graph: &mut MemoryGraph) -> Result<(), StoreError> {
        if let Some(limit) = self.fail_after {
            if graph.writes >= limit {
                return Err(StoreError::connection(format!(
                    "connection lost after {} writes",
                    limit
                )));
            }
        }
        graph.writes += 1;
        Ok(())
    }

    pub fn nodes(&self) -> Vec<StoredNode> {
        self.lock().nodes.clone()
    }

    pub fn edges(&self) -> Vec<StoredEdge> {
        self.lock().edges.clone()
    }

    pub fn nodes_of(&self, entity: EntityType) -> Vec<StoredNode> {
        self.lock()
            .nodes
            .iter()
            .filter(|n| n.entity == entity)
            .cloned()
            .collect()
    }

    pub fn edges_of(&self, relation: RelationType) -> Vec<StoredEdge> {
        self.lock()
            .edges
            .iter()
            .filter(|e| e.relation == relation)
            .cloned()
            .collect()
    }

    pub fn node(&self, id: &NodeId) -> Option<StoredNode> {
        self.lock().nodes.iter().find(|n| &n.id == id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.lock().edges.len()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn create_node(
        &self,
        entity: EntityType,
        attributes: &Attributes,
    ) -> Result<NodeId, StoreError> {
        let mut graph = self.lock();

        for property in entity.unique_properties() {
            let Some(value) = attributes.get(*property) else {
                continue;
            };
            let taken = graph
                .nodes
                .iter()
                .any(|n| n.entity == entity && n.attributes.get(*property) == Some(value));
            if taken {
                return Err(StoreError::constraint(format!(
                    "{} with {} '{}' already exists",
                    entity, property, value
                )));
            }
        }

        self.begin_write(&mut graph)?;

        let id = NodeId::new(Uuid::new_v4().to_string());
        graph.nodes.push(StoredNode {
            id: id.clone(),
            entity,
            attributes: attributes.clone(),
        });
        Ok(id)
    }

    async fn create_edge(
        &self,
        from: &NodeId,
        to: &NodeId,
        relation: RelationType,
    ) -> Result<(), StoreError> {
        let mut graph = self.lock();

        for endpoint in [from, to] {
            if !graph.nodes.iter().any(|n| &n.id == endpoint) {
                return Err(StoreError::missing_endpoint(endpoint.to_string()));
            }
        }

        self.begin_write(&mut graph)?;
        graph.edges.push(StoredEdge {
            from: from.clone(),
            to: to.clone(),
            relation,
        });
        Ok(())
    }

    async fn ensure_indexes(&self, _entities: &[EntityType]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut graph = self.lock();
        graph.nodes.clear();
        graph.edges.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttributeValue;

    fn named(name: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), AttributeValue::from(name));
        attributes
    }

    #[tokio::test]
    async fn creates_nodes_with_distinct_ids() {
        let store = MemoryStore::new();

        let a = store
            .create_node(EntityType::Artist, &named("Talk Talk"))
            .await
            .unwrap();
        let b = store
            .create_node(EntityType::Artist, &named("Talk Talk"))
            .await
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.node(&a).unwrap().attributes, named("Talk Talk"));
    }

    #[tokio::test]
    async fn edge_requires_both_endpoints() {
        let store = MemoryStore::new();
        let release = store
            .create_node(EntityType::Release, &named("Laughing Stock"))
            .await
            .unwrap();
        let ghost = NodeId::new("missing");

        let err = store
            .create_edge(&release, &ghost, RelationType::MadeBy)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MissingEndpoint(_)));
        assert_eq!(store.edge_count(), 0);
    }

    #[tokio::test]
    async fn fails_after_configured_writes() {
        let store = MemoryStore::failing_after(1);
        let artist = store
            .create_node(EntityType::Artist, &named("a"))
            .await
            .unwrap();

        let err = store
            .create_node(EntityType::Artist, &named("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));

        let err = store
            .create_edge(&artist, &artist, RelationType::IsFrom)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
        assert_eq!(store.node_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_mbid_is_rejected_per_label() {
        let store = MemoryStore::new();
        let mut attributes = named("Talk Talk");
        attributes.insert("mbid".to_string(), AttributeValue::from("690a"));

        store
            .create_node(EntityType::Artist, &attributes)
            .await
            .unwrap();
        store
            .create_node(EntityType::Label, &attributes)
            .await
            .unwrap();
        let err = store
            .create_node(EntityType::Artist, &attributes)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.nodes_of(EntityType::Artist).len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = MemoryStore::new();
        let a = store
            .create_node(EntityType::Genre, &named("Jazz"))
            .await
            .unwrap();
        store.create_edge(&a, &a, RelationType::HasGenre).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
    }
}
