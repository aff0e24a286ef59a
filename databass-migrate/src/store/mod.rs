//! Graph store abstraction.
//!
//! The migration driver only talks to a [`GraphStore`]. [`Neo4jStore`] writes
//! to a live Neo4j database; [`MemoryStore`] keeps the graph in memory for dry
//! runs and tests.
use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::{Attributes, EntityType, NodeId, RelationType};

pub mod memory;
pub mod neo4j;

pub use memory::{MemoryStore, StoredEdge, StoredNode};
pub use neo4j::Neo4jStore;

/// Write side of the target graph.
///
/// Implementations do not deduplicate: creating the same logical entity twice
/// yields two nodes. The only exception is a repeated value of one of
/// [`EntityType::unique_properties`], which fails with
/// `StoreError::Constraint`. Every error is fatal to the caller's run.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Persist one node with the label of `entity` and return its identifier.
    async fn create_node(
        &self,
        entity: EntityType,
        attributes: &Attributes,
    ) -> Result<NodeId, StoreError>;

    /// Persist one directed relationship `from -[relation]-> to`.
    ///
    /// Fails with `StoreError::MissingEndpoint` if either node does not exist.
    async fn create_edge(
        &self,
        from: &NodeId,
        to: &NodeId,
        relation: RelationType,
    ) -> Result<(), StoreError>;

    /// Create lookup indexes and uniqueness constraints for the given node
    /// types if they do not exist yet.
    async fn ensure_indexes(&self, entities: &[EntityType]) -> Result<(), StoreError>;

    /// Remove every node and relationship from the target.
    async fn clear(&self) -> Result<(), StoreError>;
}
