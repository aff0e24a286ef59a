// Neo4j graph store
use async_trait::async_trait;
use neo4rs::{BoltType, ConfigBuilder, Graph, Query};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::Neo4jSettings;
use crate::errors::StoreError;
use crate::models::{AttributeValue, Attributes, EntityType, NodeId, RelationType};
use crate::store::GraphStore;

/// `GraphStore` backed by a Neo4j database. Node ids are Neo4j element ids.
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Open a connection pool for the configured database.
    pub fn connect(settings: &Neo4jSettings) -> Result<Self, StoreError> {
        let config = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.user.as_str())
            .password(settings.password.as_str())
            .db(settings.database.as_str())
            .build()
            .map_err(|e| StoreError::connection(format!("Invalid Neo4j configuration: {}", e)))?;

        let graph = Graph::connect(config)
            .map_err(|e| StoreError::connection(format!("Failed to connect to Neo4j: {}", e)))?;

        Ok(Self { graph })
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    /// Round-trip a trivial query so bad credentials fail before any write.
    pub async fn verify_connectivity(&self) -> Result<(), StoreError> {
        self.graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(|e| StoreError::connection(format!("Neo4j is not reachable: {}", e)))
    }
}

fn to_bolt(value: &AttributeValue) -> BoltType {
    match value {
        AttributeValue::Text(s) => s.clone().into(),
        AttributeValue::Integer(n) => (*n).into(),
    }
}

fn node_write_error(entity: EntityType, e: neo4rs::Error) -> StoreError {
    let msg = format!("Failed to create {} node: {}", entity, e);
    if msg.contains("ConstraintValidationFailed") {
        StoreError::constraint(msg)
    } else {
        StoreError::query(msg)
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn create_node(
        &self,
        entity: EntityType,
        attributes: &Attributes,
    ) -> Result<NodeId, StoreError> {
        // Labels cannot be parameters; they come from a closed enum.
        let query_str = format!(
            "CREATE (n:{}) SET n = $props RETURN elementId(n) AS id",
            entity.label()
        );

        let props: HashMap<String, BoltType> = attributes
            .iter()
            .map(|(key, value)| (key.clone(), to_bolt(value)))
            .collect();

        let query = Query::new(query_str).param("props", props);

        let mut result = self
            .graph
            .execute(query)
            .await
            .map_err(|e| node_write_error(entity, e))?;

        let row = result
            .next()
            .await
            .map_err(|e| node_write_error(entity, e))?
            .ok_or_else(|| StoreError::decode(format!("CREATE {} returned no row", entity)))?;

        let id: String = row
            .get("id")
            .map_err(|e| StoreError::decode(format!("Missing element id for {}: {}", entity, e)))?;

        Ok(NodeId::new(id))
    }

    async fn create_edge(
        &self,
        from: &NodeId,
        to: &NodeId,
        relation: RelationType,
    ) -> Result<(), StoreError> {
        let query_str = format!(
            "MATCH (from) WHERE elementId(from) = $from_id \
             MATCH (to) WHERE elementId(to) = $to_id \
             CREATE (from)-[r:{}]->(to) \
             RETURN count(r) AS created",
            relation.as_str()
        );

        let query = Query::new(query_str)
            .param("from_id", from.as_str())
            .param("to_id", to.as_str());

        let mut result = self.graph.execute(query).await.map_err(|e| {
            StoreError::query(format!("Failed to create {} relationship: {}", relation, e))
        })?;

        let created: i64 = match result.next().await.map_err(|e| {
            StoreError::query(format!("Failed to create {} relationship: {}", relation, e))
        })? {
            Some(row) => row
                .get("created")
                .map_err(|e| StoreError::decode(e.to_string()))?,
            None => 0,
        };

        if created == 0 {
            return Err(StoreError::missing_endpoint(format!(
                "({})-[:{}]->({})",
                from, relation, to
            )));
        }

        Ok(())
    }

    async fn ensure_indexes(&self, entities: &[EntityType]) -> Result<(), StoreError> {
        for entity in entities {
            let name = format!(
                "{}_{}",
                entity.label().to_lowercase(),
                entity.key_property()
            );
            info!("Creating index {} on {}.{}...", name, entity, entity.key_property());

            let index_query = Query::new(format!(
                "CREATE INDEX {} IF NOT EXISTS FOR (n:{}) ON (n.{})",
                name,
                entity.label(),
                entity.key_property()
            ));

            match self.graph.run(index_query).await {
                Ok(_) => debug!("✓ Index {} ready", name),
                Err(e) => warn!("Failed to create index {}: {}", name, e),
            }

            for property in entity.unique_properties() {
                let name = format!("{}_{}", entity.label().to_lowercase(), property);
                info!("Creating constraint {} on {}.{}...", name, entity, property);

                let constraint_query = Query::new(format!(
                    "CREATE CONSTRAINT {} IF NOT EXISTS FOR (n:{}) REQUIRE n.{} IS UNIQUE",
                    name,
                    entity.label(),
                    property
                ));

                match self.graph.run(constraint_query).await {
                    Ok(_) => debug!("✓ Constraint {} ready", name),
                    Err(e) => warn!("Failed to create constraint {}: {}", name, e),
                }
            }
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let query = Query::new("MATCH (n) DETACH DELETE n".to_string());
        self.graph
            .run(query)
            .await
            .map_err(|e| StoreError::query(format!("Failed to clear Neo4j data: {}", e)))
    }
}
