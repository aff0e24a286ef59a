//! Remapping table from legacy relational ids to graph node ids.
//!
//! The driver registers every node it creates here and resolves foreign keys
//! through it instead of joining tables. Once a type's node pass is over the
//! type is sealed, so later passes can only read its ids.
use std::collections::{HashMap, HashSet};

use crate::errors::LookupError;
use crate::models::{EntityType, NodeId};

#[derive(Debug, Default, Clone)]
pub struct IdMap {
    ids: HashMap<(EntityType, String), NodeId>,
    sealed: HashSet<EntityType>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the node created for `(entity, old_id)`.
    ///
    /// Fails if the pair is already registered or the type is sealed.
    pub fn register(
        &mut self,
        entity: EntityType,
        old_id: &str,
        node_id: NodeId,
    ) -> Result<NodeId, LookupError> {
        if self.sealed.contains(&entity) {
            return Err(LookupError::Sealed { entity });
        }

        let key = (entity, old_id.to_string());
        if self.ids.contains_key(&key) {
            return Err(LookupError::AlreadyRegistered {
                entity,
                old_id: old_id.to_string(),
            });
        }

        self.ids.insert(key, node_id.clone());
        Ok(node_id)
    }

    /// Node id registered for `(entity, old_id)`.
    pub fn resolve(&self, entity: EntityType, old_id: &str) -> Result<NodeId, LookupError> {
        self.try_resolve(entity, old_id)
            .cloned()
            .ok_or_else(|| LookupError::NotRegistered {
                entity,
                old_id: old_id.to_string(),
            })
    }

    pub fn try_resolve(&self, entity: EntityType, old_id: &str) -> Option<&NodeId> {
        self.ids.get(&(entity, old_id.to_string()))
    }

    pub fn seal(&mut self, entity: EntityType) {
        self.sealed.insert(entity);
    }

    pub fn is_sealed(&self, entity: EntityType) -> bool {
        self.sealed.contains(&entity)
    }

    /// Number of ids registered for one type.
    pub fn len(&self, entity: EntityType) -> usize {
        self.ids.keys().filter(|(e, _)| *e == entity).count()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
