//! Errors raised by the identifier remapping table.
use thiserror::Error;

use crate::models::EntityType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{entity} id '{old_id}' has not been migrated")]
    NotRegistered { entity: EntityType, old_id: String },
    #[error("{entity} id '{old_id}' is already registered")]
    AlreadyRegistered { entity: EntityType, old_id: String },
    #[error("{entity} ids are sealed; node creation for this type has finished")]
    Sealed { entity: EntityType },
}
