// Migration run state machine
use std::fmt;

use crate::models::EntityType;

/// Where a migration run is.
///
/// Entity types advance through `ReadingEntities -> CreatingNodes ->
/// CreatingEdges` one at a time, in dependency order. `Failed` can follow
/// any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    NotStarted,
    ReadingEntities(EntityType),
    CreatingNodes(EntityType),
    CreatingEdges(EntityType),
    Done,
    Failed,
}

impl MigrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationState::Done | MigrationState::Failed)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::NotStarted => write!(f, "not started"),
            MigrationState::ReadingEntities(e) => write!(f, "reading {} export", e),
            MigrationState::CreatingNodes(e) => write!(f, "creating {} nodes", e),
            MigrationState::CreatingEdges(e) => write!(f, "creating {} relationships", e),
            MigrationState::Done => write!(f, "done"),
            MigrationState::Failed => write!(f, "failed"),
        }
    }
}
