// Migration executor - orchestrates the migration flow
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::{EDGE_REPORT_INTERVAL, NODE_REPORT_INTERVAL};
use crate::errors::{MigrationError, ParseError};
use crate::export::{ExportDir, Record};
use crate::id_map::IdMap;
use crate::migration::{MigrationReport, MigrationState};
use crate::models::{
    AttributeValue, Attributes, EntityType, NodeId, RelationType, ReleaseGenre, COUNTRY_COLUMN,
    MIGRATION_ORDER,
};
use crate::store::GraphStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    /// Delete everything in the target before writing.
    pub clear_target: bool,
}

/// A validated export row ready to be written.
struct PreparedRow<'a> {
    old_id: &'a str,
    attributes: Attributes,
    record: &'a Record,
}

/// Runs one migration from an export directory into a graph store.
///
/// Entity types are processed strictly one after another in
/// [`MIGRATION_ORDER`]. The first error aborts the run and leaves whatever was
/// already written in the store.
pub struct MigrationExecutor<S> {
    store: S,
    export: ExportDir,
    options: MigrationOptions,
    ids: IdMap,
    state: MigrationState,
    history: Vec<MigrationState>,
    report: MigrationReport,
}

impl<S: GraphStore> MigrationExecutor<S> {
    pub fn new(store: S, export: ExportDir, options: MigrationOptions) -> Self {
        Self {
            store,
            export,
            options,
            ids: IdMap::new(),
            state: MigrationState::NotStarted,
            history: vec![MigrationState::NotStarted],
            report: MigrationReport::default(),
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every state the run has entered, starting with `NotStarted`.
    pub fn history(&self) -> &[MigrationState] {
        &self.history
    }

    /// The phase that was running when the migration failed.
    pub fn failed_during(&self) -> Option<MigrationState> {
        match self.history.as_slice() {
            [.., during, MigrationState::Failed] => Some(*during),
            _ => None,
        }
    }

    /// The remapping table built so far.
    pub fn ids(&self) -> &IdMap {
        &self.ids
    }

    pub fn report(&self) -> &MigrationReport {
        &self.report
    }

    /// Execute the full migration. An executor runs at most once.
    pub async fn execute(&mut self) -> Result<MigrationReport, MigrationError> {
        if self.state != MigrationState::NotStarted {
            return Err(MigrationError::AlreadyStarted);
        }

        let start_time = Instant::now();
        info!("Migrating export from {}", self.export.path().display());

        match self.run().await {
            Ok(()) => {
                self.transition(MigrationState::Done);
                self.report.elapsed = start_time.elapsed();
                self.report.log_summary();
                Ok(self.report.clone())
            }
            Err(e) => {
                error!("Migration failed while {}: {}", self.state, e);
                self.transition(MigrationState::Failed);
                self.report.elapsed = start_time.elapsed();
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<(), MigrationError> {
        if self.options.clear_target {
            info!("Clearing existing graph data...");
            self.store.clear().await?;
            info!("✓ Cleared existing data");
        }

        let mut indexed: Vec<EntityType> = MIGRATION_ORDER.to_vec();
        indexed.push(EntityType::Country);
        self.store.ensure_indexes(&indexed).await?;

        for entity in MIGRATION_ORDER {
            self.transition(MigrationState::ReadingEntities(entity));
            let records = self.export.read(entity)?;
            let rows = prepare_rows(entity, &records)?;
            let genre_links = if entity == EntityType::Release {
                self.export.read_release_genres()?
            } else {
                Vec::new()
            };
            info!("✓ Read {} {} rows", rows.len(), entity);

            self.transition(MigrationState::CreatingNodes(entity));
            self.create_nodes(entity, &rows).await?;
            self.ids.seal(entity);
            info!("✓ Created {} {} nodes", rows.len(), entity);

            self.transition(MigrationState::CreatingEdges(entity));
            self.create_edges(entity, &rows).await?;
            if !genre_links.is_empty() {
                self.create_secondary_genre_edges(&rows, &genre_links).await?;
            }
        }

        self.ids.seal(EntityType::Country);
        Ok(())
    }

    async fn create_nodes(
        &mut self,
        entity: EntityType,
        rows: &[PreparedRow<'_>],
    ) -> Result<(), MigrationError> {
        let total = rows.len();

        for (idx, row) in rows.iter().enumerate() {
            let node_id = self.store.create_node(entity, &row.attributes).await?;
            debug!("{} {} -> {}", entity, row.old_id, node_id);
            self.ids.register(entity, row.old_id, node_id)?;
            self.report.record_node(entity);

            if (idx + 1) % NODE_REPORT_INTERVAL == 0 || idx + 1 == total {
                info!("  Progress: {}/{} {} nodes", idx + 1, total, entity);
            }
        }

        Ok(())
    }

    async fn create_edges(
        &mut self,
        entity: EntityType,
        rows: &[PreparedRow<'_>],
    ) -> Result<(), MigrationError> {
        for row in rows {
            let from = self.ids.resolve(entity, row.old_id)?;

            for fk in entity.foreign_keys() {
                let Some(target_id) = row.record.get(fk.column) else {
                    continue;
                };

                let to = self.ids.resolve(fk.target, target_id).map_err(|source| {
                    MigrationError::OrphanReference {
                        entity,
                        row_id: row.old_id.to_string(),
                        column: fk.column,
                        source,
                    }
                })?;

                self.link(&from, &to, fk.relation).await?;
            }

            if let (Some(relation), Some(country)) =
                (entity.country_relation(), row.record.get(COUNTRY_COLUMN))
            {
                let to = self.country_node(country).await?;
                self.link(&from, &to, relation).await?;
            }
        }

        Ok(())
    }

    /// `HAS_GENRE` edges from the association export. A link that repeats a
    /// release's main genre is already covered by the main genre edge.
    async fn create_secondary_genre_edges(
        &mut self,
        releases: &[PreparedRow<'_>],
        links: &[ReleaseGenre],
    ) -> Result<(), MigrationError> {
        let main_genres: HashSet<(&str, &str)> = releases
            .iter()
            .filter_map(|row| Some((row.old_id, row.record.get("main_genre_id")?)))
            .collect();

        let mut skipped = 0;
        for link in links {
            if main_genres.contains(&(link.release_id.as_str(), link.genre_id.as_str())) {
                skipped += 1;
                continue;
            }

            let from = self
                .ids
                .resolve(EntityType::Release, &link.release_id)
                .map_err(|source| MigrationError::OrphanReference {
                    entity: EntityType::Release,
                    row_id: link.release_id.clone(),
                    column: "release_id",
                    source,
                })?;
            let to = self
                .ids
                .resolve(EntityType::Genre, &link.genre_id)
                .map_err(|source| MigrationError::OrphanReference {
                    entity: EntityType::Release,
                    row_id: link.release_id.clone(),
                    column: "genre_id",
                    source,
                })?;

            self.link(&from, &to, RelationType::HasGenre).await?;
        }

        if skipped > 0 {
            debug!("Skipped {} secondary genres equal to the main genre", skipped);
        }
        info!("✓ Linked {} secondary genres", links.len() - skipped);
        Ok(())
    }

    /// Node for a country name, created the first time the name is seen.
    async fn country_node(&mut self, name: &str) -> Result<NodeId, MigrationError> {
        if let Some(id) = self.ids.try_resolve(EntityType::Country, name) {
            return Ok(id.clone());
        }

        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), AttributeValue::from(name));

        let node_id = self
            .store
            .create_node(EntityType::Country, &attributes)
            .await?;
        self.report.record_node(EntityType::Country);
        debug!("Country '{}' -> {}", name, node_id);

        Ok(self.ids.register(EntityType::Country, name, node_id)?)
    }

    async fn link(
        &mut self,
        from: &NodeId,
        to: &NodeId,
        relation: RelationType,
    ) -> Result<(), MigrationError> {
        self.store.create_edge(from, to, relation).await?;
        self.report.record_edge(relation);

        let total = self.report.total_edges();
        if total % EDGE_REPORT_INTERVAL == 0 {
            info!("  Progress: {} relationships", total);
        }
        Ok(())
    }

    fn transition(&mut self, next: MigrationState) {
        debug!("Migration state: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }
}

/// Validate every row of an export before anything is written for it.
fn prepare_rows(
    entity: EntityType,
    records: &[Record],
) -> Result<Vec<PreparedRow<'_>>, ParseError> {
    records
        .iter()
        .map(|record| {
            Ok::<_, ParseError>(PreparedRow {
                old_id: record.id()?,
                attributes: record.to_attributes(entity)?,
                record,
            })
        })
        .collect()
}
