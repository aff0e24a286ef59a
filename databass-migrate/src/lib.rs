//! Migration of a databass relational export into a Neo4j property graph.
//!
//! One CSV export per table is read with [`export::ExportDir`], every row
//! becomes a node through a [`store::GraphStore`], and foreign keys become
//! typed relationships resolved through the [`id_map::IdMap`] remapping
//! table. [`migration::MigrationExecutor`] drives the whole run.
pub mod config;
pub mod errors;
pub mod export;
pub mod id_map;
pub mod migration;
pub mod models;
pub mod store;

pub use errors::{LookupError, MigrationError, ParseError, StoreError};
