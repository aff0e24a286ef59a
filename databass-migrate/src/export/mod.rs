// Export module - reading the relational CSV exports
pub mod reader;
pub mod record;

pub use reader::{read_records, read_release_genres, ExportDir};
pub use record::Record;
