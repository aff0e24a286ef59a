// Migration module - orchestrates reading exports and writing the graph
pub mod executor;
pub mod report;
pub mod state;

pub use executor::{MigrationExecutor, MigrationOptions};
pub use report::MigrationReport;
pub use state::MigrationState;
