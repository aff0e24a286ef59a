//! Error types for the databass migration.
//!
//! Each stage of the run has its own error enum; `MigrationError` wraps them
//! so the driver can propagate any of them with `?`.
mod lookup;
mod migration;
mod parse;
mod store;

pub use lookup::LookupError;
pub use migration::MigrationError;
pub use parse::ParseError;
pub use store::StoreError;
