//! st-migrate - Migration control for Strata
//!
//! [`MigrationController`] is a thin facade over a
//! [`VersioningEngine`](st_engine::VersioningEngine): it queries the applied
//! schema version, places a database under version control, and moves the
//! schema to a target version using the migration repository shipped in
//! `migrate_repo/` next to this crate.

pub mod controller;
pub mod error;
pub mod repository;

pub use controller::MigrationController;
pub use error::{MigrationError, MigrationResult};
pub use repository::repository_path;
