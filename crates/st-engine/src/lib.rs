//! st-engine - Schema versioning engine for Strata
//!
//! This crate provides the `VersioningEngine` trait, the reader for an
//! on-disk migration repository of numbered SQL scripts, and a DuckDB
//! implementation that records the applied version inside the target
//! database.

pub mod duckdb;
pub mod error;
pub mod repository;
pub mod traits;

pub use crate::duckdb::DuckDbEngine;
pub use error::{EngineError, EngineResult};
pub use repository::{Direction, Repository, RepositorySettings, Step, VersionScripts};
pub use traits::{SchemaVersion, VersioningEngine};
