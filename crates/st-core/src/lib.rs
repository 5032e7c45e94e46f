//! st-core - Core library for Strata
//!
//! This crate provides configuration parsing, target resolution, and the
//! error types shared by the Strata crates.

pub mod config;
pub mod error;

pub use config::{Config, DatabaseConfig, TargetConfig};
pub use error::{CoreError, CoreResult};
