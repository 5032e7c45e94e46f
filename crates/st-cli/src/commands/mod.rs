//! CLI command implementations

pub(crate) mod downgrade;
pub(crate) mod sync;
pub(crate) mod upgrade;
pub(crate) mod version;
pub(crate) mod version_control;
