//! Location of the migration repository shipped with this crate.

use std::path::{Path, PathBuf};

/// Directory name of the migration repository
pub const REPOSITORY_DIR: &str = "migrate_repo";

/// Path of the `migrate_repo` directory next to this crate's sources.
///
/// # Panics
///
/// Panics if the directory does not exist. The scripts ship with the crate,
/// so a missing directory is a packaging defect.
pub fn repository_path() -> PathBuf {
    resolve_repository(Path::new(env!("CARGO_MANIFEST_DIR")))
}

fn resolve_repository(component_dir: &Path) -> PathBuf {
    let path = component_dir.join(REPOSITORY_DIR);
    assert!(
        path.exists(),
        "migration repository not found: {}",
        path.display()
    );
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_path_ends_in_migrate_repo() {
        let path = repository_path();
        assert!(path.ends_with(REPOSITORY_DIR));
        assert!(path.is_dir());
        assert!(path.join("migrate.yml").is_file());
    }

    #[test]
    #[should_panic(expected = "migration repository not found")]
    fn missing_repository_panics() {
        let dir = tempfile::tempdir().unwrap();
        resolve_repository(dir.path());
    }
}
