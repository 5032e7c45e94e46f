//! End-to-end tests for the migration controller over DuckDB.
//!
//! Each test gets its own database file in a temp directory and migrates it
//! with the repository shipped in `migrate_repo/`.

use st_core::DatabaseConfig;
use st_engine::{Direction, DuckDbEngine, EngineError, VersioningEngine};
use st_migrate::{repository_path, MigrationController, MigrationError};
use std::path::{Path, PathBuf};

// ── Helpers ────────────────────────────────────────────────────────────

const LATEST: u32 = 5;

fn db_file(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("registry.duckdb")
}

fn controller(dir: &tempfile::TempDir) -> MigrationController {
    let connection = format!("duckdb://{}", db_file(dir).display());
    MigrationController::new(DatabaseConfig::new(connection), DuckDbEngine::new())
}

fn tables(path: &Path) -> Vec<String> {
    let conn = duckdb::Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_catalog = current_database() AND table_schema = 'main' \
             ORDER BY table_name",
        )
        .unwrap();
    let rows = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
    let names: Vec<String> = rows.map(|r| r.unwrap()).collect();
    names
}

// ── Shipped repository ─────────────────────────────────────────────────

#[test]
fn shipped_repository_latest_version() {
    let latest = DuckDbEngine::new()
        .latest_version(&repository_path())
        .unwrap();
    assert_eq!(latest, LATEST);
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn unversioned_database_rejects_queries_and_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);

    assert!(ctl.current_version().unwrap_err().is_database_migration());
    assert!(ctl.upgrade(None).unwrap_err().is_database_migration());
    assert!(ctl.downgrade(0).unwrap_err().is_database_migration());
}

#[test]
fn version_control_twice() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);

    ctl.version_control(None).unwrap();
    let err = ctl.version_control(None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[MG001] Database migration error: database is already under migration control"
    );
}

#[test]
fn version_control_without_version_marks_latest() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);

    ctl.version_control(None).unwrap();
    assert_eq!(ctl.current_version().unwrap(), LATEST);
    // Only the version table exists: no scripts were run
    assert_eq!(tables(&db_file(&dir)), vec!["migrate_version"]);
}

#[test]
fn sync_new_database_to_latest() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);

    ctl.sync(Some(5), None).unwrap();
    assert_eq!(ctl.current_version().unwrap(), 5);
    assert_eq!(
        tables(&db_file(&dir)),
        vec![
            "image_locations",
            "image_members",
            "image_properties",
            "image_tags",
            "images",
            "migrate_version",
        ]
    );
}

#[test]
fn sync_downgrades_from_five_to_two() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);
    ctl.sync(None, None).unwrap();
    assert_eq!(ctl.current_version().unwrap(), 5);

    ctl.sync(Some(2), None).unwrap();
    assert_eq!(ctl.current_version().unwrap(), 2);
    assert_eq!(
        tables(&db_file(&dir)),
        vec!["image_properties", "images", "migrate_version"]
    );
}

#[test]
fn sync_at_target_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);
    ctl.sync(Some(5), None).unwrap();
    ctl.sync(Some(5), None).unwrap();
    assert_eq!(ctl.current_version().unwrap(), 5);
}

#[test]
fn sync_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);
    ctl.sync(None, None).unwrap();
    ctl.sync(None, None).unwrap();
    assert_eq!(ctl.current_version().unwrap(), LATEST);
}

#[test]
fn upgrade_then_downgrade_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);
    ctl.version_control(Some(0)).unwrap();

    assert_eq!(ctl.upgrade(Some(3)).unwrap(), 3);
    assert_eq!(ctl.upgrade(None).unwrap(), LATEST);
    assert_eq!(ctl.downgrade(0).unwrap(), 0);
    assert_eq!(tables(&db_file(&dir)), vec!["migrate_version"]);
}

// ── Pass-through failures ──────────────────────────────────────────────

#[test]
fn wrong_direction_passes_through_unwrapped() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);
    ctl.sync(Some(4), None).unwrap();

    let err = ctl.upgrade(Some(2)).unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Engine(EngineError::WrongDirection {
            direction: Direction::Upgrade,
            current: 4,
            target: 2
        })
    ));
}

#[test]
fn target_beyond_repository_passes_through_unwrapped() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(&dir);
    ctl.version_control(Some(0)).unwrap();

    let err = ctl.upgrade(Some(LATEST + 1)).unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Engine(EngineError::InvalidVersion { .. })
    ));
    assert_eq!(ctl.current_version().unwrap(), 0);
}

#[test]
fn in_memory_connection_is_rejected() {
    let ctl = MigrationController::new(DatabaseConfig::new(":memory:"), DuckDbEngine::new());
    assert!(matches!(
        ctl.current_version().unwrap_err(),
        MigrationError::Engine(EngineError::ConnectionError(_))
    ));
}
