//! DuckDB versioning engine implementation

use crate::error::{EngineError, EngineResult};
use crate::repository::{Direction, Repository};
use crate::traits::{SchemaVersion, VersioningEngine};
use duckdb::Connection;
use std::path::{Path, PathBuf};

/// URL scheme accepted in front of a DuckDB file path
const SCHEME: &str = "duckdb://";

/// DuckDB versioning engine
///
/// Stateless: each call opens the database file named by the connection
/// string and closes it before returning. Only `version_control` creates a
/// missing database file; queries and migrations against a file that does
/// not exist fail with [`EngineError::NotControlled`] and leave nothing
/// behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbEngine;

impl DuckDbEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    /// Open a connection for `connection`
    fn open(connection: &str) -> EngineResult<Connection> {
        let path = parse_connection(connection)?;
        Connection::open(&path)
            .map_err(|e| EngineError::ConnectionError(format!("{e}: {}", path.display())))
    }

    /// Open a connection for `connection` only if its database file exists
    fn open_existing(connection: &str) -> EngineResult<Connection> {
        let path = parse_connection(connection)?;
        if !path.exists() {
            log::debug!("Database file {} does not exist", path.display());
            return Err(EngineError::NotControlled {
                connection: connection.to_string(),
            });
        }
        Self::open(connection)
    }
}

/// Quote `name` as a SQL identifier so reserved words like `order` work
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Resolve a connection string to a database file path.
///
/// Accepts `duckdb:///abs/path.duckdb`, `duckdb://relative/path.duckdb`, or a
/// bare path. In-memory databases are rejected because nothing would survive
/// between calls.
pub fn parse_connection(connection: &str) -> EngineResult<PathBuf> {
    let trimmed = connection.trim();
    let path = match trimmed.strip_prefix(SCHEME) {
        Some(rest) => rest,
        None if trimmed.contains("://") => {
            return Err(EngineError::ConnectionError(format!(
                "unsupported connection string '{}': expected {}<path>",
                trimmed, SCHEME
            )));
        }
        None => trimmed,
    };

    if path.is_empty() {
        return Err(EngineError::ConnectionError(format!(
            "connection string '{}' has no database path",
            trimmed
        )));
    }
    if path == ":memory:" {
        return Err(EngineError::ConnectionError(
            "in-memory databases cannot be versioned: each call opens a fresh connection"
                .to_string(),
        ));
    }
    Ok(PathBuf::from(path))
}

/// Check whether the version table exists in the main schema
fn version_table_exists(conn: &Connection, table: &str) -> EngineResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_catalog = current_database() AND table_schema = 'main' AND table_name = ?",
        duckdb::params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create the version table if it is missing
fn ensure_version_table(conn: &Connection, table: &str) -> EngineResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
             repository_id   VARCHAR PRIMARY KEY,
             repository_path VARCHAR NOT NULL,
             version         BIGINT NOT NULL
         );",
        quote_identifier(table)
    ))?;
    Ok(())
}

/// Recorded version for `repo`, or `None` if the database is not controlled
fn recorded_version(conn: &Connection, repo: &Repository) -> EngineResult<Option<SchemaVersion>> {
    if !version_table_exists(conn, repo.version_table())? {
        return Ok(None);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT version FROM {} WHERE repository_id = ?",
        quote_identifier(repo.version_table())
    ))?;
    let mut rows = stmt.query(duckdb::params![repo.id()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let raw: i64 = row.get(0)?;
    let version = SchemaVersion::try_from(raw).map_err(|_| EngineError::CorruptVersion {
        table: repo.version_table().to_string(),
        recorded: raw,
    })?;
    Ok(Some(version))
}

/// Recorded version, failing with [`EngineError::NotControlled`] when absent
fn require_version(
    conn: &Connection,
    repo: &Repository,
    connection: &str,
) -> EngineResult<SchemaVersion> {
    recorded_version(conn, repo)?.ok_or_else(|| EngineError::NotControlled {
        connection: connection.to_string(),
    })
}

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
fn with_transaction<F, T>(conn: &Connection, body: F) -> EngineResult<T>
where
    F: FnOnce(&Connection) -> EngineResult<T>,
{
    conn.execute_batch("BEGIN TRANSACTION")?;

    let result = body(conn);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(EngineError::DuckDb(commit_err));
            }
        }
        Err(_) => {
            let _ = conn.execute_batch("ROLLBACK");
        }
    }
    result
}

/// Run every step between `from` and `to`, one transaction per step.
///
/// A failing step is rolled back; earlier steps stay committed.
fn apply_steps(
    conn: &Connection,
    repo: &Repository,
    from: SchemaVersion,
    to: SchemaVersion,
) -> EngineResult<SchemaVersion> {
    let update = format!(
        "UPDATE {} SET version = ? WHERE repository_id = ?",
        quote_identifier(repo.version_table())
    );

    let mut current = from;
    for step in repo.steps(from, to)? {
        let sql = repo.read_script(&step)?;
        let name = repo
            .version(step.version)
            .map(|scripts| scripts.name.as_str())
            .unwrap_or_default();
        log::debug!(
            "Applying {} script v{:03} {} ({})",
            step.direction,
            step.version,
            name,
            step.script.display()
        );

        with_transaction(conn, |tx| {
            tx.execute_batch(&sql)
                .map_err(|e| EngineError::ScriptFailed {
                    version: step.version,
                    direction: step.direction,
                    message: e.to_string(),
                })?;
            tx.execute(
                &update,
                duckdb::params![i64::from(step.resulting), repo.id()],
            )?;
            Ok(())
        })?;
        current = step.resulting;
    }
    Ok(current)
}

impl VersioningEngine for DuckDbEngine {
    fn db_version(&self, connection: &str, repository: &Path) -> EngineResult<SchemaVersion> {
        let repo = Repository::open(repository)?;
        let conn = Self::open_existing(connection)?;
        require_version(&conn, &repo, connection)
    }

    fn version_control(
        &self,
        connection: &str,
        repository: &Path,
        version: SchemaVersion,
    ) -> EngineResult<()> {
        let repo = Repository::open(repository)?;
        let conn = Self::open(connection)?;

        if recorded_version(&conn, &repo)?.is_some() {
            return Err(EngineError::AlreadyControlled {
                connection: connection.to_string(),
            });
        }
        repo.check_version(version)?;

        ensure_version_table(&conn, repo.version_table())?;
        conn.execute(
            &format!(
                "INSERT INTO {} (repository_id, repository_path, version) VALUES (?, ?, ?)",
                quote_identifier(repo.version_table())
            ),
            duckdb::params![
                repo.id(),
                repo.path().display().to_string(),
                i64::from(version)
            ],
        )?;
        log::debug!(
            "Recorded version {} for repository '{}'",
            version,
            repo.id()
        );
        Ok(())
    }

    fn upgrade(
        &self,
        connection: &str,
        repository: &Path,
        version: Option<SchemaVersion>,
    ) -> EngineResult<SchemaVersion> {
        let repo = Repository::open(repository)?;
        let conn = Self::open_existing(connection)?;
        let current = require_version(&conn, &repo, connection)?;
        let target = version.unwrap_or_else(|| repo.latest());
        repo.check_version(target)?;

        if target < current {
            return Err(EngineError::WrongDirection {
                direction: Direction::Upgrade,
                current,
                target,
            });
        }
        apply_steps(&conn, &repo, current, target)
    }

    fn downgrade(
        &self,
        connection: &str,
        repository: &Path,
        version: SchemaVersion,
    ) -> EngineResult<SchemaVersion> {
        let repo = Repository::open(repository)?;
        let conn = Self::open_existing(connection)?;
        let current = require_version(&conn, &repo, connection)?;
        repo.check_version(version)?;

        if version > current {
            return Err(EngineError::WrongDirection {
                direction: Direction::Downgrade,
                current,
                target: version,
            });
        }
        apply_steps(&conn, &repo, current, version)
    }

    fn latest_version(&self, repository: &Path) -> EngineResult<SchemaVersion> {
        Ok(Repository::open(repository)?.latest())
    }

    fn engine_name(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
