use repoharvest_core::error::CatalogError;
use rusqlite::{Connection, params};
use std::path::Path;
use tracing::info;

/// Open the record catalog with default pragmas.
pub fn open_catalog(db_path: &Path) -> Result<Connection, CatalogError> {
    open_catalog_with_config(db_path, 5000)
}

/// Open the record catalog with a configurable busy timeout.
pub fn open_catalog_with_config(
    db_path: &Path,
    busy_timeout_ms: u32,
) -> Result<Connection, CatalogError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(CatalogError::Io)?;
    }

    let conn = Connection::open(db_path).map_err(CatalogError::sqlite)?;
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};",
        busy_timeout_ms
    ))
    .map_err(CatalogError::sqlite)?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS repo_records (
             scope        TEXT NOT NULL,
             name         TEXT NOT NULL,
             source       TEXT NOT NULL,
             clone_url    TEXT NOT NULL,
             ssh_url      TEXT,
             organization TEXT,
             last_pushed  INTEGER NOT NULL DEFAULT 0,
             created_at   TEXT NOT NULL,
             PRIMARY KEY (scope, name)
         );",
    )
    .map_err(CatalogError::sqlite)?;

    info!(?db_path, "record catalog opened");
    Ok(conn)
}

/// One repository's locally materialized record. `scope` groups records by
/// the consumer they were transcribed for; `source` marks the integration
/// that created them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub scope: String,
    pub name: String,
    pub source: String,
    pub clone_url: String,
    pub ssh_url: Option<String>,
    pub organization: Option<String>,
    pub last_pushed: i64,
    pub created_at: String,
}

pub fn create_record(conn: &Connection, record: &RepoRecord) -> Result<(), CatalogError> {
    conn.execute(
        "INSERT INTO repo_records
         (scope, name, source, clone_url, ssh_url, organization, last_pushed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.scope,
            record.name,
            record.source,
            record.clone_url,
            record.ssh_url,
            record.organization,
            record.last_pushed,
            record.created_at,
        ],
    )
    .map_err(CatalogError::sqlite)?;
    Ok(())
}

/// Get a record by primary key. Returns None if not found.
pub fn get_record(
    conn: &Connection,
    scope: &str,
    name: &str,
) -> Result<Option<RepoRecord>, CatalogError> {
    let result = conn.query_row(
        "SELECT scope, name, source, clone_url, ssh_url, organization, last_pushed, created_at
         FROM repo_records WHERE scope = ?1 AND name = ?2",
        params![scope, name],
        |row| {
            Ok(RepoRecord {
                scope: row.get(0)?,
                name: row.get(1)?,
                source: row.get(2)?,
                clone_url: row.get(3)?,
                ssh_url: row.get(4)?,
                organization: row.get(5)?,
                last_pushed: row.get(6)?,
                created_at: row.get(7)?,
            })
        },
    );

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(CatalogError::sqlite(e)),
    }
}

/// List every record in a scope, ordered by name.
pub fn list_records(conn: &Connection, scope: &str) -> Result<Vec<RepoRecord>, CatalogError> {
    let mut stmt = conn
        .prepare(
            "SELECT scope, name, source, clone_url, ssh_url, organization, last_pushed, created_at
             FROM repo_records WHERE scope = ?1 ORDER BY name",
        )
        .map_err(CatalogError::sqlite)?;

    let rows = stmt
        .query_map(params![scope], |row| {
            Ok(RepoRecord {
                scope: row.get(0)?,
                name: row.get(1)?,
                source: row.get(2)?,
                clone_url: row.get(3)?,
                ssh_url: row.get(4)?,
                organization: row.get(5)?,
                last_pushed: row.get(6)?,
                created_at: row.get(7)?,
            })
        })
        .map_err(CatalogError::sqlite)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(CatalogError::sqlite)
}

/// Delete a record by primary key. Deleting an absent record is a no-op.
pub fn delete_record(conn: &Connection, scope: &str, name: &str) -> Result<(), CatalogError> {
    conn.execute(
        "DELETE FROM repo_records WHERE scope = ?1 AND name = ?2",
        params![scope, name],
    )
    .map_err(CatalogError::sqlite)?;
    Ok(())
}

/// Patch one record's last-push timestamp.
pub fn set_last_pushed(
    conn: &Connection,
    scope: &str,
    name: &str,
    last_pushed: i64,
) -> Result<(), CatalogError> {
    let rows = conn
        .execute(
            "UPDATE repo_records SET last_pushed = ?3 WHERE scope = ?1 AND name = ?2",
            params![scope, name, last_pushed],
        )
        .map_err(CatalogError::sqlite)?;
    if rows == 0 {
        return Err(CatalogError::record_not_found(scope, name));
    }
    Ok(())
}
