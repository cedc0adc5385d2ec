//! SQLite connection and schema.

use crate::error::AppError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const USERS_SCHEMA: &str = include_str!("../../schema/users.sql");

/// Where the users table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

/// Connection parameters, passed explicitly to every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub location: DbLocation,
}

impl DbConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
        }
    }

    /// Explicit path if given, otherwise `<data dir>/usercli/users.db`.
    pub fn resolve(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::file(p),
            None => Self::file(default_db_path()),
        }
    }
}

fn default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("usercli").join("users.db")
}

pub struct DbPool(pub Mutex<Connection>);

/// Open the store described by `config` and make sure the users table exists.
pub fn open_db(config: &DbConfig) -> Result<DbPool, AppError> {
    let conn = match &config.location {
        DbLocation::File(path) => open_file(path)?,
        DbLocation::Memory => Connection::open_in_memory()?,
    };
    create_tables(&conn)?;
    Ok(DbPool(Mutex::new(conn)))
}

fn open_file(db_path: &Path) -> Result<Connection, AppError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    log::info!("DB path: {:?}", db_path);
    Ok(Connection::open(db_path)?)
}

/// Fresh in-memory pool with the schema in place.
pub fn init_test_db() -> DbPool {
    match open_db(&DbConfig::in_memory()) {
        Ok(pool) => pool,
        Err(e) => panic!("in-memory db: {e}"),
    }
}

/// Create the users table if it is missing.
pub fn create_tables(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(USERS_SCHEMA)?;
    Ok(())
}

/// Drop every table and view in the database.
pub fn drop_all(conn: &Connection) -> Result<(), AppError> {
    let objects: Vec<(String, String)> = conn
        .prepare(
            "SELECT type, name FROM sqlite_master
             WHERE type IN ('table', 'view') AND substr(name, 1, 7) <> 'sqlite_'
             ORDER BY type DESC",
        )?
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    for (kind, name) in objects {
        let kind = if kind == "view" { "VIEW" } else { "TABLE" };
        let quoted = name.replace('"', "\"\"");
        conn.execute_batch(&format!("DROP {kind} IF EXISTS \"{quoted}\""))?;
    }
    Ok(())
}

/// Drop everything, then recreate the schema. Runs in one transaction.
pub fn initialize_schema(conn: &mut Connection) -> Result<(), AppError> {
    let tx = conn.transaction()?;
    drop_all(&tx)?;
    create_tables(&tx)?;
    tx.commit()?;
    log::info!("schema recreated");
    Ok(())
}

/// Get connection from pool (for use in commands).
pub fn get_connection(pool: &DbPool) -> MutexGuard<'_, Connection> {
    pool.0.lock().unwrap_or_else(PoisonError::into_inner)
}
