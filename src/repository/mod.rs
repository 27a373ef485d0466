use std::path::Path;

use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;

use crate::config::DbConfig;

pub mod metadata_repository;

pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// the newest schema version this build knows how to use
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Error, Debug)]
pub enum InitializeDbError {
    #[error("failed to open a database connection: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("failed to set up the database: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database version {0} is not a number")]
    InvalidVersion(String),
    #[error("database is at version {0}, but this build only understands up to {SCHEMA_VERSION}")]
    UnsupportedVersion(u64),
}

/// builds the connection pool for the database at `path`. Every pooled connection enforces foreign keys
/// and gives up on a locked database after `db_config.busy_timeout` instead of hanging
pub fn build_pool(path: &Path, db_config: &DbConfig) -> Result<SqlitePool, r2d2::Error> {
    let busy_timeout = db_config.busy_timeout;
    let manager = SqliteConnectionManager::file(path).with_init(move |con| {
        con.pragma_update(None, "foreign_keys", "ON")?;
        con.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        con.busy_timeout(busy_timeout)?;
        Ok(())
    });
    r2d2::Pool::builder()
        .max_size(db_config.pool_size)
        .connection_timeout(db_config.connection_timeout)
        .build(manager)
}

/// opens the pool for the database configured in `FolderServer.toml`
#[cfg(not(test))]
pub fn open_pool() -> Result<SqlitePool, r2d2::Error> {
    use crate::config::FOLDER_SERVER_CONFIG;

    let db_config = &FOLDER_SERVER_CONFIG.database;
    build_pool(Path::new(db_config.location.as_str()), db_config)
}

/// every test thread gets its own database file so tests can run in parallel
#[cfg(test)]
pub fn open_pool() -> Result<SqlitePool, r2d2::Error> {
    let db_name = format!("{}.sqlite", crate::test::current_thread_name());
    build_pool(Path::new(db_name.as_str()), &DbConfig::default())
}

/// handles checking if the database exists and is up to the correct version.
/// If the tables don't exist yet they are created
pub fn initialize_db(pool: &SqlitePool) -> Result<(), InitializeDbError> {
    let con = pool.get()?;
    con.execute_batch(include_str!("../assets/init.sql"))?;
    let version = metadata_repository::get_version(&con)?;
    let version = version
        .parse::<u64>()
        .map_err(|_| InitializeDbError::InvalidVersion(version.clone()))?;
    if version > SCHEMA_VERSION {
        return Err(InitializeDbError::UnsupportedVersion(version));
    }
    log::info!("Database is at schema version {version}");
    Ok(())
}
