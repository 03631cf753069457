pub mod db;
mod errors;

pub mod orders;
pub mod transactions;

use std::{str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection pool to the given SQLite database, creating the database file if necessary.
///
/// Connections use the WAL journal and wait up to five seconds for the write lock before giving up with `BUSY`.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
