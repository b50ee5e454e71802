use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_oracle::OracleConnectionManager;
use r2d2_sqlite::SqliteConnectionManager;
use std::env;
use std::path::Path;
use std::sync::Arc;

pub mod models;

mod donations;
mod food;
mod pickups;
mod users;

pub use donations::{
    claim_food, count_claimed_donations, count_donation_logs, create_donation_log,
    list_donation_logs, total_food_quantity, update_donation_log,
};
pub use food::{
    add_food_item, delete_food_item, get_food_item, list_available_food_items, list_food_items,
};
pub use pickups::{count_pickups, create_pickup, delete_pickup, get_pickup, list_pickups};
pub use users::{
    authenticate_user, count_users, create_user, email_taken, get_user, get_user_by_email,
    list_users, username_taken,
};

/// Two interchangeable storage backends behind one pool type: Oracle in
/// production, SQLite for development and tests.
pub enum DbPoolEnum {
    Oracle(Pool<OracleConnectionManager>),
    Sqlite(Pool<SqliteConnectionManager>),
}

pub type DbPool = Arc<DbPoolEnum>;

const SQLITE_SCHEMA: &str = include_str!("schema_sqlite.sql");

/// Picks the backend from the environment: Oracle when the DB_* connection
/// variables are all present, a local SQLite file otherwise.
pub async fn init_pool() -> anyhow::Result<DbPool> {
    match (
        env::var("DB_USER"),
        env::var("DB_PASSWORD"),
        env::var("DB_CONNECT_STRING"),
    ) {
        (Ok(username), Ok(password), Ok(conn_str)) => {
            init_oracle_pool(&username, &password, &conn_str)
        }
        _ => {
            let path =
                env::var("SQLITE_PATH").unwrap_or_else(|_| "data/sustainshare.db".to_string());
            init_sqlite_pool(Path::new(&path))
        }
    }
}

pub fn init_oracle_pool(username: &str, password: &str, conn_str: &str) -> anyhow::Result<DbPool> {
    let manager = OracleConnectionManager::new(username, password, conn_str);
    let pool = Pool::builder()
        // Tolerate transient connectivity delays to the managed instance
        .max_size(10)
        .connection_timeout(std::time::Duration::from_secs(60))
        .build(manager)
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    Ok(Arc::new(DbPoolEnum::Oracle(pool)))
}

pub fn init_sqlite_pool(path: &Path) -> anyhow::Result<DbPool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        // journal_mode returns a row, so pragma_update is not usable here
        conn.query_row("PRAGMA journal_mode=WAL", [], |_row| Ok(()))?;
        Ok(())
    });
    let pool = Pool::builder()
        .max_size(10)
        .connection_timeout(std::time::Duration::from_secs(60))
        .build(manager)
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    let conn = pool.get()?;
    conn.execute_batch(SQLITE_SCHEMA)?;

    Ok(Arc::new(DbPoolEnum::Sqlite(pool)))
}

// Timestamps are persisted as RFC 3339 text in both backends so the two
// implementations share a single conversion path.

pub(crate) fn ts_to_text(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

pub(crate) fn text_to_ts(text: Option<String>) -> Option<DateTime<Utc>> {
    text.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

pub(crate) fn now_text() -> String {
    Utc::now().to_rfc3339()
}
