use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::version::error::CacheError;

/// Trait for storing and retrieving fetched index bodies
#[cfg_attr(test, automock)]
pub trait IndexStorer: Send + Sync + 'static {
    /// Get the cached body for a URL if it is younger than the refresh interval
    fn get_fresh(&self, url: &str) -> Result<Option<String>, CacheError>;

    /// Replace the cached body for a URL
    fn store(&self, url: &str, body: &str) -> Result<(), CacheError>;
}

/// SQLite-backed cache of downloaded indexes
pub struct Cache {
    conn: Mutex<Connection>,
    refresh_interval: i64,
}

impl Cache {
    pub fn new(db_path: &Path, refresh_interval: i64) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        // Enable WAL mode so concurrent runs do not block each other
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let cache = Self {
            conn: Mutex::new(conn),
            refresh_interval,
        };

        cache.create_schema()?;
        info!("Cache initialized successfully");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                url TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }
}

impl IndexStorer for Cache {
    fn get_fresh(&self, url: &str) -> Result<Option<String>, CacheError> {
        let threshold = Self::current_timestamp_ms() - self.refresh_interval;

        let conn = self.lock_conn()?;
        let body = conn
            .query_row(
                "SELECT body FROM responses WHERE url = ?1 AND fetched_at > ?2",
                (url, threshold),
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match &body {
            Some(_) => debug!("Cache hit for {}", url),
            None => debug!("Cache miss for {}", url),
        }

        Ok(body)
    }

    fn store(&self, url: &str, body: &str) -> Result<(), CacheError> {
        let now = Self::current_timestamp_ms();

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO responses (url, body, fetched_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(url) DO UPDATE SET body = excluded.body, fetched_at = excluded.fetched_at
            "#,
            (url, body, now),
        )?;

        debug!("Cached {} bytes for {}", body.len(), url);
        Ok(())
    }
}
