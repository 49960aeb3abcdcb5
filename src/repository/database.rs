use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction};

use crate::error::ApiError;

type DBPool = Pool<SqliteConnectionManager>;

// Applied to every connection the pool hands out. WAL allows concurrent
// readers alongside the single writer; busy_timeout bounds how long a writer
// waits for the write lock before the operation fails with SQLITE_BUSY.
const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA busy_timeout = 5000;
     PRAGMA temp_store = MEMORY;
     PRAGMA cache_size = 10000;";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_title ON tasks(title);
";

fn apply_pragmas(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(PRAGMAS)
}

/// Handle on the single-file SQLite store. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: DBPool,
}

impl Database {
    /// Open (or create) the database at `path` and build the connection pool.
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        let manager = SqliteConnectionManager::file(path).with_init(apply_pragmas);
        let pool = Pool::builder().build(manager)?;
        Ok(Database { pool })
    }

    /// Create the tasks table and its indexes if they do not exist yet.
    pub fn init_schema(&self) -> Result<(), ApiError> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)?;
        log::debug!("tasks schema ensured");
        Ok(())
    }

    /// Run `f` inside a transaction on a pooled connection: commit when `f`
    /// returns `Ok`, roll back when it returns `Err`. The transaction rolls
    /// back on drop if not committed, so an early `?` can never leave a
    /// half-applied write behind, and the connection returns to the pool
    /// either way.
    pub fn scope<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, ApiError>,
    {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_rolls_back_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("tasks.db")).unwrap();
        db.init_schema().unwrap();

        let result: Result<(), ApiError> = db.scope(|tx| {
            tx.execute(
                "INSERT INTO tasks (title, description, created_at, updated_at)
                 VALUES ('doomed', NULL, '2026-01-01T00:00:00.000000Z', '2026-01-01T00:00:00.000000Z')",
                [],
            )?;
            Err(ApiError::NotFound)
        });
        assert!(result.is_err());

        let count: i64 = db
            .scope(|tx| {
                tx.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
                    .map_err(ApiError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("tasks.db")).unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
    }
}
