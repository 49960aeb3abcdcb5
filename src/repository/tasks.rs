use chrono::prelude::{DateTime, SecondsFormat, Timelike, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::ApiError;
use crate::models::task::{Task, TaskCreate, TaskUpdate};
use crate::repository::database::Database;

const SELECT_ONE: &str = "SELECT id, title, description, created_at, updated_at
     FROM tasks WHERE id = ?1";

// created_at DESC gives newest-first; id DESC keeps the order deterministic
// when two rows share a timestamp.
const SELECT_ALL: &str = "SELECT id, title, description, created_at, updated_at
     FROM tasks ORDER BY created_at DESC, id DESC";

/// Persistence operations for tasks. Each call runs in one storage scope.
#[derive(Clone)]
pub struct TaskRepository {
    db: Database,
}

impl TaskRepository {
    pub fn new(db: Database) -> Self {
        TaskRepository { db }
    }

    pub fn create(&self, payload: TaskCreate) -> Result<Task, ApiError> {
        let now = now_micros();
        self.db.scope(|tx| {
            tx.execute(
                "INSERT INTO tasks (title, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)",
                params![&payload.title, &payload.description, encode_ts(now)],
            )?;
            Ok(Task {
                id: tx.last_insert_rowid(),
                title: payload.title,
                description: payload.description,
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get(&self, id: i64) -> Result<Task, ApiError> {
        self.db.scope(|tx| {
            tx.query_row(SELECT_ONE, params![id], row_to_task)
                .optional()?
                .ok_or(ApiError::NotFound)
        })
    }

    pub fn get_all(&self) -> Result<Vec<Task>, ApiError> {
        self.db.scope(|tx| {
            let mut stmt = tx.prepare(SELECT_ALL)?;
            let tasks = stmt
                .query_map([], row_to_task)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Merge the fields present in `payload` over the stored row and refresh
    /// `updated_at`. Fields absent from the payload are preserved verbatim.
    pub fn update(&self, id: i64, payload: TaskUpdate) -> Result<Task, ApiError> {
        let now = now_micros();
        self.db.scope(|tx| {
            let mut task = tx
                .query_row(SELECT_ONE, params![id], row_to_task)
                .optional()?
                .ok_or(ApiError::NotFound)?;
            if let Some(title) = payload.title {
                task.title = title;
            }
            if let Some(description) = payload.description {
                task.description = description;
            }
            task.updated_at = now;
            tx.execute(
                "UPDATE tasks SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                params![&task.title, &task.description, encode_ts(now), id],
            )?;
            Ok(task)
        })
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.db.scope(|tx| {
            let removed = tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            if removed == 0 {
                Err(ApiError::NotFound)
            } else {
                Ok(())
            }
        })
    }
}

// Timestamps are stamped and stored at microsecond precision, so a value
// read back from the store compares equal to the one handed out at creation.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1000 * 1000)
        .unwrap_or(now)
}

// Fixed precision so the TEXT column sorts chronologically.
fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: decode_ts(row, 3)?,
        updated_at: decode_ts(row, 4)?,
    })
}

fn decode_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}
