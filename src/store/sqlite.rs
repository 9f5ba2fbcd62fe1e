use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{TaskRepository, TripRepository};
use crate::{
    error::{Result, TravelError},
    types::{NewTask, NewTrip, Task, TaskId, TaskPatch, Trip},
};

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS trips (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        destination TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        status TEXT NOT NULL,
        budget REAL,
        travelers INTEGER,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
     );
     CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        trip_id INTEGER,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        priority TEXT NOT NULL,
        status TEXT NOT NULL,
        due_date TEXT,
        estimated_cost TEXT,
        tips TEXT,
        ai_generated INTEGER NOT NULL DEFAULT 0,
        source TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
     );
     CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
     CREATE INDEX IF NOT EXISTS idx_trips_user ON trips(user_id);",
)];

const TASK_COLUMNS: &str = "id, user_id, trip_id, title, description, category, priority, status, \
     due_date, estimated_cost, tips, ai_generated, source, created_at, updated_at";

const TRIP_COLUMNS: &str = "id, user_id, name, destination, start_date, end_date, status, budget, \
     travelers, created_at, updated_at";

/// SQLite-backed task and trip store.
///
/// The connection sits behind a mutex and every query runs on the blocking pool.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(target: "travel::store", path = %path.display(), "opened task database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| TravelError::Unknown("task database lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|err| TravelError::Unknown(format!("database task failed: {err}")))?
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
         );",
    )?;
    for (version, sql) in MIGRATIONS {
        let already: i64 = conn.query_row(
            "SELECT COUNT(1) FROM schema_migrations WHERE version = ?1",
            [*version],
            |r| r.get(0),
        )?;
        if already == 0 {
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, Utc::now().to_rfc3339()],
            )?;
            debug!(target: "travel::store", version, "applied migration");
        }
    }
    Ok(())
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn parse_column<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|err| conversion_error(idx, err))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| {
        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map_err(|err| conversion_error(idx, format!("bad date `{value}`: {err}")))
    })
    .transpose()
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| conversion_error(idx, format!("bad timestamp `{raw}`: {err}")))
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        trip_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        category: parse_column(row, 5)?,
        priority: parse_column(row, 6)?,
        status: parse_column(row, 7)?,
        due_date: date_column(row, 8)?,
        estimated_cost: row.get(9)?,
        tips: row.get(10)?,
        ai_generated: row.get(11)?,
        source: row.get(12)?,
        created_at: timestamp_column(row, 13)?,
        updated_at: timestamp_column(row, 14)?,
    })
}

fn trip_from_row(row: &Row<'_>) -> rusqlite::Result<Trip> {
    Ok(Trip {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        destination: row.get(3)?,
        start_date: date_column(row, 4)?,
        end_date: date_column(row, 5)?,
        status: parse_column(row, 6)?,
        budget: row.get(7)?,
        travelers: row.get(8)?,
        created_at: timestamp_column(row, 9)?,
        updated_at: timestamp_column(row, 10)?,
    })
}

fn find_task(conn: &Connection, user_id: &str, id: TaskId) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        task_from_row,
    )
    .optional()?
    .ok_or_else(|| TravelError::NotFound("Task not found".to_string()))
}

#[async_trait]
impl TaskRepository for SqliteStore {
    async fn create_task(&self, user_id: &str, task: NewTask) -> Result<Task> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO tasks (user_id, trip_id, title, description, category, priority, status,
                    due_date, estimated_cost, tips, ai_generated, source, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                params![
                    user_id,
                    task.trip_id,
                    task.title,
                    task.description,
                    task.category.as_str(),
                    task.priority.as_str(),
                    task.status.as_str(),
                    date_text(task.due_date),
                    task.estimated_cost,
                    task.tips,
                    task.ai_generated,
                    task.source,
                    now.to_rfc3339(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!(target: "travel::store", id, user = %user_id, "created task");

            Ok(Task {
                id,
                user_id,
                trip_id: task.trip_id,
                title: task.title,
                description: task.description,
                category: task.category,
                priority: task.priority,
                status: task.status,
                due_date: task.due_date,
                estimated_cost: task.estimated_cost,
                tips: task.tips,
                ai_generated: task.ai_generated,
                source: task.source,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY id"
            ))?;
            let tasks = stmt
                .query_map([&user_id], task_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
        .await
    }

    async fn update_task(&self, user_id: &str, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut task = find_task(&tx, &user_id, id)?;
            patch.apply(&mut task);
            task.updated_at = Utc::now();

            tx.execute(
                "UPDATE tasks SET trip_id = ?1, title = ?2, description = ?3, category = ?4,
                    priority = ?5, status = ?6, due_date = ?7, estimated_cost = ?8, tips = ?9,
                    updated_at = ?10
                 WHERE id = ?11 AND user_id = ?12",
                params![
                    task.trip_id,
                    task.title,
                    task.description,
                    task.category.as_str(),
                    task.priority.as_str(),
                    task.status.as_str(),
                    date_text(task.due_date),
                    task.estimated_cost,
                    task.tips,
                    task.updated_at.to_rfc3339(),
                    id,
                    user_id,
                ],
            )?;
            tx.commit()?;
            Ok(task)
        })
        .await
    }

    async fn delete_task(&self, user_id: &str, id: TaskId) -> Result<()> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            if removed == 0 {
                return Err(TravelError::NotFound("Task not found".to_string()));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl TripRepository for SqliteStore {
    async fn create_trip(&self, user_id: &str, trip: NewTrip) -> Result<Trip> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO trips (user_id, name, destination, start_date, end_date, status,
                    budget, travelers, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    user_id,
                    trip.name,
                    trip.destination,
                    date_text(trip.start_date),
                    date_text(trip.end_date),
                    trip.status.as_str(),
                    trip.budget,
                    trip.travelers,
                    now.to_rfc3339(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!(target: "travel::store", id, user = %user_id, "created trip");

            Ok(Trip {
                id,
                user_id,
                name: trip.name,
                destination: trip.destination,
                start_date: trip.start_date,
                end_date: trip.end_date,
                status: trip.status,
                budget: trip.budget,
                travelers: trip.travelers,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TRIP_COLUMNS} FROM trips WHERE user_id = ?1 ORDER BY id"
            ))?;
            let trips = stmt
                .query_map([&user_id], trip_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(trips)
        })
        .await
    }
}
