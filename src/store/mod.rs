//! Persistence for saved tasks and trips.

pub mod sqlite;

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{NewTask, NewTrip, Task, TaskId, TaskPatch, Trip},
};

pub use sqlite::SqliteStore;

/// Storage for a user's travel tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, user_id: &str, task: NewTask) -> Result<Task>;

    /// All tasks owned by `user_id`, oldest first
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>>;

    /// Apply `patch` to a task owned by `user_id`. Unknown ids and tasks of
    /// other users are both `NotFound`.
    async fn update_task(&self, user_id: &str, id: TaskId, patch: TaskPatch) -> Result<Task>;

    async fn delete_task(&self, user_id: &str, id: TaskId) -> Result<()>;
}

/// Storage for a user's trips
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create_trip(&self, user_id: &str, trip: NewTrip) -> Result<Trip>;

    async fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>>;
}
