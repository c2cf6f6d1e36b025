//! Task persistence.
//!
//! The store owns every [`Task`]. It only ever grows by append and shrinks by
//! removal; records are never edited in place, and insertion order is the
//! listing order.

use crate::error::CoreError;
use crate::models::Task;
use async_trait::async_trait;
use uuid::Uuid;

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks in insertion order.
    async fn list(&self) -> Result<Vec<Task>, CoreError>;
    /// Append a task and return it as stored.
    async fn append(&self, task: Task) -> Result<Task, CoreError>;
    /// Remove the task with `id`. Returns whether anything was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, CoreError>;
}
