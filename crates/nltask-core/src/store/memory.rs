use crate::error::CoreError;
use crate::models::Task;
use crate::store::TaskStore;
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Volatile store, for tests and throwaway runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self.tasks.lock().await.clone())
    }

    async fn append(&self, task: Task) -> Result<Task, CoreError> {
        self.tasks.lock().await.push(task.clone());
        Ok(task)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, CoreError> {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        Ok(tasks.len() != before)
    }
}
