use crate::error::CoreError;
use crate::models::{Task, TaskList};
use crate::store::TaskStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Store backed by a single JSON document: `{"tasks": [...]}`.
///
/// Every mutation loads the whole document, changes it and writes it back.
/// The load-mutate-save sequence runs under a lock so concurrent requests
/// cannot overwrite each other's changes. Saves go to a sibling temporary
/// file that is then renamed over the store file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty one (and any missing
    /// parent directories) if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        match fs::metadata(&store.path).await {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                store.save(&TaskList::default()).await?;
                info!("Created new tasks storage file at {}", store.path.display());
            }
            Err(err) => return Err(err.into()),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<TaskList, CoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(TaskList::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, list: &TaskList) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(list)?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, content).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self.load().await?.tasks)
    }

    async fn append(&self, task: Task) -> Result<Task, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut list = self.load().await?;
        list.tasks.push(task.clone());
        self.save(&list).await?;
        Ok(task)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut list = self.load().await?;
        let before = list.tasks.len();
        list.tasks.retain(|task| task.id != id);
        if list.tasks.len() == before {
            return Ok(false);
        }
        self.save(&list).await?;
        Ok(true)
    }
}
