use crate::dates::{parse_timestamp, resolve};
use crate::error::CoreError;
use crate::extraction::ExtractionService;
use crate::models::{StructuredTask, Task};
use crate::store::TaskStore;
use crate::timezone::now_in;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Turns free text into stored tasks.
///
/// Structured fields come from the extraction service; the local date
/// resolver backs up its due date. Creation never fails because extraction
/// did: a degraded task is stored instead.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    extractor: Arc<dyn ExtractionService>,
    timezone: Tz,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        extractor: Arc<dyn ExtractionService>,
        timezone: Tz,
    ) -> Self {
        Self {
            store,
            extractor,
            timezone,
        }
    }

    /// Extract structured fields from `raw_text`, or `None` if the
    /// extraction service failed.
    pub async fn parse_task(&self, raw_text: &str) -> Option<StructuredTask> {
        self.parse_task_at(raw_text, now_in(self.timezone)).await
    }

    /// [`parse_task`](Self::parse_task) against a fixed reference instant.
    pub async fn parse_task_at(&self, raw_text: &str, now: DateTime<Tz>) -> Option<StructuredTask> {
        let resolved = resolve(raw_text, &now);

        let extracted = match self.extractor.extract(raw_text, now.fixed_offset()).await {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!("Task extraction failed: {}", e);
                return None;
            }
        };

        debug!(
            date = extracted.date_analysis.as_deref(),
            category = extracted.category_analysis.as_deref(),
            priority = extracted.priority_analysis.as_deref(),
            "Extraction analysis"
        );

        let service_date = extracted
            .due_date
            .as_deref()
            .and_then(|value| parse_timestamp(value, &self.timezone));
        if service_date.is_none() {
            if let Some(value) = extracted.due_date.as_deref() {
                debug!("Ignoring unusable due date from extraction service: {:?}", value);
            }
        }

        Some(StructuredTask {
            content: extracted.content,
            due_date: service_date.or_else(|| resolved.map(|date| date.fixed_offset())),
            category: extracted.category,
            priority: extracted.priority,
            estimated_duration: extracted.estimated_duration,
        })
    }

    /// Create and store a task from free text.
    pub async fn create_task(&self, raw_text: &str) -> Result<Task, CoreError> {
        self.create_task_at(raw_text, now_in(self.timezone)).await
    }

    /// [`create_task`](Self::create_task) against a fixed reference instant,
    /// which also becomes the task's `created_at`.
    pub async fn create_task_at(&self, raw_text: &str, now: DateTime<Tz>) -> Result<Task, CoreError> {
        let created_at = now.fixed_offset();
        let fields = match self.parse_task_at(raw_text, now).await {
            Some(fields) => fields,
            None => {
                warn!("Storing unparsed task: {}", raw_text);
                StructuredTask::degraded(raw_text)
            }
        };

        let task = Task::new(raw_text.to_string(), fields, created_at);
        let task = self.store.append(task).await?;
        info!("Created new task {}: {}", task.id, task.content);
        Ok(task)
    }

    /// Delete the task with `id`. Unknown ids are ignored.
    pub async fn delete_task(&self, id: &str) -> Result<(), CoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            debug!("Delete of unknown task id {}", id);
            return Ok(());
        };

        if self.store.remove(uuid).await? {
            info!("Deleted task: {}", uuid);
        } else {
            debug!("Delete of unknown task id {}", uuid);
        }
        Ok(())
    }

    /// All tasks in the order they were created.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, CoreError> {
        self.store.list().await
    }
}
