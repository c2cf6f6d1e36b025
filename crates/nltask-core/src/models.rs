use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

/// Task category as reported by the extraction service.
///
/// The documented labels get their own variants. Anything else the service
/// invents is carried verbatim in `Unrecognized` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Business,
    Shopping,
    Health,
    Personal,
    Other,
    Unrecognized(String),
}

impl Category {
    /// Labels offered to the extraction service.
    pub const KNOWN: [&'static str; 5] = ["Business", "Shopping", "Health", "Personal", "Other"];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Business => "Business",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Personal => "Personal",
            Category::Other => "Other",
            Category::Unrecognized(label) => label,
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match label.to_lowercase().as_str() {
            "business" => Category::Business,
            "shopping" => Category::Shopping,
            "health" => Category::Health,
            "personal" => Category::Personal,
            "other" => Category::Other,
            _ => Category::Unrecognized(label),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Unrecognized(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields derived from a raw task description, before the task is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredTask {
    /// Task description with the date and time wording removed
    pub content: String,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub category: Category,
    /// 1 (low) to 3 (high) by convention; not clamped
    pub priority: i64,
    /// Estimated minutes to complete
    pub estimated_duration: Option<u32>,
}

impl StructuredTask {
    /// Locally derived defaults used when structured extraction is unavailable.
    pub fn degraded(raw_text: &str) -> Self {
        Self {
            content: raw_text.to_string(),
            due_date: None,
            category: Category::Personal,
            priority: 1,
            estimated_duration: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub raw_text: String,
    pub content: String,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub category: Category,
    pub priority: i64,
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<FixedOffset>,
}

impl Task {
    /// Builds a pending task with a fresh id.
    pub fn new(raw_text: String, fields: StructuredTask, created_at: DateTime<FixedOffset>) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_text,
            content: fields.content,
            due_date: fields.due_date,
            category: fields.category,
            priority: fields.priority,
            estimated_duration: fields.estimated_duration,
            status: TaskStatus::Pending,
            created_at,
        }
    }
}

/// On-disk and over-the-wire layout of the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}
