//! # nltask Core Library
//!
//! Capture tasks from free text: a language model extracts structured fields,
//! a local resolver turns relative date wording into absolute timestamps, and
//! the result is kept in a flat task store.
//!
//! ## Core Modules
//!
//! - [`dates`]: Relative and fuzzy date resolution
//! - [`extraction`]: Extraction service interface and its OpenRouter client
//! - [`models`]: Task records and their field types
//! - [`service`]: Task lifecycle: parse, create, list, delete
//! - [`store`]: Task persistence (JSON file, in-memory)
//! - [`timezone`]: Timezone detection and validation
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nltask_core::{
//!     extraction::{ExtractionConfig, OpenRouterExtractor},
//!     service::TaskService,
//!     store::JsonFileStore,
//!     timezone::resolve_timezone,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = JsonFileStore::open("data/tasks.json").await?;
//!     let extractor = OpenRouterExtractor::new(ExtractionConfig::default())?;
//!     let service = TaskService::new(Arc::new(store), Arc::new(extractor), resolve_timezone(None)?);
//!
//!     let task = service.create_task("Dentist tomorrow at 9am").await?;
//!     println!("Created task: {} (due {:?})", task.content, task.due_date);
//!
//!     Ok(())
//! }
//! ```

pub mod dates;
pub mod error;
pub mod extraction;
pub mod models;
pub mod service;
pub mod store;
pub mod timezone;
