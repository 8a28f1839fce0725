//! # Taskwheel Core Library
//!
//! Task-list storage with text-rule recurrence: tasks carry an optional
//! repeat rule (`d 7`, `y`, `w 1,5`, `m -1,15 1,6`) and completing a
//! recurring task advances its date to the rule's next occurrence.
//!
//! ## Core Modules
//!
//! - [`recurrence`]: rule parsing and next-occurrence calculation
//! - [`models`]: task data structures and transfer objects
//! - [`repository`]: data access layer with Repository pattern
//! - [`db`]: database connection and migration management
//! - [`error`]: error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use taskwheel_core::{
//!     db,
//!     models::NewTaskData,
//!     repository::{SqliteRepository, TaskRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), taskwheel_core::error::CoreError> {
//!     let pool = db::establish_connection("tasks.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     // Add a task that repeats every Monday and Friday
//!     let task = repo
//!         .add_task(NewTaskData {
//!             title: "Water the plants".to_string(),
//!             repeat: "w 1,5".to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Created task {} due {}", task.id, task.date);
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
