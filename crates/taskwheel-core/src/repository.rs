use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{CompletionResult, NewTaskData, Task};
use crate::recurrence::{self, DATE_FORMAT};

/// Date spelling accepted by the search box for exact-date lookups.
const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

/// Data access for tasks.
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, CoreError>;
    async fn find_tasks(&self, search: Option<&str>, limit: u32) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, task: Task) -> Result<Task, CoreError>;
    async fn delete_task(&self, id: i64) -> Result<(), CoreError>;
    async fn complete_task(&self, id: i64) -> Result<CompletionResult, CoreError>;
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        let data = data.normalize(Self::today())?;

        let result =
            sqlx::query("INSERT INTO tasks (date, title, comment, repeat) VALUES ($1, $2, $3, $4)")
                .bind(&data.date)
                .bind(&data.title)
                .bind(&data.comment)
                .bind(&data.repeat)
                .execute(self.pool())
                .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            date: data.date,
            title: data.title,
            comment: data.comment,
            repeat: data.repeat,
        })
    }

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    /// Lists upcoming tasks ordered by date.
    ///
    /// A search term that parses as `DD.MM.YYYY` filters on that exact date;
    /// anything else is matched as a substring of the title or comment.
    async fn find_tasks(&self, search: Option<&str>, limit: u32) -> Result<Vec<Task>, CoreError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let tasks = match search {
            None => {
                sqlx::query_as("SELECT * FROM tasks ORDER BY date LIMIT $1")
                    .bind(limit)
                    .fetch_all(self.pool())
                    .await?
            }
            Some(term) => match NaiveDate::parse_from_str(term, SEARCH_DATE_FORMAT) {
                Ok(date) => {
                    sqlx::query_as("SELECT * FROM tasks WHERE date = $1 ORDER BY date LIMIT $2")
                        .bind(date.format(DATE_FORMAT).to_string())
                        .bind(limit)
                        .fetch_all(self.pool())
                        .await?
                }
                Err(_) => {
                    let pattern = format!("%{}%", term);
                    sqlx::query_as(
                        "SELECT * FROM tasks WHERE title LIKE $1 OR comment LIKE $1 ORDER BY date LIMIT $2",
                    )
                    .bind(pattern)
                    .bind(limit)
                    .fetch_all(self.pool())
                    .await?
                }
            },
        };

        Ok(tasks)
    }

    /// Full-row update with the same validation and date resolution as
    /// creation.
    async fn update_task(&self, task: Task) -> Result<Task, CoreError> {
        let id = task.id;
        let data = NewTaskData {
            date: task.date,
            title: task.title,
            comment: task.comment,
            repeat: task.repeat,
        }
        .normalize(Self::today())?;

        let result =
            sqlx::query("UPDATE tasks SET date = $1, title = $2, comment = $3, repeat = $4 WHERE id = $5")
                .bind(&data.date)
                .bind(&data.title)
                .bind(&data.comment)
                .bind(&data.repeat)
                .bind(id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }

        Ok(Task {
            id,
            date: data.date,
            title: data.title,
            comment: data.comment,
            repeat: data.repeat,
        })
    }

    async fn delete_task(&self, id: i64) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Completes a task.
    ///
    /// One-shot tasks are deleted. Recurring tasks stay and have their date
    /// replaced by the rule's next occurrence after today.
    async fn complete_task(&self, id: i64) -> Result<CompletionResult, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task: Task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if task.repeat.is_empty() {
            sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(CompletionResult::Finished);
        }

        let next = recurrence::next_date(Self::today(), &task.date, &task.repeat)?;
        sqlx::query("UPDATE tasks SET date = $1 WHERE id = $2")
            .bind(&next)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(CompletionResult::Rescheduled(Task { date: next, ..task }))
    }
}
