use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use sqlx::FromRow;

use crate::error::CoreError;
use crate::recurrence;

/// A stored task.
///
/// `date` always holds the 8-digit `YYYYMMDD` form; it is both the wire
/// encoding and the sort key for listings. `repeat` is the raw rule text,
/// re-parsed whenever a next occurrence is computed. An empty `repeat`
/// marks a one-shot task.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Serialized as a decimal string to match the JSON contract.
    #[serde_as(as = "DisplayFromStr")]
    pub id: i64,
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

/// Payload for creating a task. Everything but the title may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTaskData {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl NewTaskData {
    /// Validates the payload and resolves its date against `today`.
    ///
    /// - the title must be non-empty;
    /// - a non-empty rule must be structurally valid;
    /// - an empty date defaults to `today`;
    /// - a date not after `today` on a recurring task is replaced by the
    ///   rule's next occurrence;
    /// - a past date on a one-shot task is replaced by `today`.
    pub fn normalize(mut self, today: NaiveDate) -> Result<Self, CoreError> {
        if self.title.is_empty() {
            return Err(CoreError::InvalidInput("task title is required".to_string()));
        }
        if !self.repeat.is_empty() {
            recurrence::validate_rule(&self.repeat)?;
        }
        if self.date.is_empty() {
            self.date = recurrence::format_date(today);
            return Ok(self);
        }
        let date = recurrence::parse_date(&self.date)?;
        if date <= today && !self.repeat.is_empty() {
            self.date = recurrence::next_date(today, &self.date, &self.repeat)?;
        } else if date < today {
            self.date = recurrence::format_date(today);
        }
        Ok(self)
    }
}

/// Outcome of completing a task.
#[derive(Debug)]
pub enum CompletionResult {
    /// One-shot task, removed from the store.
    Finished,
    /// Recurring task, rescheduled to its next occurrence.
    Rescheduled(Task),
}
