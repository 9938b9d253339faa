//! Task, substep and task-note model.
//!
//! # Responsibility
//! - Define the task aggregate (task + ordered substeps + notes).
//! - Define create/patch inputs and their normalization rules.
//!
//! # Invariants
//! - `title` is trimmed, non-blank and at most 500 chars.
//! - `priority` is within `PRIORITY_LOW..=PRIORITY_HIGH`.
//! - `due_date` is a naive local date-time with second precision.

use crate::model::folder::FolderId;
use crate::model::user::UserId;
use crate::model::validation::{in_range, optional_text, required_text, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;
pub type SubstepId = i64;
pub type NoteId = i64;

pub const TITLE_MAX_CHARS: usize = 500;
pub const PRIORITY_LOW: u8 = 1;
pub const PRIORITY_MEDIUM: u8 = 2;
pub const PRIORITY_HIGH: u8 = 3;

/// Storage and wire format of `due_date`.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task aggregate as returned by reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub folder_id: Option<FolderId>,
    pub title: String,
    pub description: Option<String>,
    pub priority: u8,
    pub status: TaskStatus,
    #[serde(default, with = "due_date_serde")]
    pub due_date: Option<NaiveDateTime>,
    pub is_calendar_event: bool,
    pub google_calendar_event_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Ordered by `order_index ASC, id ASC`.
    #[serde(default)]
    pub substeps: Vec<TaskSubstep>,
    /// Ordered by `created_at ASC, id ASC`.
    #[serde(default)]
    pub notes: Vec<TaskNote>,
}

/// Completed vs total substep counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstepProgress {
    pub completed: usize,
    pub total: usize,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Calendar day the task is due on, if any.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.map(|due| due.date())
    }

    pub fn progress(&self) -> SubstepProgress {
        SubstepProgress {
            completed: self.substeps.iter().filter(|step| step.is_completed).count(),
            total: self.substeps.len(),
        }
    }

    /// Applies a normalized patch in place. Substeps and notes are untouched.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(folder_id) = patch.folder_id {
            self.folder_id = folder_id;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(is_calendar_event) = patch.is_calendar_event {
            self.is_calendar_event = is_calendar_event;
        }
    }
}

/// Checklist item of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSubstep {
    pub id: SubstepId,
    pub task_id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub order_index: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Append-only comment on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNote {
    pub id: NoteId,
    pub task_id: TaskId,
    pub content: String,
    pub created_at: i64,
}

/// Create input for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default, with = "due_date_serde")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_calendar_event: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            folder_id: None,
            priority: PRIORITY_LOW,
            due_date: None,
            is_calendar_event: false,
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        validate_priority(self.priority)?;
        Ok(Self {
            title: required_text("title", &self.title, TITLE_MAX_CHARS)?,
            description: optional_text("description", self.description.as_deref(), None)?,
            folder_id: self.folder_id,
            priority: self.priority,
            due_date: self.due_date.map(truncate_to_seconds),
            is_calendar_event: self.is_calendar_event,
        })
    }
}

/// Partial task update. Absent fields are left untouched; `Some(None)`
/// clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::model::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::model::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<Option<FolderId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        with = "due_date_patch_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_calendar_event: Option<bool>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        let description = match self.description {
            Some(value) => Some(optional_text("description", value.as_deref(), None)?),
            None => None,
        };
        Ok(Self {
            title: self
                .title
                .map(|title| required_text("title", &title, TITLE_MAX_CHARS))
                .transpose()?,
            description,
            folder_id: self.folder_id,
            priority: self.priority,
            status: self.status,
            due_date: self.due_date.map(|due| due.map(truncate_to_seconds)),
            is_calendar_event: self.is_calendar_event,
        })
    }
}

/// Create input for one substep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubstep {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

impl NewSubstep {
    pub fn new(title: impl Into<String>, order_index: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            order_index,
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text("title", &self.title, TITLE_MAX_CHARS)?,
            description: optional_text("description", self.description.as_deref(), None)?,
            order_index: self.order_index,
        })
    }
}

/// Partial substep update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::model::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

impl SubstepPatch {
    pub fn completed(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Self::default()
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        let description = match self.description {
            Some(value) => Some(optional_text("description", value.as_deref(), None)?),
            None => None,
        };
        Ok(Self {
            title: self
                .title
                .map(|title| required_text("title", &title, TITLE_MAX_CHARS))
                .transpose()?,
            description,
            is_completed: self.is_completed,
            order_index: self.order_index,
        })
    }
}

impl TaskSubstep {
    pub fn apply(&mut self, patch: SubstepPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(order_index) = patch.order_index {
            self.order_index = order_index;
        }
    }
}

/// Create input for one task note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub content: String,
}

impl NewNote {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::Blank { field: "content" });
        }
        Ok(self)
    }
}

fn default_priority() -> u8 {
    PRIORITY_LOW
}

fn validate_priority(priority: u8) -> Result<(), ValidationError> {
    in_range(
        "priority",
        i64::from(priority),
        i64::from(PRIORITY_LOW),
        i64::from(PRIORITY_HIGH),
    )
}

fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

/// Parses the due-date shapes browsers send.
///
/// Accepted, in order: RFC 3339 with offset (kept as the wall-clock time of
/// that offset), `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM` (HTML
/// `datetime-local`), `YYYY-MM-DD HH:MM:SS` and a bare date (midnight).
pub fn parse_due_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Formats a due date in the canonical storage/wire format.
pub fn format_due_date(value: NaiveDateTime) -> String {
    value.format(DUE_DATE_FORMAT).to_string()
}

mod due_date_serde {
    use super::{format_due_date, parse_due_date};
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&format_due_date(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_due_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid due_date `{raw}`"))),
            None => Ok(None),
        }
    }
}

mod due_date_patch_serde {
    use super::{format_due_date, parse_due_date};
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        value: &Option<Option<NaiveDateTime>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(Some(value)) => serializer.serialize_str(&format_due_date(*value)),
            _ => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDateTime>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(Some(None)),
            Some(raw) => parse_due_date(&raw)
                .map(|due| Some(Some(due)))
                .ok_or_else(|| D::Error::custom(format!("invalid due_date `{raw}`"))),
            None => Ok(Some(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_due_date, NewTask, TaskPatch, TaskStatus, PRIORITY_LOW};
    use chrono::NaiveDate;

    #[test]
    fn parse_due_date_accepts_browser_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_due_date("2024-05-01T09:30:00"), Some(expected));
        assert_eq!(parse_due_date("2024-05-01T09:30"), Some(expected));
        assert_eq!(parse_due_date("2024-05-01 09:30:00"), Some(expected));
        assert_eq!(parse_due_date("2024-05-01T09:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_due_date("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_due_date("tomorrow"), None);
    }

    #[test]
    fn new_task_json_defaults_match_create_contract() {
        let task: NewTask = serde_json::from_str(r#"{"title":"Write report"}"#).unwrap();
        assert_eq!(task.priority, PRIORITY_LOW);
        assert!(!task.is_calendar_event);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn new_task_rejects_priority_out_of_range() {
        let mut task = NewTask::new("x");
        task.priority = 4;
        let err = task.normalize().unwrap_err();
        assert_eq!(err.field(), "priority");
    }

    #[test]
    fn patch_null_due_date_clears_and_missing_keeps() {
        let cleared: TaskPatch = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let kept: TaskPatch = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(kept.due_date, None);
        assert_eq!(kept.status, Some(TaskStatus::Completed));
    }

    #[test]
    fn patch_serialization_skips_absent_fields() {
        let json = serde_json::to_string(&TaskPatch::status(TaskStatus::InProgress)).unwrap();
        assert_eq!(json, r#"{"status":"in_progress"}"#);
    }
}
