//! Task, substep and note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the task aggregate across `tasks`, `task_substeps` and
//!   `task_notes`.
//! - Load tasks with their substeps and notes attached.
//!
//! # Invariants
//! - Task listing order: `due_date IS NULL, due_date ASC, priority DESC,
//!   id ASC` (undated tasks last, urgent first within one instant).
//! - Substep order: `order_index ASC, id ASC`; note order: `created_at ASC,
//!   id ASC`.
//! - Substep/note APIs take a `task_id` the caller already owns.

use crate::model::folder::FolderId;
use crate::model::task::{
    format_due_date, parse_due_date, NewNote, NewSubstep, NewTask, NoteId, SubstepId, Task,
    TaskId, TaskNote, TaskStatus, TaskSubstep,
};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, ensure_tables, int_to_bool, RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    folder_id,
    title,
    description,
    priority,
    status,
    due_date,
    is_calendar_event,
    google_calendar_event_id,
    created_at,
    updated_at
FROM tasks";

const SUBSTEP_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    title,
    description,
    is_completed,
    order_index,
    created_at,
    updated_at
FROM task_substeps";

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub folder_id: Option<FolderId>,
    /// Inclusive lower bound on `due_date`; excludes undated tasks.
    pub due_from: Option<NaiveDateTime>,
    /// Exclusive upper bound on `due_date`; excludes undated tasks.
    pub due_before: Option<NaiveDateTime>,
}

impl TaskListQuery {
    /// Tasks due on any day in `from..=to`.
    pub fn due_between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            due_from: from.and_hms_opt(0, 0, 0),
            due_before: to.succ_opt().and_then(|next| next.and_hms_opt(0, 0, 0)),
            ..Self::default()
        }
    }
}

/// Repository interface for the task aggregate.
pub trait TaskRepository {
    fn create_task(&self, user_id: UserId, task: &NewTask) -> RepoResult<TaskId>;
    fn get_task(&self, user_id: UserId, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Persists scalar task fields; substeps and notes are not touched.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, user_id: UserId, id: TaskId) -> RepoResult<()>;
    fn create_substep(&self, task_id: TaskId, substep: &NewSubstep) -> RepoResult<TaskSubstep>;
    fn get_substep(&self, task_id: TaskId, id: SubstepId) -> RepoResult<Option<TaskSubstep>>;
    fn update_substep(&self, substep: &TaskSubstep) -> RepoResult<()>;
    fn delete_substep(&self, task_id: TaskId, id: SubstepId) -> RepoResult<()>;
    fn create_note(&self, task_id: TaskId, note: &NewNote) -> RepoResult<TaskNote>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["tasks", "task_substeps", "task_notes"])?;
        Ok(Self { conn })
    }

    fn attach_children(&self, mut task: Task) -> RepoResult<Task> {
        task.substeps = load_substeps(self.conn, task.id)?;
        task.notes = load_notes(self.conn, task.id)?;
        Ok(task)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, user_id: UserId, task: &NewTask) -> RepoResult<TaskId> {
        self.conn.execute(
            "INSERT INTO tasks (
                user_id,
                folder_id,
                title,
                description,
                priority,
                status,
                due_date,
                is_calendar_event
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7);",
            params![
                user_id,
                task.folder_id,
                task.title.as_str(),
                task.description.as_deref(),
                task.priority,
                task.due_date.map(format_due_date),
                bool_to_int(task.is_calendar_event),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_task(&self, user_id: UserId, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE user_id = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id, id])?;
        match rows.next()? {
            Some(row) => {
                let task = parse_task_row(row)?;
                Ok(Some(self.attach_children(task)?))
            }
            None => Ok(None),
        }
    }

    fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(user_id)];

        if let Some(folder_id) = query.folder_id {
            sql.push_str(" AND folder_id = ?");
            bind_values.push(Value::Integer(folder_id));
        }
        if let Some(due_from) = query.due_from {
            sql.push_str(" AND due_date >= ?");
            bind_values.push(Value::Text(format_due_date(due_from)));
        }
        if let Some(due_before) = query.due_before {
            sql.push_str(" AND due_date < ?");
            bind_values.push(Value::Text(format_due_date(due_before)));
        }
        sql.push_str(" ORDER BY due_date IS NULL, due_date ASC, priority DESC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        drop(rows);

        tasks
            .into_iter()
            .map(|task| self.attach_children(task))
            .collect()
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                folder_id = ?3,
                title = ?4,
                description = ?5,
                priority = ?6,
                status = ?7,
                due_date = ?8,
                is_calendar_event = ?9,
                google_calendar_event_id = ?10,
                updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE user_id = ?1 AND id = ?2;",
            params![
                task.user_id,
                task.id,
                task.folder_id,
                task.title.as_str(),
                task.description.as_deref(),
                task.priority,
                task.status.as_str(),
                task.due_date.map(format_due_date),
                bool_to_int(task.is_calendar_event),
                task.google_calendar_event_id.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }
        Ok(())
    }

    fn delete_task(&self, user_id: UserId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE user_id = ?1 AND id = ?2;",
            params![user_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn create_substep(&self, task_id: TaskId, substep: &NewSubstep) -> RepoResult<TaskSubstep> {
        self.conn.execute(
            "INSERT INTO task_substeps (task_id, title, description, order_index)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task_id,
                substep.title.as_str(),
                substep.description.as_deref(),
                substep.order_index,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_substep(task_id, id)?
            .ok_or(RepoError::NotFound { entity: "substep", id })
    }

    fn get_substep(&self, task_id: TaskId, id: SubstepId) -> RepoResult<Option<TaskSubstep>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBSTEP_SELECT_SQL} WHERE task_id = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![task_id, id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_substep_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_substep(&self, substep: &TaskSubstep) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE task_substeps
             SET
                title = ?3,
                description = ?4,
                is_completed = ?5,
                order_index = ?6,
                updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE task_id = ?1 AND id = ?2;",
            params![
                substep.task_id,
                substep.id,
                substep.title.as_str(),
                substep.description.as_deref(),
                bool_to_int(substep.is_completed),
                substep.order_index,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "substep",
                id: substep.id,
            });
        }
        touch_task(self.conn, substep.task_id)
    }

    fn delete_substep(&self, task_id: TaskId, id: SubstepId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM task_substeps WHERE task_id = ?1 AND id = ?2;",
            params![task_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "substep", id });
        }
        touch_task(self.conn, task_id)
    }

    fn create_note(&self, task_id: TaskId, note: &NewNote) -> RepoResult<TaskNote> {
        self.conn.execute(
            "INSERT INTO task_notes (task_id, content) VALUES (?1, ?2);",
            params![task_id, note.content.as_str()],
        )?;
        let id: NoteId = self.conn.last_insert_rowid();
        let created = self
            .conn
            .query_row(
                "SELECT id, task_id, content, created_at FROM task_notes WHERE id = ?1;",
                [id],
                parse_note_row,
            )
            .optional()?;
        created.ok_or(RepoError::NotFound { entity: "note", id })
    }
}

fn touch_task(conn: &Connection, task_id: TaskId) -> RepoResult<()> {
    conn.execute(
        "UPDATE tasks SET updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER)) WHERE id = ?1;",
        [task_id],
    )?;
    Ok(())
}

fn load_substeps(conn: &Connection, task_id: TaskId) -> RepoResult<Vec<TaskSubstep>> {
    let mut stmt = conn.prepare(&format!(
        "{SUBSTEP_SELECT_SQL} WHERE task_id = ?1 ORDER BY order_index ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([task_id])?;
    let mut substeps = Vec::new();
    while let Some(row) = rows.next()? {
        substeps.push(parse_substep_row(row)?);
    }
    Ok(substeps)
}

fn load_notes(conn: &Connection, task_id: TaskId) -> RepoResult<Vec<TaskNote>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, content, created_at
         FROM task_notes
         WHERE task_id = ?1
         ORDER BY created_at ASC, id ASC;",
    )?;
    let notes = stmt
        .query_map([task_id], parse_note_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(parse_due_date(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid due date `{value}` in tasks.due_date"))
        })?),
        None => None,
    };

    let priority: i64 = row.get("priority")?;
    let priority = u8::try_from(priority).map_err(|_| {
        RepoError::InvalidData(format!("invalid priority `{priority}` in tasks.priority"))
    })?;

    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        folder_id: row.get("folder_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        status,
        due_date,
        is_calendar_event: int_to_bool("tasks.is_calendar_event", row.get("is_calendar_event")?)?,
        google_calendar_event_id: row.get("google_calendar_event_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        substeps: Vec::new(),
        notes: Vec::new(),
    })
}

fn parse_substep_row(row: &Row<'_>) -> RepoResult<TaskSubstep> {
    Ok(TaskSubstep {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed: int_to_bool("task_substeps.is_completed", row.get("is_completed")?)?,
        order_index: row.get("order_index")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<TaskNote> {
    Ok(TaskNote {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
