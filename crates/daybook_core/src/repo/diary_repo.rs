//! Diary entry repository contracts and SQLite implementation.
//!
//! # Invariants
//! - One row per `(user_id, entry_date, COALESCE(folder_id, 0))`.
//! - `upsert_entry` replaces the occupied slot inside one transaction.
//! - Listing order: `entry_date DESC, id DESC`.

use crate::model::diary::{DiaryEntry, DiaryEntryId, DiaryQuery, NewDiaryEntry};
use crate::model::user::UserId;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

const DIARY_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    folder_id,
    entry_date,
    title,
    content,
    mood,
    weather,
    preview_text,
    created_at,
    updated_at
FROM diary_entries";

/// Whether a save created a new slot or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// Repository interface for diary operations.
pub trait DiaryRepository {
    /// Creates or replaces the entry in the `(date, folder)` slot.
    fn upsert_entry(
        &self,
        user_id: UserId,
        entry: &NewDiaryEntry,
        preview_text: Option<&str>,
    ) -> RepoResult<(DiaryEntryId, SaveOutcome)>;
    fn get_entry(&self, user_id: UserId, id: DiaryEntryId) -> RepoResult<Option<DiaryEntry>>;
    fn list_entries(&self, user_id: UserId, query: &DiaryQuery) -> RepoResult<Vec<DiaryEntry>>;
    fn delete_entry(&self, user_id: UserId, id: DiaryEntryId) -> RepoResult<()>;
}

/// SQLite-backed diary repository.
pub struct SqliteDiaryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDiaryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["diary_entries"])?;
        Ok(Self { conn })
    }
}

impl DiaryRepository for SqliteDiaryRepository<'_> {
    fn upsert_entry(
        &self,
        user_id: UserId,
        entry: &NewDiaryEntry,
        preview_text: Option<&str>,
    ) -> RepoResult<(DiaryEntryId, SaveOutcome)> {
        let entry_date = format_entry_date(entry.entry_date);
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<DiaryEntryId> = tx
            .query_row(
                "SELECT id
                 FROM diary_entries
                 WHERE user_id = ?1
                   AND entry_date = ?2
                   AND folder_id IS ?3;",
                params![user_id, entry_date.as_str(), entry.folder_id],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE diary_entries
                     SET
                        title = ?2,
                        content = ?3,
                        mood = ?4,
                        weather = ?5,
                        preview_text = ?6,
                        updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
                     WHERE id = ?1;",
                    params![
                        id,
                        entry.title.as_deref(),
                        entry.content.as_str(),
                        entry.mood,
                        entry.weather.as_deref(),
                        preview_text,
                    ],
                )?;
                (id, SaveOutcome::Updated)
            }
            None => {
                tx.execute(
                    "INSERT INTO diary_entries (
                        user_id,
                        folder_id,
                        entry_date,
                        title,
                        content,
                        mood,
                        weather,
                        preview_text
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                    params![
                        user_id,
                        entry.folder_id,
                        entry_date.as_str(),
                        entry.title.as_deref(),
                        entry.content.as_str(),
                        entry.mood,
                        entry.weather.as_deref(),
                        preview_text,
                    ],
                )?;
                (tx.last_insert_rowid(), SaveOutcome::Created)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn get_entry(&self, user_id: UserId, id: DiaryEntryId) -> RepoResult<Option<DiaryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DIARY_SELECT_SQL} WHERE user_id = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id, id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_diary_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_entries(&self, user_id: UserId, query: &DiaryQuery) -> RepoResult<Vec<DiaryEntry>> {
        let mut sql = format!("{DIARY_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(user_id)];

        if let Some(entry_date) = query.entry_date {
            sql.push_str(" AND entry_date = ?");
            bind_values.push(Value::Text(format_entry_date(entry_date)));
        }
        if let Some(from) = query.from {
            sql.push_str(" AND entry_date >= ?");
            bind_values.push(Value::Text(format_entry_date(from)));
        }
        if let Some(to) = query.to {
            sql.push_str(" AND entry_date <= ?");
            bind_values.push(Value::Text(format_entry_date(to)));
        }
        if let Some(folder_id) = query.folder_id {
            sql.push_str(" AND folder_id = ?");
            bind_values.push(Value::Integer(folder_id));
        }
        sql.push_str(" ORDER BY entry_date DESC, id DESC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_diary_row(row)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, user_id: UserId, id: DiaryEntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM diary_entries WHERE user_id = ?1 AND id = ?2;",
            params![user_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "diary entry",
                id,
            });
        }
        Ok(())
    }
}

fn format_entry_date(value: NaiveDate) -> String {
    value.format(ENTRY_DATE_FORMAT).to_string()
}

fn parse_diary_row(row: &Row<'_>) -> RepoResult<DiaryEntry> {
    let date_text: String = row.get("entry_date")?;
    let entry_date = NaiveDate::parse_from_str(&date_text, ENTRY_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid entry date `{date_text}` in diary_entries.entry_date"
        ))
    })?;

    let mood = match row.get::<_, Option<i64>>("mood")? {
        Some(value) => Some(u8::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid mood `{value}` in diary_entries.mood"))
        })?),
        None => None,
    };

    Ok(DiaryEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        folder_id: row.get("folder_id")?,
        entry_date,
        title: row.get("title")?,
        content: row.get("content")?,
        mood,
        weather: row.get("weather")?,
        preview_text: row.get("preview_text")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
