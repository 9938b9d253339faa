//! Request handlers, one module per resource.
//!
//! Handlers lock the shared connection, resolve the caller and delegate to
//! a core service built over that connection.

pub mod calendar;
pub mod diary;
pub mod folders;
pub mod health;
pub mod tasks;

use crate::error::ApiError;
use daybook_core::{
    CalendarService, DiaryService, FolderService, SqliteDiaryRepository, SqliteFolderRepository,
    SqliteTaskRepository, TaskService,
};
use rusqlite::Connection;

pub(crate) type Tasks<'conn> =
    TaskService<SqliteTaskRepository<'conn>, SqliteFolderRepository<'conn>>;
pub(crate) type Diary<'conn> =
    DiaryService<SqliteDiaryRepository<'conn>, SqliteFolderRepository<'conn>>;
pub(crate) type Calendar<'conn> =
    CalendarService<SqliteTaskRepository<'conn>, SqliteDiaryRepository<'conn>>;

pub(crate) fn task_service(conn: &Connection) -> Result<Tasks<'_>, ApiError> {
    Ok(TaskService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteFolderRepository::try_new(conn)?,
    ))
}

pub(crate) fn diary_service(conn: &Connection) -> Result<Diary<'_>, ApiError> {
    Ok(DiaryService::new(
        SqliteDiaryRepository::try_new(conn)?,
        SqliteFolderRepository::try_new(conn)?,
    ))
}

pub(crate) fn folder_service(
    conn: &Connection,
) -> Result<FolderService<SqliteFolderRepository<'_>>, ApiError> {
    Ok(FolderService::new(SqliteFolderRepository::try_new(conn)?))
}

pub(crate) fn calendar_service(conn: &Connection) -> Result<Calendar<'_>, ApiError> {
    Ok(CalendarService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteDiaryRepository::try_new(conn)?,
    ))
}
