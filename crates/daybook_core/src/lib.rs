//! Core domain logic for Daybook: tasks, diary, folders and the month
//! calendar.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, probe, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSink};
pub use model::calendar::{CalendarDay, CalendarTask, MonthGrid, WeekStart};
pub use model::diary::{DiaryEntry, DiaryEntryId, DiaryQuery, NewDiaryEntry};
pub use model::folder::{Folder, FolderId, FolderPatch, NewFolder};
pub use model::task::{
    NewNote, NewSubstep, NewTask, SubstepId, SubstepPatch, Task, TaskId, TaskNote, TaskPatch,
    TaskStatus, TaskSubstep,
};
pub use model::user::{User, UserId};
pub use model::validation::ValidationError;
pub use repo::diary_repo::{DiaryRepository, SaveOutcome, SqliteDiaryRepository};
pub use repo::folder_repo::{FolderRepository, SqliteFolderRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::calendar_service::CalendarService;
pub use service::diary_service::DiaryService;
pub use service::folder_service::FolderService;
pub use service::task_service::TaskService;
pub use service::user_service::{DevUserGrant, UserService};
pub use service::{ServiceError, ServiceResult};

