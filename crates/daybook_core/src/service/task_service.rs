//! Task use-case service.
//!
//! # Responsibility
//! - Create, list, patch and delete tasks for one user.
//! - Manage substeps and notes under an owned task.
//!
//! # Invariants
//! - `folder_id`, when set, references a folder owned by the same user.
//! - Substep/note operations first resolve the task under the caller, so
//!   another user's task id behaves as not found.
//! - Every mutation returns the state read back from storage.

use crate::model::folder::FolderId;
use crate::model::task::{
    NewNote, NewSubstep, NewTask, SubstepId, SubstepPatch, Task, TaskId, TaskNote, TaskPatch,
    TaskSubstep,
};
use crate::model::user::UserId;
use crate::repo::folder_repo::FolderRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::service::folder_service::FolderService;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Task service facade.
pub struct TaskService<T: TaskRepository, F: FolderRepository> {
    tasks: T,
    folders: FolderService<F>,
}

impl<T: TaskRepository, F: FolderRepository> TaskService<T, F> {
    pub fn new(tasks: T, folders: F) -> Self {
        Self {
            tasks,
            folders: FolderService::new(folders),
        }
    }

    pub fn create_task(&self, user_id: UserId, task: NewTask) -> ServiceResult<Task> {
        let task = task.normalize()?;
        if let Some(folder_id) = task.folder_id {
            self.folders.ensure_owned(user_id, "folder_id", folder_id)?;
        }

        let id = self.tasks.create_task(user_id, &task)?;
        info!("event=task_create module=service status=ok user_id={user_id} task_id={id}");
        self.tasks
            .get_task(user_id, id)?
            .ok_or(ServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Lists tasks, optionally restricted to one folder.
    pub fn list_tasks(&self, user_id: UserId, folder_id: Option<FolderId>) -> ServiceResult<Vec<Task>> {
        let query = TaskListQuery {
            folder_id,
            ..TaskListQuery::default()
        };
        Ok(self.tasks.list_tasks(user_id, &query)?)
    }

    pub fn get_task(&self, user_id: UserId, id: TaskId) -> ServiceResult<Task> {
        self.tasks
            .get_task(user_id, id)?
            .ok_or(ServiceError::NotFound { entity: "task", id })
    }

    /// Applies a partial update and returns the stored task.
    pub fn update_task(&self, user_id: UserId, id: TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        let patch = patch.normalize()?;
        if let Some(Some(folder_id)) = patch.folder_id {
            self.folders.ensure_owned(user_id, "folder_id", folder_id)?;
        }

        let mut task = self.get_task(user_id, id)?;
        task.apply(patch);
        self.tasks.update_task(&task)?;
        self.get_task(user_id, id)
    }

    pub fn delete_task(&self, user_id: UserId, id: TaskId) -> ServiceResult<()> {
        self.tasks.delete_task(user_id, id)?;
        info!("event=task_delete module=service status=ok user_id={user_id} task_id={id}");
        Ok(())
    }

    pub fn add_substep(
        &self,
        user_id: UserId,
        task_id: TaskId,
        substep: NewSubstep,
    ) -> ServiceResult<TaskSubstep> {
        let substep = substep.normalize()?;
        self.get_task(user_id, task_id)?;
        Ok(self.tasks.create_substep(task_id, &substep)?)
    }

    pub fn update_substep(
        &self,
        user_id: UserId,
        task_id: TaskId,
        substep_id: SubstepId,
        patch: SubstepPatch,
    ) -> ServiceResult<TaskSubstep> {
        let patch = patch.normalize()?;
        self.get_task(user_id, task_id)?;

        let mut substep = self.load_substep(task_id, substep_id)?;
        substep.apply(patch);
        self.tasks.update_substep(&substep)?;
        self.load_substep(task_id, substep_id)
    }

    pub fn delete_substep(
        &self,
        user_id: UserId,
        task_id: TaskId,
        substep_id: SubstepId,
    ) -> ServiceResult<()> {
        self.get_task(user_id, task_id)?;
        Ok(self.tasks.delete_substep(task_id, substep_id)?)
    }

    pub fn add_note(&self, user_id: UserId, task_id: TaskId, note: NewNote) -> ServiceResult<TaskNote> {
        let note = note.normalize()?;
        self.get_task(user_id, task_id)?;
        Ok(self.tasks.create_note(task_id, &note)?)
    }

    fn load_substep(&self, task_id: TaskId, substep_id: SubstepId) -> ServiceResult<TaskSubstep> {
        self.tasks
            .get_substep(task_id, substep_id)?
            .ok_or(ServiceError::NotFound {
                entity: "substep",
                id: substep_id,
            })
    }
}
