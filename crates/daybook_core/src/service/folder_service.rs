//! Folder use-case service.
//!
//! # Invariants
//! - A parent folder must exist and belong to the same user.
//! - Re-parenting must not create parent-child cycles.

use crate::model::folder::{Folder, FolderId, FolderPatch, NewFolder};
use crate::model::user::UserId;
use crate::repo::folder_repo::FolderRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;
use std::collections::HashSet;

/// Folder service facade.
pub struct FolderService<R: FolderRepository> {
    repo: R,
}

impl<R: FolderRepository> FolderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_folder(&self, user_id: UserId, folder: NewFolder) -> ServiceResult<Folder> {
        let folder = folder.normalize()?;
        if let Some(parent_id) = folder.parent_folder_id {
            self.ensure_parent(user_id, parent_id)?;
        }
        let created = self.repo.create_folder(user_id, &folder)?;
        info!(
            "event=folder_create module=service status=ok user_id={user_id} folder_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn list_folders(&self, user_id: UserId) -> ServiceResult<Vec<Folder>> {
        Ok(self.repo.list_folders(user_id)?)
    }

    pub fn get_folder(&self, user_id: UserId, id: FolderId) -> ServiceResult<Folder> {
        self.repo
            .get_folder(user_id, id)?
            .ok_or(ServiceError::NotFound { entity: "folder", id })
    }

    /// Renames, recolors and/or re-parents one folder.
    pub fn update_folder(
        &self,
        user_id: UserId,
        id: FolderId,
        patch: FolderPatch,
    ) -> ServiceResult<Folder> {
        let patch = patch.normalize()?;
        let mut folder = self.get_folder(user_id, id)?;

        if let Some(Some(parent_id)) = patch.parent_folder_id {
            self.ensure_parent(user_id, parent_id)?;
            if self.would_create_cycle(user_id, id, parent_id)? {
                return Err(ServiceError::CycleDetected {
                    folder_id: id,
                    parent_id,
                });
            }
        }

        folder.apply(patch);
        self.repo.update_folder(&folder)?;
        self.get_folder(user_id, id)
    }

    /// Deletes one folder and its descendants; contained tasks and diary
    /// entries are kept without a folder.
    pub fn delete_folder(&self, user_id: UserId, id: FolderId) -> ServiceResult<()> {
        self.repo.delete_folder(user_id, id)?;
        info!("event=folder_delete module=service status=ok user_id={user_id} folder_id={id}");
        Ok(())
    }

    /// Fails with `InvalidReference` unless `folder_id` belongs to the user.
    pub fn ensure_owned(
        &self,
        user_id: UserId,
        field: &'static str,
        folder_id: FolderId,
    ) -> ServiceResult<()> {
        match self.repo.get_folder(user_id, folder_id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::InvalidReference {
                field,
                id: folder_id,
            }),
        }
    }

    fn ensure_parent(&self, user_id: UserId, parent_id: FolderId) -> ServiceResult<()> {
        self.ensure_owned(user_id, "parent_folder_id", parent_id)
    }

    fn would_create_cycle(
        &self,
        user_id: UserId,
        folder_id: FolderId,
        candidate_parent_id: FolderId,
    ) -> ServiceResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_id);
        while let Some(current) = cursor {
            if current == folder_id || !visited.insert(current) {
                return Ok(true);
            }
            let folder = self
                .repo
                .get_folder(user_id, current)?
                .ok_or(ServiceError::InvalidReference {
                    field: "parent_folder_id",
                    id: current,
                })?;
            cursor = folder.parent_folder_id;
        }
        Ok(false)
    }
}
