//! Diary use-case service.
//!
//! # Invariants
//! - Saving into an occupied `(date, folder)` slot replaces that entry.
//! - `preview_text` is recomputed from `content` on every save.

use crate::model::diary::{DiaryEntry, DiaryEntryId, DiaryQuery, NewDiaryEntry};
use crate::model::user::UserId;
use crate::repo::diary_repo::{DiaryRepository, SaveOutcome};
use crate::repo::folder_repo::FolderRepository;
use crate::service::folder_service::FolderService;
use crate::service::markdown::preview_text;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Diary service facade.
pub struct DiaryService<D: DiaryRepository, F: FolderRepository> {
    entries: D,
    folders: FolderService<F>,
}

impl<D: DiaryRepository, F: FolderRepository> DiaryService<D, F> {
    pub fn new(entries: D, folders: F) -> Self {
        Self {
            entries,
            folders: FolderService::new(folders),
        }
    }

    /// Creates the entry for its slot or replaces the one already there.
    pub fn save_entry(
        &self,
        user_id: UserId,
        entry: NewDiaryEntry,
    ) -> ServiceResult<(DiaryEntry, SaveOutcome)> {
        let entry = entry.normalize()?;
        if let Some(folder_id) = entry.folder_id {
            self.folders.ensure_owned(user_id, "folder_id", folder_id)?;
        }

        let preview = preview_text(&entry.content);
        let (id, outcome) = self
            .entries
            .upsert_entry(user_id, &entry, preview.as_deref())?;
        info!(
            "event=diary_save module=service status=ok user_id={user_id} entry_id={id} outcome={}",
            match outcome {
                SaveOutcome::Created => "created",
                SaveOutcome::Updated => "updated",
            }
        );

        let saved = self
            .entries
            .get_entry(user_id, id)?
            .ok_or(ServiceError::InconsistentState(
                "saved diary entry not found in read-back",
            ))?;
        Ok((saved, outcome))
    }

    pub fn list_entries(&self, user_id: UserId, query: &DiaryQuery) -> ServiceResult<Vec<DiaryEntry>> {
        Ok(self.entries.list_entries(user_id, query)?)
    }

    pub fn get_entry(&self, user_id: UserId, id: DiaryEntryId) -> ServiceResult<DiaryEntry> {
        self.entries
            .get_entry(user_id, id)?
            .ok_or(ServiceError::NotFound {
                entity: "diary entry",
                id,
            })
    }

    pub fn delete_entry(&self, user_id: UserId, id: DiaryEntryId) -> ServiceResult<()> {
        Ok(self.entries.delete_entry(user_id, id)?)
    }
}
