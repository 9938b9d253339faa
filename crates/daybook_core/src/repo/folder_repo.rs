//! Folder repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing is deterministic: `name COLLATE NOCASE ASC, id ASC`.
//! - Deleting a folder cascades to descendant folders (schema FK) and
//!   detaches tasks/diary entries (`ON DELETE SET NULL`).

use crate::model::folder::{Folder, FolderId, NewFolder};
use crate::model::user::UserId;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FOLDER_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    name,
    color,
    parent_folder_id,
    created_at,
    updated_at
FROM folders";

/// Repository interface for folder operations.
pub trait FolderRepository {
    fn create_folder(&self, user_id: UserId, folder: &NewFolder) -> RepoResult<Folder>;
    fn get_folder(&self, user_id: UserId, id: FolderId) -> RepoResult<Option<Folder>>;
    fn list_folders(&self, user_id: UserId) -> RepoResult<Vec<Folder>>;
    /// Persists name, color and parent of an existing folder.
    fn update_folder(&self, folder: &Folder) -> RepoResult<()>;
    fn delete_folder(&self, user_id: UserId, id: FolderId) -> RepoResult<()>;
}

/// SQLite-backed folder repository.
pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["folders"])?;
        Ok(Self { conn })
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn create_folder(&self, user_id: UserId, folder: &NewFolder) -> RepoResult<Folder> {
        self.conn.execute(
            "INSERT INTO folders (user_id, name, color, parent_folder_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user_id,
                folder.name.as_str(),
                folder.color.as_str(),
                folder.parent_folder_id,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_folder(user_id, id)?
            .ok_or(RepoError::NotFound { entity: "folder", id })
    }

    fn get_folder(&self, user_id: UserId, id: FolderId) -> RepoResult<Option<Folder>> {
        let folder = self
            .conn
            .query_row(
                &format!("{FOLDER_SELECT_SQL} WHERE user_id = ?1 AND id = ?2;"),
                params![user_id, id],
                parse_folder_row,
            )
            .optional()?;
        Ok(folder)
    }

    fn list_folders(&self, user_id: UserId) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let folders = stmt
            .query_map([user_id], parse_folder_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(folders)
    }

    fn update_folder(&self, folder: &Folder) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE folders
             SET
                name = ?3,
                color = ?4,
                parent_folder_id = ?5,
                updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE user_id = ?1 AND id = ?2;",
            params![
                folder.user_id,
                folder.id,
                folder.name.as_str(),
                folder.color.as_str(),
                folder.parent_folder_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "folder",
                id: folder.id,
            });
        }
        Ok(())
    }

    fn delete_folder(&self, user_id: UserId, id: FolderId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM folders WHERE user_id = ?1 AND id = ?2;",
            params![user_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "folder", id });
        }
        Ok(())
    }
}

fn parse_folder_row(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        parent_folder_id: row.get("parent_folder_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
