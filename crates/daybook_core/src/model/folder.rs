//! Folder model.
//!
//! # Invariants
//! - `name` is trimmed, non-blank and at most 255 chars.
//! - `color` is a `#RRGGBB` hex string stored uppercase.
//! - `parent_folder_id` never forms a cycle (enforced by `FolderService`).

use crate::model::user::UserId;
use crate::model::validation::{required_text, ValidationError};
use serde::{Deserialize, Serialize};

pub type FolderId = i64;

pub const DEFAULT_FOLDER_COLOR: &str = "#3B82F6";
pub const FOLDER_NAME_MAX_CHARS: usize = 255;

/// Named, colored grouping container for tasks and diary entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub parent_folder_id: Option<FolderId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create input for one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFolder {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub parent_folder_id: Option<FolderId>,
}

impl NewFolder {
    /// Builds a root-level folder input with the default color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: default_color(),
            parent_folder_id: None,
        }
    }

    /// Trims the name and canonicalizes the color.
    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", &self.name, FOLDER_NAME_MAX_CHARS)?,
            color: normalize_color(&self.color)?,
            parent_folder_id: self.parent_folder_id,
        })
    }
}

/// Partial update for one folder. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// `Some(None)` moves the folder to the root level.
    #[serde(
        default,
        deserialize_with = "crate::model::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_folder_id: Option<Option<FolderId>>,
}

impl FolderPatch {
    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self
                .name
                .map(|name| required_text("name", &name, FOLDER_NAME_MAX_CHARS))
                .transpose()?,
            color: self.color.map(|color| normalize_color(&color)).transpose()?,
            parent_folder_id: self.parent_folder_id,
        })
    }
}

impl Folder {
    /// Applies a normalized patch in place.
    pub fn apply(&mut self, patch: FolderPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(parent_folder_id) = patch.parent_folder_id {
            self.parent_folder_id = parent_folder_id;
        }
    }
}

/// Validates `#RRGGBB` and returns it uppercased.
pub fn normalize_color(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|ch| ch.is_ascii_hexdigit());
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "color",
            expected: "a #RRGGBB hex color",
        });
    }
    Ok(trimmed.to_ascii_uppercase())
}

fn default_color() -> String {
    DEFAULT_FOLDER_COLOR.to_string()
}
