//! Diary entry model.
//!
//! # Invariants
//! - One entry per `(user, entry_date, folder)` slot; saving into an
//!   occupied slot replaces that entry.
//! - `mood` is within `MOOD_MIN..=MOOD_MAX` when set.
//! - `preview_text` is derived from `content`, never client-provided.

use crate::model::folder::FolderId;
use crate::model::user::UserId;
use crate::model::validation::{in_range, optional_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type DiaryEntryId = i64;

pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 5;
pub const DIARY_TITLE_MAX_CHARS: usize = 500;
pub const WEATHER_MAX_CHARS: usize = 50;

/// Dated journal record with markdown content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: DiaryEntryId,
    pub user_id: UserId,
    pub folder_id: Option<FolderId>,
    pub entry_date: NaiveDate,
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<u8>,
    pub weather: Option<String>,
    pub preview_text: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Save input for one diary slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiaryEntry {
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub weather: Option<String>,
}

impl NewDiaryEntry {
    pub fn new(entry_date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            entry_date,
            title: None,
            content: content.into(),
            folder_id: None,
            mood: None,
            weather: None,
        }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        if let Some(mood) = self.mood {
            in_range(
                "mood",
                i64::from(mood),
                i64::from(MOOD_MIN),
                i64::from(MOOD_MAX),
            )?;
        }
        Ok(Self {
            entry_date: self.entry_date,
            title: optional_text("title", self.title.as_deref(), Some(DIARY_TITLE_MAX_CHARS))?,
            content: self.content,
            folder_id: self.folder_id,
            mood: self.mood,
            weather: optional_text("weather", self.weather.as_deref(), Some(WEATHER_MAX_CHARS))?,
        })
    }
}

/// Filters for diary listing. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryQuery {
    /// Exact entry date.
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    /// Inclusive lower bound.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
}

impl DiaryQuery {
    pub fn on(entry_date: NaiveDate) -> Self {
        Self {
            entry_date: Some(entry_date),
            ..Self::default()
        }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NewDiaryEntry;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn normalize_rejects_mood_outside_scale() {
        let mut entry = NewDiaryEntry::new(day(), "hello");
        entry.mood = Some(6);
        assert_eq!(entry.normalize().unwrap_err().field(), "mood");
    }

    #[test]
    fn normalize_keeps_empty_content_and_drops_blank_weather() {
        let mut entry = NewDiaryEntry::new(day(), "");
        entry.weather = Some("   ".to_string());
        entry.title = Some(" Saturday ".to_string());
        let normalized = entry.normalize().unwrap();
        assert_eq!(normalized.content, "");
        assert_eq!(normalized.weather, None);
        assert_eq!(normalized.title.as_deref(), Some("Saturday"));
    }

    #[test]
    fn entry_date_uses_iso_calendar_date_on_the_wire() {
        let entry: NewDiaryEntry =
            serde_json::from_str(r#"{"entry_date":"2024-03-09","content":"x"}"#).unwrap();
        assert_eq!(entry.entry_date, day());
    }
}
