//! Domain model for tasks, folders, diary entries and the calendar view.
//!
//! # Responsibility
//! - Define canonical records returned by repositories and services.
//! - Define write-side inputs (`New*`, `*Patch`) and their normalization.
//!
//! # Invariants
//! - Every record is identified by a SQLite row id scoped to one user.
//! - Timestamps (`created_at`, `updated_at`) are Unix epoch milliseconds.
//! - Write inputs must pass `normalize()` before reaching a repository.

pub mod calendar;
pub mod diary;
pub mod folder;
pub mod task;
pub mod user;
pub mod validation;

use serde::{Deserialize, Deserializer};

/// Deserializes a present-but-nullable patch field.
///
/// Missing field stays `None` (through `#[serde(default)]`), explicit `null`
/// becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
