//! User account model.

use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Email of the development fallback user.
pub const DEV_USER_EMAIL: &str = "test@example.com";
/// Display name of the development fallback user.
pub const DEV_USER_NAME: &str = "Test User";

/// Account owning folders, tasks and diary entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}
