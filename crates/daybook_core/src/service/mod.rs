//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce cross-row invariants (ownership of referenced folders, folder
//!   cycles) that a single repository call cannot see.
//! - Keep HTTP/CLI layers decoupled from storage details.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod calendar_service;
pub mod diary_service;
pub mod folder_service;
pub mod markdown;
pub mod task_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every core service.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation.
    Validation(ValidationError),
    /// Addressed row does not exist for this user.
    NotFound { entity: &'static str, id: i64 },
    /// Input references a row the user does not own.
    InvalidReference { field: &'static str, id: i64 },
    /// Re-parenting would make a folder its own ancestor.
    CycleDetected { folder_id: i64, parent_id: i64 },
    /// Bearer token is unknown.
    Unauthorized,
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidReference { field, id } => {
                write!(f, "`{field}` references unknown id {id}")
            }
            Self::CycleDetected {
                folder_id,
                parent_id,
            } => write!(
                f,
                "move would create cycle: folder {folder_id} under parent {parent_id}"
            ),
            Self::Unauthorized => write!(f, "invalid token"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}
