//! HTTP error contract.
//!
//! Every failure leaves the server as `{"detail": "<message>"}` with a
//! status derived from the core error kind.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use daybook_core::{DbError, RepoError, ServiceError};
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Wire shape of an error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error returned by request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.detail)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// Status code for one service failure.
pub fn service_error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) | ServiceError::InvalidReference { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::CycleDetected { .. } => StatusCode::CONFLICT,
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::Repo(RepoError::Conflict(_)) => StatusCode::CONFLICT,
        ServiceError::Repo(_) | ServiceError::InconsistentState(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let status = service_error_status(&value);
        if status.is_server_error() {
            error!("event=request_failed module=api status=error error={value}");
            return Self::internal("Internal server error");
        }
        let detail = match &value {
            ServiceError::NotFound { entity, .. } => format!("{} not found", capitalize(entity)),
            ServiceError::Unauthorized => "Invalid token".to_string(),
            other => other.to_string(),
        };
        Self::new(status, detail)
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        RepoError::from(value).into()
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(value: rusqlite::Error) -> Self {
        RepoError::from(value).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::new(value.status(), value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::unprocessable(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::unprocessable(value.body_text())
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{service_error_status, ApiError};
    use axum::http::StatusCode;
    use daybook_core::{RepoError, ServiceError, ValidationError};

    #[test]
    fn service_errors_map_to_documented_statuses() {
        let cases = [
            (
                ServiceError::Validation(ValidationError::Blank { field: "title" }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::InvalidReference {
                    field: "folder_id",
                    id: 9,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::NotFound {
                    entity: "task",
                    id: 1,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::CycleDetected {
                    folder_id: 1,
                    parent_id: 2,
                },
                StatusCode::CONFLICT,
            ),
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Repo(RepoError::Conflict("dup".to_string())),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Repo(RepoError::InvalidData("bad".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_status(&err), status, "{err}");
        }
    }

    #[test]
    fn not_found_detail_names_the_entity() {
        let err = ApiError::from(ServiceError::NotFound {
            entity: "diary entry",
            id: 3,
        });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.detail, "Diary entry not found");
    }

    #[test]
    fn storage_failures_hide_internal_details() {
        let err = ApiError::from(ServiceError::InconsistentState("read-back"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail, "Internal server error");
    }
}
