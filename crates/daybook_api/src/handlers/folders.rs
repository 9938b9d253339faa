//! `/api/folders` handlers.

use crate::auth::resolve_user;
use crate::error::ApiError;
use crate::handlers::folder_service;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use daybook_core::{Folder, FolderId, FolderPatch, NewFolder};

pub async fn list_folders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Folder>>, ApiError> {
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    Ok(Json(folder_service(&conn)?.list_folders(user.id)?))
}

pub async fn create_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewFolder>, JsonRejection>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    let Json(folder) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let created = folder_service(&conn)?.create_folder(user.id, folder)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<FolderId>, PathRejection>,
    payload: Result<Json<FolderPatch>, JsonRejection>,
) -> Result<Json<Folder>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    Ok(Json(folder_service(&conn)?.update_folder(user.id, id, patch)?))
}

/// Deletes the folder subtree; contained items lose their folder.
pub async fn delete_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<FolderId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    folder_service(&conn)?.delete_folder(user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
