//! `/api/diary` handlers.

use crate::auth::resolve_user;
use crate::error::ApiError;
use crate::handlers::diary_service;
use crate::wire::{folder_filter, DiaryListParams};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use daybook_core::{DiaryEntry, DiaryEntryId, DiaryQuery, NewDiaryEntry, SaveOutcome};

pub async fn list_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<DiaryListParams>, QueryRejection>,
) -> Result<Json<Vec<DiaryEntry>>, ApiError> {
    let Query(params) = params?;
    let query = DiaryQuery {
        entry_date: params.entry_date,
        from: params.from,
        to: params.to,
        folder_id: folder_filter(params.folder_id),
    };
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    Ok(Json(diary_service(&conn)?.list_entries(user.id, &query)?))
}

/// Answers 201 for a new slot and 200 when an entry was replaced.
pub async fn save_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewDiaryEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<DiaryEntry>), ApiError> {
    let Json(entry) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let (saved, outcome) = diary_service(&conn)?.save_entry(user.id, entry)?;
    let status = match outcome {
        SaveOutcome::Created => StatusCode::CREATED,
        SaveOutcome::Updated => StatusCode::OK,
    };
    Ok((status, Json(saved)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<DiaryEntryId>, PathRejection>,
) -> Result<Json<DiaryEntry>, ApiError> {
    let Path(id) = id?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    Ok(Json(diary_service(&conn)?.get_entry(user.id, id)?))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<DiaryEntryId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    diary_service(&conn)?.delete_entry(user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
