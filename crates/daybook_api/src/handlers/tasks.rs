//! `/api/tasks` handlers, including substeps and notes.

use crate::auth::resolve_user;
use crate::error::ApiError;
use crate::handlers::task_service;
use crate::wire::{folder_filter, NoteParams, TaskListParams};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use daybook_core::{
    NewNote, NewSubstep, NewTask, SubstepId, SubstepPatch, Task, TaskId, TaskNote, TaskPatch,
    TaskSubstep,
};

pub async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Query(params) = params?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let tasks = task_service(&conn)?.list_tasks(user.id, folder_filter(params.folder_id))?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(task) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let created = task_service(&conn)?.create_task(user.id, task)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<TaskId>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(id) = id?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    Ok(Json(task_service(&conn)?.get_task(user.id, id)?))
}

pub async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    Ok(Json(task_service(&conn)?.update_task(user.id, id, patch)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<TaskId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    task_service(&conn)?.delete_task(user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_substep(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<NewSubstep>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskSubstep>), ApiError> {
    let Path(task_id) = id?;
    let Json(substep) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let created = task_service(&conn)?.add_substep(user.id, task_id, substep)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_substep(
    State(state): State<AppState>,
    headers: HeaderMap,
    ids: Result<Path<(TaskId, SubstepId)>, PathRejection>,
    payload: Result<Json<SubstepPatch>, JsonRejection>,
) -> Result<Json<TaskSubstep>, ApiError> {
    let Path((task_id, substep_id)) = ids?;
    let Json(patch) = payload?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let updated = task_service(&conn)?.update_substep(user.id, task_id, substep_id, patch)?;
    Ok(Json(updated))
}

pub async fn delete_substep(
    State(state): State<AppState>,
    headers: HeaderMap,
    ids: Result<Path<(TaskId, SubstepId)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((task_id, substep_id)) = ids?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    task_service(&conn)?.delete_substep(user.id, task_id, substep_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accepts the note either as a JSON body or as `?content=`.
pub async fn add_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<TaskId>, PathRejection>,
    params: Result<Query<NoteParams>, QueryRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskNote>), ApiError> {
    let Path(task_id) = id?;
    let Query(params) = params?;
    let note = note_from_request(&body, params)?;
    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let created = task_service(&conn)?.add_note(user.id, task_id, note)?;
    Ok((StatusCode::CREATED, Json(created)))
}

fn note_from_request(body: &[u8], params: NoteParams) -> Result<NewNote, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return params
            .content
            .map(|content| NewNote::new(content))
            .ok_or_else(|| ApiError::unprocessable("`content` is required"));
    }
    serde_json::from_slice::<NewNote>(body)
        .map_err(|err| ApiError::unprocessable(format!("invalid note body: {err}")))
}
