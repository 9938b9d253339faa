//! `/api/calendar` month grid.

use crate::auth::resolve_user;
use crate::error::ApiError;
use crate::handlers::calendar_service;
use crate::wire::CalendarParams;
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, Local};
use daybook_core::MonthGrid;

pub async fn month(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<CalendarParams>, QueryRejection>,
) -> Result<Json<MonthGrid>, ApiError> {
    let Query(params) = params?;
    let today = Local::now().date_naive();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    let conn = state.conn().await;
    let user = resolve_user(&conn, &headers, state.allow_anonymous())?;
    let grid = calendar_service(&conn)?.month(
        user.id,
        year,
        month,
        params.week_start.unwrap_or_default(),
        today,
    )?;
    Ok(Json(grid))
}
