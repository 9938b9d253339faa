//! Liveness, database checks and the development user bootstrap.

use crate::error::ApiError;
use crate::wire::{DbCheck, DevUserResponse, HealthReport, RootStatus};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use daybook_core::{probe, RepoError, ServiceResult, SqliteUserRepository, UserService};
use log::warn;
use rusqlite::Connection;

pub async fn root() -> Json<RootStatus> {
    Json(RootStatus {
        message: "Daybook API is running!".to_string(),
        status: "healthy".to_string(),
    })
}

/// Reports database reachability; failures still answer 200.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let conn = state.conn().await;
    Json(health_report(&conn))
}

pub async fn test_db(State(state): State<AppState>) -> Json<DbCheck> {
    let conn = state.conn().await;
    Json(db_check(&conn))
}

/// Gets or creates the dev user and issues it a fresh token.
pub async fn create_dev_user(
    State(state): State<AppState>,
) -> Result<Json<DevUserResponse>, ApiError> {
    let conn = state.conn().await;
    let grant = UserService::new(SqliteUserRepository::try_new(&conn)?).issue_dev_token()?;
    let message = if grant.created {
        "Test user created successfully"
    } else {
        "Test user already exists"
    };
    Ok(Json(DevUserResponse {
        message: message.to_string(),
        user_id: grant.user.id,
        token: grant.token,
        email: grant.user.email,
    }))
}

fn health_report(conn: &Connection) -> HealthReport {
    match check_database(conn) {
        Ok((test_query, user_count)) => HealthReport {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            test_query: Some(test_query),
            user_count: Some(user_count),
            error: None,
        },
        Err(err) => {
            warn!("event=health_check module=api status=error error={err}");
            HealthReport {
                status: "unhealthy".to_string(),
                database: "disconnected".to_string(),
                test_query: None,
                user_count: None,
                error: Some(err.to_string()),
            }
        }
    }
}

fn db_check(conn: &Connection) -> DbCheck {
    match count_users(conn) {
        Ok(users_count) => DbCheck {
            users_count: Some(users_count),
            error: None,
            message: "Database connection successful".to_string(),
        },
        Err(err) => DbCheck {
            users_count: None,
            error: Some(err.to_string()),
            message: "Database connection failed".to_string(),
        },
    }
}

fn check_database(conn: &Connection) -> ServiceResult<(i64, i64)> {
    let test_query = probe(conn).map_err(RepoError::from)?;
    let user_count = count_users(conn)?;
    Ok((test_query, user_count))
}

fn count_users(conn: &Connection) -> ServiceResult<i64> {
    UserService::new(SqliteUserRepository::try_new(conn)?).count_users()
}
