//! Caller resolution from the `Authorization` header.

use crate::error::ApiError;
use axum::http::{header, HeaderMap};
use daybook_core::{SqliteUserRepository, User, UserService};
use rusqlite::Connection;

/// Returns the user a request acts as.
///
/// A bearer token must resolve; without a header the dev user is used when
/// `allow_anonymous` is set.
pub fn resolve_user(
    conn: &Connection,
    headers: &HeaderMap,
    allow_anonymous: bool,
) -> Result<User, ApiError> {
    let users = UserService::new(SqliteUserRepository::try_new(conn)?);
    match bearer_token(headers)? {
        Some(token) => Ok(users.resolve_token(token)?),
        None if allow_anonymous => Ok(users.dev_user()?),
        None => Err(ApiError::unauthorized("Not authenticated")),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(Some(token.trim())),
        _ => Err(ApiError::unauthorized("Invalid token")),
    }
}
