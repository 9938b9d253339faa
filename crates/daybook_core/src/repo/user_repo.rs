//! User and API-token repository.
//!
//! # Invariants
//! - `email` is unique case-insensitively.
//! - Tokens are persisted as SHA-256 hex digests only.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    u.id AS id,
    u.email AS email,
    u.name AS name,
    u.created_at AS created_at,
    u.updated_at AS updated_at
FROM users u";

/// Repository interface for users and their API tokens.
pub trait UserRepository {
    /// Inserts one user. Duplicate email yields `RepoError::Conflict`.
    fn create_user(&self, email: &str, name: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn count_users(&self) -> RepoResult<i64>;
    /// Stores a token digest for the user.
    fn store_token(&self, user_id: UserId, token_sha256: &str) -> RepoResult<()>;
    /// Resolves a token digest to its owning user.
    fn user_for_token(&self, token_sha256: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "api_tokens"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, email: &str, name: &str) -> RepoResult<User> {
        self.conn.execute(
            "INSERT INTO users (email, name) VALUES (?1, ?2);",
            params![email, name],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE u.id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE u.email = ?1 COLLATE NOCASE;"),
                [email],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn count_users(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn store_token(&self, user_id: UserId, token_sha256: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "INSERT INTO api_tokens (user_id, token_sha256)
             SELECT id, ?2 FROM users WHERE id = ?1;",
            params![user_id, token_sha256],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        Ok(())
    }

    fn user_for_token(&self, token_sha256: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!(
                    "{USER_SELECT_SQL}
                     INNER JOIN api_tokens t ON t.user_id = u.id
                     WHERE t.token_sha256 = ?1;"
                ),
                [token_sha256],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
