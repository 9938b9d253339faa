//! User resolution and API-token issuing.
//!
//! # Invariants
//! - Raw tokens are returned once and never persisted.
//! - Concurrent dev-user creation converges on one row.

use crate::model::user::{User, UserId, DEV_USER_EMAIL, DEV_USER_NAME};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::{ServiceError, ServiceResult};
use log::info;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Result of the dev-user bootstrap endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevUserGrant {
    pub user: User,
    /// Raw bearer token; only its digest is stored.
    pub token: String,
    /// `true` when this call inserted the dev user.
    pub created: bool,
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves a raw bearer token to its user.
    pub fn resolve_token(&self, token: &str) -> ServiceResult<User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::Unauthorized);
        }
        self.repo
            .user_for_token(&token_digest(token))?
            .ok_or(ServiceError::Unauthorized)
    }

    /// Returns the development fallback user, creating it on first use.
    pub fn dev_user(&self) -> ServiceResult<User> {
        self.dev_user_with_flag().map(|(user, _)| user)
    }

    /// Ensures the dev user exists and issues a fresh token for it.
    pub fn issue_dev_token(&self) -> ServiceResult<DevUserGrant> {
        let (user, created) = self.dev_user_with_flag()?;
        let token = self.issue_token(user.id)?;
        Ok(DevUserGrant {
            user,
            token,
            created,
        })
    }

    /// Issues a new random bearer token for `user_id`.
    pub fn issue_token(&self, user_id: UserId) -> ServiceResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.repo.store_token(user_id, &token_digest(&token))?;
        info!("event=token_issue module=service status=ok user_id={user_id}");
        Ok(token)
    }

    pub fn count_users(&self) -> ServiceResult<i64> {
        Ok(self.repo.count_users()?)
    }

    fn dev_user_with_flag(&self) -> ServiceResult<(User, bool)> {
        if let Some(user) = self.repo.find_by_email(DEV_USER_EMAIL)? {
            return Ok((user, false));
        }

        match self.repo.create_user(DEV_USER_EMAIL, DEV_USER_NAME) {
            Ok(user) => {
                info!(
                    "event=dev_user_create module=service status=ok user_id={}",
                    user.id
                );
                Ok((user, true))
            }
            Err(RepoError::Conflict(_)) => self
                .repo
                .find_by_email(DEV_USER_EMAIL)?
                .map(|user| (user, false))
                .ok_or(ServiceError::InconsistentState(
                    "dev user conflict without existing row",
                )),
            Err(err) => Err(err.into()),
        }
    }
}

/// SHA-256 hex digest under which a token is stored.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
