//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserPatch, UserProfile};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// A live user with the same email already exists.
    #[error("email {email} is already registered")]
    DuplicateEmail { email: String },
}

impl UserRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Port for user rows and their interest tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user with their interest tags in one transaction.
    async fn insert(&self, user: &NewUser, tag_ids: &[i64]) -> Result<User, UserRepositoryError>;

    /// Fetch a user by id, soft-deleted rows included.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a live user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Load a live user together with their live interest tags.
    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, UserRepositoryError>;

    /// Update profile fields and replace interest tags in one transaction.
    ///
    /// Tags absent from `tag_ids` are soft-deleted; new ones are attached or
    /// revived. Returns `false` when no live user row matched.
    async fn update(&self, patch: &UserPatch, tag_ids: &[i64])
        -> Result<bool, UserRepositoryError>;

    /// Soft-delete a user. Returns `false` when no live row matched.
    async fn mark_removed(&self, id: i64) -> Result<bool, UserRepositoryError>;

    /// Store or clear the refresh token slot for a user.
    ///
    /// Returns `false` when no live user row matched.
    async fn save_refresh_token(
        &self,
        user_id: i64,
        token: Option<String>,
    ) -> Result<bool, UserRepositoryError>;
}
