//! Port for user-side pair rows: follows and peer evaluations.

use async_trait::async_trait;

use crate::domain::{Follow, NewUserEval, UserEval};

/// Persistence errors raised by user social repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserSocialRepositoryError {
    /// Repository connection could not be established.
    #[error("user social repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user social repository query failed: {message}")]
    Query { message: String },
    /// A live pair row with the same composite key already exists.
    #[error("pair already exists for users {left_id} and {right_id}")]
    Duplicate { left_id: i64, right_id: i64 },
    /// A referenced user row is absent or soft-deleted.
    #[error("user {user_id} not found")]
    UserMissing { user_id: i64 },
}

impl UserSocialRepositoryError {
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

    pub fn duplicate(left_id: i64, right_id: i64) -> Self {
        Self::Duplicate { left_id, right_id }
    }

    pub fn user_missing(user_id: i64) -> Self {
        Self::UserMissing { user_id }
    }
}

/// Port for the pair rows between users. Removal methods return `false` when
/// no live pair row matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSocialRepository: Send + Sync {
    /// Find a live follow edge.
    async fn find_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<Option<Follow>, UserSocialRepositoryError>;

    /// Insert a follow edge; duplicates on the pair key are rejected.
    async fn insert_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<Follow, UserSocialRepositoryError>;

    /// Soft-delete a follow edge.
    async fn remove_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<bool, UserSocialRepositoryError>;

    /// Find a live peer evaluation for the pair.
    async fn find_eval(
        &self,
        evaluator_id: i64,
        evaluated_id: i64,
    ) -> Result<Option<UserEval>, UserSocialRepositoryError>;

    /// Insert a peer evaluation; duplicates on the pair key are rejected.
    async fn insert_eval(&self, eval: &NewUserEval)
        -> Result<UserEval, UserSocialRepositoryError>;

    /// Soft-delete a peer evaluation.
    async fn remove_eval(
        &self,
        evaluator_id: i64,
        evaluated_id: i64,
    ) -> Result<bool, UserSocialRepositoryError>;
}
