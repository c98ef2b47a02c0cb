//! Port for study-side pair rows: likes, bookmarks, evaluations and tags.

use async_trait::async_trait;

use crate::domain::{Bookmark, StudyEval, StudyLike, StudyTag};

/// Fields required to record a study evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyEval {
    pub study_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub content: Option<String>,
}

/// Persistence errors raised by study social repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudySocialRepositoryError {
    /// Repository connection could not be established.
    #[error("study social repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("study social repository query failed: {message}")]
    Query { message: String },
    /// A live pair row with the same composite key already exists.
    #[error("pair already exists for study {study_id} and user {user_id}")]
    Duplicate { study_id: i64, user_id: i64 },
    /// The referenced study row is absent or soft-deleted.
    #[error("study {study_id} not found")]
    StudyMissing { study_id: i64 },
}

impl StudySocialRepositoryError {
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

    pub fn duplicate(study_id: i64, user_id: i64) -> Self {
        Self::Duplicate { study_id, user_id }
    }

    pub fn study_missing(study_id: i64) -> Self {
        Self::StudyMissing { study_id }
    }
}

/// Port for the pair rows hanging off a study.
///
/// Like and bookmark insertion and removal adjust the matching counter on the
/// study root in the same transaction as the pair-row write, so the counter
/// and the number of live pair rows never drift apart. Removal methods return
/// `false` when no live pair row matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudySocialRepository: Send + Sync {
    /// Find a live like pair row.
    async fn find_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<StudyLike>, StudySocialRepositoryError>;

    /// Insert a like and bump the study's like counter atomically.
    ///
    /// Fails with [`StudySocialRepositoryError::Duplicate`] when a live pair
    /// row already exists and with
    /// [`StudySocialRepositoryError::StudyMissing`] when the study is absent.
    async fn insert_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<StudyLike, StudySocialRepositoryError>;

    /// Soft-delete a like and decrement the counter atomically.
    async fn remove_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError>;

    /// Find a live bookmark pair row.
    async fn find_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<Bookmark>, StudySocialRepositoryError>;

    /// Insert a bookmark and bump the study's bookmark counter atomically.
    async fn insert_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Bookmark, StudySocialRepositoryError>;

    /// Soft-delete a bookmark and decrement the counter atomically.
    async fn remove_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError>;

    /// Find a live evaluation for the pair.
    async fn find_eval(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<StudyEval>, StudySocialRepositoryError>;

    /// Insert an evaluation; duplicates on the pair key are rejected.
    async fn insert_eval(
        &self,
        eval: &NewStudyEval,
    ) -> Result<StudyEval, StudySocialRepositoryError>;

    /// Soft-delete an evaluation.
    async fn remove_eval(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError>;

    /// Find a live tag attachment for the pair.
    async fn find_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<Option<StudyTag>, StudySocialRepositoryError>;

    /// Attach a tag; duplicates on the pair key are rejected.
    async fn insert_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<StudyTag, StudySocialRepositoryError>;

    /// Soft-delete a tag attachment.
    async fn remove_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<bool, StudySocialRepositoryError>;
}
