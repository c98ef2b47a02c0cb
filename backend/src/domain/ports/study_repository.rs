//! Port for study aggregate persistence.

use async_trait::async_trait;

use crate::domain::{
    NewStudyTree, Page, Study, StudyDetail, StudySearchOptions, StudySummary, StudyUpdateTree,
};

/// Persistence errors raised by study repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudyRepositoryError {
    /// Repository connection could not be established.
    #[error("study repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("study repository query failed: {message}")]
    Query { message: String },
}

impl StudyRepositoryError {
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
}

/// Port for reading and writing study aggregates.
///
/// Every mutating method is atomic: the adapter wraps all of its writes in a
/// single database transaction, so services never orchestrate transactions
/// themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyRepository: Send + Sync {
    /// Fetch the study root row by id, soft-deleted rows included.
    async fn find_by_id(&self, id: i64) -> Result<Option<Study>, StudyRepositoryError>;

    /// Load the full aggregate: root, tags, sessions with materials, notices.
    ///
    /// Returns `None` when the root row does not exist. Sessions are ordered
    /// by sequence number and materials by id so repeated loads of the same
    /// study observe the same tree shape.
    async fn find_detail(&self, id: i64) -> Result<Option<StudyDetail>, StudyRepositoryError>;

    /// Search live studies with the given filters, newest first.
    async fn search(
        &self,
        options: &StudySearchOptions,
    ) -> Result<Page<StudySummary>, StudyRepositoryError>;

    /// Insert a complete study tree in one transaction and return the
    /// persisted aggregate with its assigned ids.
    async fn insert_tree(&self, tree: &NewStudyTree) -> Result<StudyDetail, StudyRepositoryError>;

    /// Apply an aggregate update in one transaction.
    ///
    /// Returns `false` when the root row addressed by the update is absent.
    async fn save_tree(&self, tree: &StudyUpdateTree) -> Result<bool, StudyRepositoryError>;

    /// Soft-delete the study root. Returns `false` when no live row matched.
    async fn mark_removed(&self, id: i64) -> Result<bool, StudyRepositoryError>;

    /// Set the shared flag. Returns `false` when no live row matched; setting
    /// it on an already shared study succeeds.
    async fn mark_shared(&self, id: i64) -> Result<bool, StudyRepositoryError>;
}
