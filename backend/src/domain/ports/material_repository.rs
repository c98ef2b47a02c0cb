//! Port for standalone study material persistence.

use async_trait::async_trait;

use crate::domain::StudyMaterial;

/// Fields required to insert a material row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterialRecord {
    pub study_id: i64,
    pub session_id: i64,
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

/// Field changes applied to an existing material row.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecordPatch {
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

/// Persistence errors raised by material repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaterialRepositoryError {
    /// Repository connection could not be established.
    #[error("material repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("material repository query failed: {message}")]
    Query { message: String },
    /// The referenced session row is absent or soft-deleted.
    #[error("session {session_id} not found")]
    SessionMissing { session_id: i64 },
}

impl MaterialRepositoryError {
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

    pub fn session_missing(session_id: i64) -> Self {
        Self::SessionMissing { session_id }
    }
}

/// Port for material rows managed outside the aggregate update path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Fetch a material by id, soft-deleted rows included.
    async fn find_by_id(&self, id: i64) -> Result<Option<StudyMaterial>, MaterialRepositoryError>;

    /// Insert a material row and return it with its assigned id.
    async fn insert(
        &self,
        record: &NewMaterialRecord,
    ) -> Result<StudyMaterial, MaterialRepositoryError>;

    /// Update a material row. Returns `false` when no live row matched.
    async fn update(
        &self,
        id: i64,
        patch: &MaterialRecordPatch,
    ) -> Result<bool, MaterialRepositoryError>;

    /// Soft-delete a material row. Returns `false` when no live row matched.
    async fn mark_removed(&self, id: i64) -> Result<bool, MaterialRepositoryError>;
}
