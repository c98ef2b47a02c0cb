//! Study material domain service.
//!
//! Materials couple a database row to an optional blob in the external store.
//! Blob writes cannot join the database transaction, so this service orders
//! the steps and compensates: a blob stored for a row write that then fails
//! is removed again, and a blob is never deleted before the row that stops
//! referencing it is committed.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{
    BlobStore, BlobStoreError, MaterialRecordPatch, MaterialRepository, MaterialRepositoryError,
    NewMaterialRecord,
};
use crate::domain::{Error, StudyMaterial};

fn map_material_repo_error(error: MaterialRepositoryError) -> Error {
    match error {
        MaterialRepositoryError::Connection { message } => {
            Error::infrastructure(format!("material repository unavailable: {message}"))
        }
        MaterialRepositoryError::Query { message } => {
            Error::internal(format!("material repository error: {message}"))
        }
        MaterialRepositoryError::SessionMissing { session_id } => {
            Error::not_found(format!("session {session_id} not found"))
        }
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    Error::infrastructure(format!("blob store error: {error}"))
}

/// An uploaded file ready to be handed to the blob store.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Fields of a material create or update request, minus the file.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDraft {
    pub kind: String,
    pub content: Option<String>,
}

/// Service for material rows and their blobs.
pub struct MaterialService<M: ?Sized, B: ?Sized> {
    material_repo: Arc<M>,
    blob_store: Arc<B>,
}

impl<M: ?Sized, B: ?Sized> Clone for MaterialService<M, B> {
    fn clone(&self) -> Self {
        Self {
            material_repo: Arc::clone(&self.material_repo),
            blob_store: Arc::clone(&self.blob_store),
        }
    }
}

impl<M: ?Sized, B: ?Sized> MaterialService<M, B> {
    /// Create the service with its repository and blob store.
    pub fn new(material_repo: Arc<M>, blob_store: Arc<B>) -> Self {
        Self {
            material_repo,
            blob_store,
        }
    }
}

impl<M, B> MaterialService<M, B>
where
    M: MaterialRepository + ?Sized,
    B: BlobStore + ?Sized,
{
    /// Fetch a live material.
    pub async fn get_material(&self, id: i64) -> Result<StudyMaterial, Error> {
        self.require_live(id).await
    }

    /// Create a material, uploading its file first.
    ///
    /// When the row insert fails after the blob was stored, the blob is
    /// removed again so the store holds no unreferenced objects.
    pub async fn create_material(
        &self,
        study_id: i64,
        session_id: i64,
        draft: MaterialDraft,
        file: Option<MaterialFile>,
    ) -> Result<StudyMaterial, Error> {
        validate_draft(&draft)?;

        let file_url = match &file {
            Some(file) => Some(
                self.blob_store
                    .store(&file.bytes, &file.file_name)
                    .await
                    .map_err(map_blob_error)?,
            ),
            None => None,
        };

        let record = NewMaterialRecord {
            study_id,
            session_id,
            kind: draft.kind,
            content: draft.content,
            file_url: file_url.clone(),
        };
        match self.material_repo.insert(&record).await {
            Ok(material) => {
                info!(material_id = material.id, session_id, "material created");
                Ok(material)
            }
            Err(err) => {
                if let Some(url) = file_url {
                    self.discard_blob(&url).await;
                }
                Err(map_material_repo_error(err))
            }
        }
    }

    /// Update a material, replacing its file when a new one is supplied.
    ///
    /// The new blob is stored before the row is touched. After the row write
    /// commits, the previous blob is removed best-effort; if the row write
    /// fails, the new blob is removed instead and the old one stays
    /// referenced.
    pub async fn update_material(
        &self,
        id: i64,
        draft: MaterialDraft,
        file: Option<MaterialFile>,
    ) -> Result<(), Error> {
        validate_draft(&draft)?;
        let existing = self.require_live(id).await?;

        let new_url = match &file {
            Some(file) => Some(
                self.blob_store
                    .store(&file.bytes, &file.file_name)
                    .await
                    .map_err(map_blob_error)?,
            ),
            None => None,
        };

        let patch = MaterialRecordPatch {
            kind: draft.kind,
            content: draft.content,
            file_url: new_url.clone().or_else(|| existing.file_url.clone()),
        };
        match self.material_repo.update(id, &patch).await {
            Ok(true) => {
                if new_url.is_some() {
                    if let Some(old_url) = existing.file_url {
                        self.discard_blob(&old_url).await;
                    }
                }
                Ok(())
            }
            Ok(false) => {
                if let Some(url) = new_url {
                    self.discard_blob(&url).await;
                }
                Err(Error::not_found(format!("material {id} not found")))
            }
            Err(err) => {
                if let Some(url) = new_url {
                    self.discard_blob(&url).await;
                }
                Err(map_material_repo_error(err))
            }
        }
    }

    /// Soft-delete a material row. The blob stays in the store because clones
    /// may share its URL.
    pub async fn remove_material(&self, id: i64) -> Result<(), Error> {
        let removed = self
            .material_repo
            .mark_removed(id)
            .await
            .map_err(map_material_repo_error)?;
        if !removed {
            return Err(Error::not_found(format!("material {id} not found")));
        }
        info!(material_id = id, "material removed");
        Ok(())
    }

    async fn require_live(&self, id: i64) -> Result<StudyMaterial, Error> {
        let material = self
            .material_repo
            .find_by_id(id)
            .await
            .map_err(map_material_repo_error)?;
        match material {
            Some(material) if material.is_valid => Ok(material),
            _ => Err(Error::not_found(format!("material {id} not found"))),
        }
    }

    /// Compensating removal; failure is logged, never surfaced.
    async fn discard_blob(&self, url: &str) {
        if let Err(err) = self.blob_store.remove(url).await {
            warn!(url, error = %err, "failed to remove orphaned blob");
        }
    }
}

fn validate_draft(draft: &MaterialDraft) -> Result<(), Error> {
    if draft.kind.trim().is_empty() {
        return Err(Error::validation_failed("material kind must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "material_service_tests.rs"]
mod tests;
