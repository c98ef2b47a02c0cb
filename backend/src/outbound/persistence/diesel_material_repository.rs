//! PostgreSQL-backed `MaterialRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::StudyMaterial;
use crate::domain::ports::{
    MaterialRecordPatch, MaterialRepository, MaterialRepositoryError, NewMaterialRecord,
};

use super::diesel_error_mapping::{TxError, map_diesel_error, map_pool_error};
use super::models::{NewStudyMaterialRow, StudyMaterialRow, StudyMaterialRowUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{sessions, study_materials};

/// Diesel-backed implementation of the material repository port.
#[derive(Clone)]
pub struct DieselMaterialRepository {
    pool: DbPool,
}

impl DieselMaterialRepository {
    /// Create the repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> MaterialRepositoryError {
    map_pool_error(error, MaterialRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> MaterialRepositoryError {
    map_diesel_error(
        error,
        MaterialRepositoryError::query,
        MaterialRepositoryError::connection,
    )
}

fn unpack(error: TxError<MaterialRepositoryError>) -> MaterialRepositoryError {
    error.unpack(
        MaterialRepositoryError::query,
        MaterialRepositoryError::connection,
    )
}

#[async_trait]
impl MaterialRepository for DieselMaterialRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<StudyMaterial>, MaterialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = study_materials::table
            .filter(study_materials::id.eq(id))
            .select(StudyMaterialRow::as_select())
            .first::<StudyMaterialRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert(
        &self,
        record: &NewMaterialRecord,
    ) -> Result<StudyMaterial, MaterialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // The session guard and the insert share a transaction so the row
        // cannot land under a session soft-deleted in between.
        let row = conn
            .transaction(|conn| {
                async move {
                    let session_live: bool = diesel::select(exists(
                        sessions::table
                            .filter(sessions::id.eq(record.session_id))
                            .filter(sessions::study_id.eq(record.study_id))
                            .filter(sessions::is_valid.eq(true)),
                    ))
                    .get_result(conn)
                    .await?;
                    if !session_live {
                        return Err(TxError::Port(MaterialRepositoryError::session_missing(
                            record.session_id,
                        )));
                    }

                    Ok(diesel::insert_into(study_materials::table)
                        .values(NewStudyMaterialRow {
                            study_id: record.study_id,
                            session_id: record.session_id,
                            kind: &record.kind,
                            content: record.content.as_deref(),
                            file_url: record.file_url.as_deref(),
                            is_valid: true,
                        })
                        .returning(StudyMaterialRow::as_returning())
                        .get_result::<StudyMaterialRow>(conn)
                        .await?)
                }
                .scope_boxed()
            })
            .await
            .map_err(unpack)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: i64,
        patch: &MaterialRecordPatch,
    ) -> Result<bool, MaterialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(
            study_materials::table
                .filter(study_materials::id.eq(id))
                .filter(study_materials::is_valid.eq(true)),
        )
        .set(StudyMaterialRowUpdate {
            kind: &patch.kind,
            content: patch.content.as_deref(),
            file_url: patch.file_url.as_deref(),
            is_valid: true,
        })
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(updated > 0)
    }

    async fn mark_removed(&self, id: i64) -> Result<bool, MaterialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(
            study_materials::table
                .filter(study_materials::id.eq(id))
                .filter(study_materials::is_valid.eq(true)),
        )
        .set(study_materials::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(updated > 0)
    }
}
