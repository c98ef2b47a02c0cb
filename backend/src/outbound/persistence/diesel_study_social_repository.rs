//! PostgreSQL-backed `StudySocialRepository` implementation using Diesel.
//!
//! Like and bookmark writes pair the counter update on the study root with
//! the pair-row write in one transaction. The counter bump doubles as the
//! liveness check on the study: zero rows updated means the study is absent
//! or soft-deleted, and the transaction rolls back.

use async_trait::async_trait;
use diesel::dsl::{exists, sql};
use diesel::prelude::*;
use diesel::sql_types::Int4;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{NewStudyEval, StudySocialRepository, StudySocialRepositoryError};
use crate::domain::{Bookmark, StudyEval, StudyLike, StudyTag};

use super::diesel_error_mapping::{TxError, is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{
    BookmarkRow, NewBookmarkRow, NewStudyEvalRow, NewStudyLikeRow, NewStudyTagRow, StudyEvalRow,
    StudyLikeRow, StudyTagRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{bookmarks, studies, study_evals, study_likes, study_tags};

/// Diesel-backed implementation of the study social repository port.
#[derive(Clone)]
pub struct DieselStudySocialRepository {
    pool: DbPool,
}

impl DieselStudySocialRepository {
    /// Create the repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> StudySocialRepositoryError {
    map_pool_error(error, StudySocialRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> StudySocialRepositoryError {
    map_diesel_error(
        error,
        StudySocialRepositoryError::query,
        StudySocialRepositoryError::connection,
    )
}

fn unpack(error: TxError<StudySocialRepositoryError>) -> StudySocialRepositoryError {
    error.unpack(
        StudySocialRepositoryError::query,
        StudySocialRepositoryError::connection,
    )
}

type TxResult<T> = Result<T, TxError<StudySocialRepositoryError>>;

/// Adjust a study counter, failing when the study is absent or soft-deleted.
async fn bump_like_counter(conn: &mut AsyncPgConnection, study_id: i64) -> TxResult<()> {
    let updated = diesel::update(
        studies::table
            .filter(studies::id.eq(study_id))
            .filter(studies::is_valid.eq(true)),
    )
    .set(studies::like_cnt.eq(studies::like_cnt + 1))
    .execute(conn)
    .await?;
    if updated == 0 {
        return Err(TxError::Port(StudySocialRepositoryError::study_missing(
            study_id,
        )));
    }
    Ok(())
}

async fn bump_bookmark_counter(conn: &mut AsyncPgConnection, study_id: i64) -> TxResult<()> {
    let updated = diesel::update(
        studies::table
            .filter(studies::id.eq(study_id))
            .filter(studies::is_valid.eq(true)),
    )
    .set(studies::bookmark_cnt.eq(studies::bookmark_cnt + 1))
    .execute(conn)
    .await?;
    if updated == 0 {
        return Err(TxError::Port(StudySocialRepositoryError::study_missing(
            study_id,
        )));
    }
    Ok(())
}

async fn ensure_live_study(conn: &mut AsyncPgConnection, study_id: i64) -> TxResult<()> {
    let live: bool = diesel::select(exists(
        studies::table
            .filter(studies::id.eq(study_id))
            .filter(studies::is_valid.eq(true)),
    ))
    .get_result(conn)
    .await?;
    if live {
        Ok(())
    } else {
        Err(TxError::Port(StudySocialRepositoryError::study_missing(
            study_id,
        )))
    }
}

#[async_trait]
impl StudySocialRepository for DieselStudySocialRepository {
    async fn find_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<StudyLike>, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = study_likes::table
            .filter(study_likes::study_id.eq(study_id))
            .filter(study_likes::user_id.eq(user_id))
            .filter(study_likes::is_valid.eq(true))
            .select(StudyLikeRow::as_select())
            .first::<StudyLikeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<StudyLike, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    bump_like_counter(conn, study_id).await?;

                    let existing: Option<StudyLikeRow> = study_likes::table
                        .filter(study_likes::study_id.eq(study_id))
                        .filter(study_likes::user_id.eq(user_id))
                        .select(StudyLikeRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(row) if row.is_valid => Err(TxError::Port(
                            StudySocialRepositoryError::duplicate(study_id, user_id),
                        )),
                        Some(row) => Ok(diesel::update(study_likes::table.find(row.id))
                            .set(study_likes::is_valid.eq(true))
                            .returning(StudyLikeRow::as_returning())
                            .get_result(conn)
                            .await?),
                        None => diesel::insert_into(study_likes::table)
                            .values(NewStudyLikeRow { study_id, user_id })
                            .returning(StudyLikeRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| {
                                if is_unique_violation(&err) {
                                    TxError::Port(StudySocialRepositoryError::duplicate(
                                        study_id, user_id,
                                    ))
                                } else {
                                    TxError::Db(err)
                                }
                            }),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(unpack)?;

        Ok(row.into())
    }

    async fn remove_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| {
            async move {
                let removed = diesel::update(
                    study_likes::table
                        .filter(study_likes::study_id.eq(study_id))
                        .filter(study_likes::user_id.eq(user_id))
                        .filter(study_likes::is_valid.eq(true)),
                )
                .set(study_likes::is_valid.eq(false))
                .execute(conn)
                .await?;
                if removed == 0 {
                    return Ok(false);
                }

                diesel::update(studies::table.filter(studies::id.eq(study_id)))
                    .set(studies::like_cnt.eq(sql::<Int4>("GREATEST(like_cnt - 1, 0)")))
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn find_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<Bookmark>, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = bookmarks::table
            .filter(bookmarks::study_id.eq(study_id))
            .filter(bookmarks::user_id.eq(user_id))
            .filter(bookmarks::is_valid.eq(true))
            .select(BookmarkRow::as_select())
            .first::<BookmarkRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Bookmark, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    bump_bookmark_counter(conn, study_id).await?;

                    let existing: Option<BookmarkRow> = bookmarks::table
                        .filter(bookmarks::study_id.eq(study_id))
                        .filter(bookmarks::user_id.eq(user_id))
                        .select(BookmarkRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(row) if row.is_valid => Err(TxError::Port(
                            StudySocialRepositoryError::duplicate(study_id, user_id),
                        )),
                        Some(row) => Ok(diesel::update(bookmarks::table.find(row.id))
                            .set(bookmarks::is_valid.eq(true))
                            .returning(BookmarkRow::as_returning())
                            .get_result(conn)
                            .await?),
                        None => diesel::insert_into(bookmarks::table)
                            .values(NewBookmarkRow { study_id, user_id })
                            .returning(BookmarkRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| {
                                if is_unique_violation(&err) {
                                    TxError::Port(StudySocialRepositoryError::duplicate(
                                        study_id, user_id,
                                    ))
                                } else {
                                    TxError::Db(err)
                                }
                            }),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(unpack)?;

        Ok(row.into())
    }

    async fn remove_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| {
            async move {
                let removed = diesel::update(
                    bookmarks::table
                        .filter(bookmarks::study_id.eq(study_id))
                        .filter(bookmarks::user_id.eq(user_id))
                        .filter(bookmarks::is_valid.eq(true)),
                )
                .set(bookmarks::is_valid.eq(false))
                .execute(conn)
                .await?;
                if removed == 0 {
                    return Ok(false);
                }

                diesel::update(studies::table.filter(studies::id.eq(study_id)))
                    .set(studies::bookmark_cnt.eq(sql::<Int4>("GREATEST(bookmark_cnt - 1, 0)")))
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn find_eval(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<StudyEval>, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = study_evals::table
            .filter(study_evals::study_id.eq(study_id))
            .filter(study_evals::user_id.eq(user_id))
            .filter(study_evals::is_valid.eq(true))
            .select(StudyEvalRow::as_select())
            .first::<StudyEvalRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert_eval(
        &self,
        eval: &NewStudyEval,
    ) -> Result<StudyEval, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    ensure_live_study(conn, eval.study_id).await?;

                    let existing: Option<StudyEvalRow> = study_evals::table
                        .filter(study_evals::study_id.eq(eval.study_id))
                        .filter(study_evals::user_id.eq(eval.user_id))
                        .select(StudyEvalRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(row) if row.is_valid => Err(TxError::Port(
                            StudySocialRepositoryError::duplicate(eval.study_id, eval.user_id),
                        )),
                        Some(row) => Ok(diesel::update(study_evals::table.find(row.id))
                            .set((
                                study_evals::score.eq(eval.score),
                                study_evals::content.eq(eval.content.as_deref()),
                                study_evals::is_valid.eq(true),
                            ))
                            .returning(StudyEvalRow::as_returning())
                            .get_result(conn)
                            .await?),
                        None => diesel::insert_into(study_evals::table)
                            .values(NewStudyEvalRow {
                                study_id: eval.study_id,
                                user_id: eval.user_id,
                                score: eval.score,
                                content: eval.content.as_deref(),
                                is_valid: true,
                            })
                            .returning(StudyEvalRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| {
                                if is_unique_violation(&err) {
                                    TxError::Port(StudySocialRepositoryError::duplicate(
                                        eval.study_id,
                                        eval.user_id,
                                    ))
                                } else {
                                    TxError::Db(err)
                                }
                            }),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(unpack)?;

        Ok(row.into())
    }

    async fn remove_eval(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let removed = diesel::update(
            study_evals::table
                .filter(study_evals::study_id.eq(study_id))
                .filter(study_evals::user_id.eq(user_id))
                .filter(study_evals::is_valid.eq(true)),
        )
        .set(study_evals::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(removed > 0)
    }

    async fn find_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<Option<StudyTag>, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = study_tags::table
            .filter(study_tags::study_id.eq(study_id))
            .filter(study_tags::tag_id.eq(tag_id))
            .filter(study_tags::is_valid.eq(true))
            .select(StudyTagRow::as_select())
            .first::<StudyTagRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<StudyTag, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    ensure_live_study(conn, study_id).await?;

                    let existing: Option<StudyTagRow> = study_tags::table
                        .filter(study_tags::study_id.eq(study_id))
                        .filter(study_tags::tag_id.eq(tag_id))
                        .select(StudyTagRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(row) if row.is_valid => Err(TxError::Port(
                            StudySocialRepositoryError::duplicate(study_id, tag_id),
                        )),
                        Some(row) => Ok(diesel::update(study_tags::table.find(row.id))
                            .set(study_tags::is_valid.eq(true))
                            .returning(StudyTagRow::as_returning())
                            .get_result(conn)
                            .await?),
                        None => diesel::insert_into(study_tags::table)
                            .values(NewStudyTagRow {
                                study_id,
                                tag_id,
                                is_valid: true,
                            })
                            .returning(StudyTagRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| {
                                if is_unique_violation(&err) {
                                    TxError::Port(StudySocialRepositoryError::duplicate(
                                        study_id, tag_id,
                                    ))
                                } else {
                                    TxError::Db(err)
                                }
                            }),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(unpack)?;

        Ok(row.into())
    }

    async fn remove_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let removed = diesel::update(
            study_tags::table
                .filter(study_tags::study_id.eq(study_id))
                .filter(study_tags::tag_id.eq(tag_id))
                .filter(study_tags::is_valid.eq(true)),
        )
        .set(study_tags::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error unpacking.

    use super::*;

    #[test]
    fn port_errors_pass_through_unpacking() {
        let error = unpack(TxError::Port(StudySocialRepositoryError::duplicate(1, 2)));
        assert_eq!(error, StudySocialRepositoryError::duplicate(1, 2));
    }

    #[test]
    fn db_errors_unpack_to_query_errors() {
        let error = unpack(TxError::Db(diesel::result::Error::NotFound));
        assert!(matches!(error, StudySocialRepositoryError::Query { .. }));
    }
}
