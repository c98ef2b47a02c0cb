//! PostgreSQL-backed `UserSocialRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{UserSocialRepository, UserSocialRepositoryError};
use crate::domain::{Follow, NewUserEval, UserEval};

use super::diesel_error_mapping::{TxError, is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{FollowRow, NewFollowRow, NewUserEvalRow, UserEvalRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, user_evals, users};

/// Diesel-backed implementation of the user social repository port.
#[derive(Clone)]
pub struct DieselUserSocialRepository {
    pool: DbPool,
}

impl DieselUserSocialRepository {
    /// Create the repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserSocialRepositoryError {
    map_pool_error(error, UserSocialRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserSocialRepositoryError {
    map_diesel_error(
        error,
        UserSocialRepositoryError::query,
        UserSocialRepositoryError::connection,
    )
}

fn unpack(error: TxError<UserSocialRepositoryError>) -> UserSocialRepositoryError {
    error.unpack(
        UserSocialRepositoryError::query,
        UserSocialRepositoryError::connection,
    )
}

type TxResult<T> = Result<T, TxError<UserSocialRepositoryError>>;

async fn ensure_live_user(conn: &mut AsyncPgConnection, user_id: i64) -> TxResult<()> {
    let live: bool = diesel::select(exists(
        users::table
            .filter(users::id.eq(user_id))
            .filter(users::is_valid.eq(true)),
    ))
    .get_result(conn)
    .await?;
    if live {
        Ok(())
    } else {
        Err(TxError::Port(UserSocialRepositoryError::user_missing(
            user_id,
        )))
    }
}

#[async_trait]
impl UserSocialRepository for DieselUserSocialRepository {
    async fn find_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<Option<Follow>, UserSocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::followee_id.eq(followee_id))
            .filter(follows::is_valid.eq(true))
            .select(FollowRow::as_select())
            .first::<FollowRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<Follow, UserSocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    ensure_live_user(conn, follower_id).await?;
                    ensure_live_user(conn, followee_id).await?;

                    let existing: Option<FollowRow> = follows::table
                        .filter(follows::follower_id.eq(follower_id))
                        .filter(follows::followee_id.eq(followee_id))
                        .select(FollowRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(row) if row.is_valid => Err(TxError::Port(
                            UserSocialRepositoryError::duplicate(follower_id, followee_id),
                        )),
                        Some(row) => Ok(diesel::update(follows::table.find(row.id))
                            .set(follows::is_valid.eq(true))
                            .returning(FollowRow::as_returning())
                            .get_result(conn)
                            .await?),
                        None => diesel::insert_into(follows::table)
                            .values(NewFollowRow {
                                follower_id,
                                followee_id,
                            })
                            .returning(FollowRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| {
                                if is_unique_violation(&err) {
                                    TxError::Port(UserSocialRepositoryError::duplicate(
                                        follower_id,
                                        followee_id,
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

    async fn remove_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<bool, UserSocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let removed = diesel::update(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::followee_id.eq(followee_id))
                .filter(follows::is_valid.eq(true)),
        )
        .set(follows::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(removed > 0)
    }

    async fn find_eval(
        &self,
        evaluator_id: i64,
        evaluated_id: i64,
    ) -> Result<Option<UserEval>, UserSocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = user_evals::table
            .filter(user_evals::evaluator_id.eq(evaluator_id))
            .filter(user_evals::evaluated_id.eq(evaluated_id))
            .filter(user_evals::is_valid.eq(true))
            .select(UserEvalRow::as_select())
            .first::<UserEvalRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn insert_eval(
        &self,
        eval: &NewUserEval,
    ) -> Result<UserEval, UserSocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    ensure_live_user(conn, eval.evaluator_id).await?;
                    ensure_live_user(conn, eval.evaluated_id).await?;

                    let existing: Option<UserEvalRow> = user_evals::table
                        .filter(user_evals::evaluator_id.eq(eval.evaluator_id))
                        .filter(user_evals::evaluated_id.eq(eval.evaluated_id))
                        .select(UserEvalRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(row) if row.is_valid => {
                            Err(TxError::Port(UserSocialRepositoryError::duplicate(
                                eval.evaluator_id,
                                eval.evaluated_id,
                            )))
                        }
                        Some(row) => Ok(diesel::update(user_evals::table.find(row.id))
                            .set((
                                user_evals::score.eq(eval.score),
                                user_evals::content.eq(eval.content.as_deref()),
                                user_evals::is_valid.eq(true),
                            ))
                            .returning(UserEvalRow::as_returning())
                            .get_result(conn)
                            .await?),
                        None => diesel::insert_into(user_evals::table)
                            .values(NewUserEvalRow {
                                evaluator_id: eval.evaluator_id,
                                evaluated_id: eval.evaluated_id,
                                score: eval.score,
                                content: eval.content.as_deref(),
                                is_valid: true,
                            })
                            .returning(UserEvalRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| {
                                if is_unique_violation(&err) {
                                    TxError::Port(UserSocialRepositoryError::duplicate(
                                        eval.evaluator_id,
                                        eval.evaluated_id,
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
        evaluator_id: i64,
        evaluated_id: i64,
    ) -> Result<bool, UserSocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let removed = diesel::update(
            user_evals::table
                .filter(user_evals::evaluator_id.eq(evaluator_id))
                .filter(user_evals::evaluated_id.eq(evaluated_id))
                .filter(user_evals::is_valid.eq(true)),
        )
        .set(user_evals::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(removed > 0)
    }
}
