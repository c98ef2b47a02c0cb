//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Registration and profile updates write the user row and its interest-tag
//! rows in one transaction. The email uniqueness race is closed by the unique
//! index: the losing insert surfaces as a duplicate-email error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{NewUser, User, UserPatch, UserProfile};

use super::diesel_error_mapping::{TxError, is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, NewUserTagRow, UserRow, UserRowUpdate, UserTagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_tags, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create the repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn unpack(error: TxError<UserRepositoryError>) -> UserRepositoryError {
    error.unpack(UserRepositoryError::query, UserRepositoryError::connection)
}

/// Reconcile the stored tag set against the requested one.
///
/// Tags missing from `tag_ids` are soft-deleted, existing ones are revived
/// and new ones inserted, so tag history survives repeated edits.
async fn replace_tags(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    tag_ids: &[i64],
) -> Result<(), diesel::result::Error> {
    diesel::update(
        user_tags::table
            .filter(user_tags::user_id.eq(user_id))
            .filter(user_tags::is_valid.eq(true))
            .filter(user_tags::tag_id.ne_all(tag_ids)),
    )
    .set(user_tags::is_valid.eq(false))
    .execute(conn)
    .await?;

    let existing: Vec<UserTagRow> = user_tags::table
        .filter(user_tags::user_id.eq(user_id))
        .filter(user_tags::tag_id.eq_any(tag_ids))
        .select(UserTagRow::as_select())
        .load(conn)
        .await?;

    let revive_ids: Vec<i64> = existing
        .iter()
        .filter(|row| !row.is_valid)
        .map(|row| row.id)
        .collect();
    if !revive_ids.is_empty() {
        diesel::update(user_tags::table.filter(user_tags::id.eq_any(&revive_ids)))
            .set(user_tags::is_valid.eq(true))
            .execute(conn)
            .await?;
    }

    let new_rows: Vec<NewUserTagRow> = tag_ids
        .iter()
        .filter(|tag_id| !existing.iter().any(|row| row.tag_id == **tag_id))
        .map(|tag_id| NewUserTagRow {
            user_id,
            tag_id: *tag_id,
        })
        .collect();
    if !new_rows.is_empty() {
        diesel::insert_into(user_tags::table)
            .values(&new_rows)
            .execute(conn)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser, tag_ids: &[i64]) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let row: UserRow = diesel::insert_into(users::table)
                        .values(NewUserRow {
                            email: &user.email,
                            password: &user.password,
                            name: &user.name,
                            nickname: &user.nickname,
                            image_url: user.image_url.as_deref(),
                            introduction: user.introduction.as_deref(),
                            age: user.age,
                            sido_id: user.sido_id,
                            gugun_id: user.gugun_id,
                            phone_number: user.phone_number.as_deref(),
                        })
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| {
                            if is_unique_violation(&err) {
                                TxError::Port(UserRepositoryError::duplicate_email(user.email.as_str()))
                            } else {
                                TxError::Db(err)
                            }
                        })?;

                    if !tag_ids.is_empty() {
                        let tag_rows: Vec<NewUserTagRow> = tag_ids
                            .iter()
                            .map(|tag_id| NewUserTagRow {
                                user_id: row.id,
                                tag_id: *tag_id,
                            })
                            .collect();
                        diesel::insert_into(user_tags::table)
                            .values(&tag_rows)
                            .execute(conn)
                            .await?;
                    }

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(unpack)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::id.eq(id))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::email.eq(email))
            .filter(users::is_valid.eq(true))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Into::into))
    }

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::id.eq(id))
            .filter(users::is_valid.eq(true))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let tags: Vec<UserTagRow> = user_tags::table
            .filter(user_tags::user_id.eq(id))
            .filter(user_tags::is_valid.eq(true))
            .order(user_tags::id.asc())
            .select(UserTagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(Some(UserProfile {
            user: row.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(
        &self,
        patch: &UserPatch,
        tag_ids: &[i64],
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(
                    users::table
                        .filter(users::id.eq(patch.id))
                        .filter(users::is_valid.eq(true)),
                )
                .set(UserRowUpdate {
                    name: &patch.name,
                    nickname: &patch.nickname,
                    image_url: patch.image_url.as_deref(),
                    introduction: patch.introduction.as_deref(),
                    age: patch.age,
                    sido_id: patch.sido_id,
                    gugun_id: patch.gugun_id,
                    phone_number: patch.phone_number.as_deref(),
                })
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Ok(false);
                }

                replace_tags(conn, patch.id, tag_ids).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn mark_removed(&self, id: i64) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::is_valid.eq(true)),
        )
        .set(users::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(updated > 0)
    }

    async fn save_refresh_token(
        &self,
        user_id: i64,
        token: Option<String>,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::is_valid.eq(true)),
        )
        .set(users::refresh_token.eq(token))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(updated > 0)
    }
}
