//! PostgreSQL-backed `StudyRepository` implementation using Diesel.
//!
//! Tree writes (create, clone, aggregate update) run inside a single
//! transaction so a failure part-way leaves no orphaned children.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{StudyRepository, StudyRepositoryError};
use crate::domain::{
    NewStudyTree, Page, SessionDetail, Study, StudyDetail, StudySearchOptions, StudySummary,
    StudyUpdateTree,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    NewNoticeCheckRow, NewSessionCheckRow, NewSessionRow, NewStudyEvalRow, NewStudyMaterialRow,
    NewStudyNoticeRow, NewStudyRow, NewStudyTagRow, SessionRow, SessionRowUpdate, StudyMaterialRow,
    StudyMaterialRowUpdate, StudyNoticeRow, StudyNoticeRowUpdate, StudyRow, StudyRowUpdate,
    StudyTagRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    session_checks, sessions, studies, study_evals, study_materials, study_notice_checks,
    study_notices, study_tags,
};

/// Diesel-backed implementation of the study repository port.
#[derive(Clone)]
pub struct DieselStudyRepository {
    pool: DbPool,
}

impl DieselStudyRepository {
    /// Create the repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> StudyRepositoryError {
    map_pool_error(error, StudyRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> StudyRepositoryError {
    map_diesel_error(
        error,
        StudyRepositoryError::query,
        StudyRepositoryError::connection,
    )
}

fn row_to_study(row: StudyRow) -> Result<Study, StudyRepositoryError> {
    Study::try_from(row).map_err(StudyRepositoryError::query)
}

/// Escape a search keyword for use inside an ILIKE pattern. The escape
/// character itself must be handled before the wildcards.
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Load the full aggregate on an already checked-out connection.
///
/// Sessions come back ordered by sequence number and materials by id, so the
/// tree shape is stable across repeated loads of the same study.
async fn load_detail(
    conn: &mut AsyncPgConnection,
    study_id: i64,
) -> Result<Option<StudyDetail>, StudyRepositoryError> {
    let root = studies::table
        .filter(studies::id.eq(study_id))
        .select(StudyRow::as_select())
        .first::<StudyRow>(conn)
        .await
        .optional()
        .map_err(map_diesel)?;
    let Some(root) = root else {
        return Ok(None);
    };
    let study = row_to_study(root)?;

    let tags: Vec<StudyTagRow> = study_tags::table
        .filter(study_tags::study_id.eq(study_id))
        .order(study_tags::id.asc())
        .select(StudyTagRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel)?;

    let session_rows: Vec<SessionRow> = sessions::table
        .filter(sessions::study_id.eq(study_id))
        .order((sessions::seq_num.asc(), sessions::id.asc()))
        .select(SessionRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel)?;

    let material_rows: Vec<StudyMaterialRow> = study_materials::table
        .filter(study_materials::study_id.eq(study_id))
        .order(study_materials::id.asc())
        .select(StudyMaterialRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel)?;

    let notice_rows: Vec<StudyNoticeRow> = study_notices::table
        .filter(study_notices::study_id.eq(study_id))
        .order(study_notices::id.asc())
        .select(StudyNoticeRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel)?;

    let sessions = session_rows
        .into_iter()
        .map(|row| {
            let session_id = row.id;
            SessionDetail {
                session: row.into(),
                materials: material_rows
                    .iter()
                    .filter(|material| material.session_id == session_id)
                    .cloned()
                    .map(Into::into)
                    .collect(),
            }
        })
        .collect();

    Ok(Some(StudyDetail {
        study,
        tags: tags.into_iter().map(Into::into).collect(),
        sessions,
        notices: notice_rows.into_iter().map(Into::into).collect(),
    }))
}

/// Insert a complete tree and return the new root id.
async fn insert_tree_tx(
    conn: &mut AsyncPgConnection,
    tree: &NewStudyTree,
) -> Result<i64, diesel::result::Error> {
    let study_id: i64 = diesel::insert_into(studies::table)
        .values(NewStudyRow {
            is_valid: tree.study.is_valid,
            title: &tree.study.title,
            description: tree.study.description.as_deref(),
            rule: tree.study.rule.as_deref(),
            is_online: tree.study.is_online,
            hit: tree.study.hit,
            status: tree.study.status.as_i16(),
            leader_id: tree.study.leader_id,
            original_id: tree.study.original_id,
        })
        .returning(studies::id)
        .get_result(conn)
        .await?;

    if !tree.tags.is_empty() {
        let tag_rows: Vec<NewStudyTagRow> = tree
            .tags
            .iter()
            .map(|tag| NewStudyTagRow {
                study_id,
                tag_id: tag.tag_id,
                is_valid: tag.is_valid,
            })
            .collect();
        diesel::insert_into(study_tags::table)
            .values(&tag_rows)
            .execute(conn)
            .await?;
    }

    for session in &tree.sessions {
        let session_id: i64 = diesel::insert_into(sessions::table)
            .values(NewSessionRow {
                study_id,
                seq_num: session.seq_num,
                title: &session.title,
                description: session.description.as_deref(),
                comment: session.comment.as_deref(),
                is_valid: session.is_valid,
            })
            .returning(sessions::id)
            .get_result(conn)
            .await?;

        if !session.materials.is_empty() {
            let material_rows: Vec<NewStudyMaterialRow> = session
                .materials
                .iter()
                .map(|material| NewStudyMaterialRow {
                    study_id,
                    session_id,
                    kind: &material.kind,
                    content: material.content.as_deref(),
                    file_url: material.file_url.as_deref(),
                    is_valid: material.is_valid,
                })
                .collect();
            diesel::insert_into(study_materials::table)
                .values(&material_rows)
                .execute(conn)
                .await?;
        }
    }

    if !tree.notices.is_empty() {
        let notice_rows: Vec<NewStudyNoticeRow> = tree
            .notices
            .iter()
            .map(|notice| NewStudyNoticeRow {
                study_id,
                content: &notice.content,
                is_valid: notice.is_valid,
            })
            .collect();
        diesel::insert_into(study_notices::table)
            .values(&notice_rows)
            .execute(conn)
            .await?;
    }

    Ok(study_id)
}

/// Apply an aggregate update. Children with an id are updated in place,
/// children without one are inserted, and pair-like children are upserted on
/// their composite natural key so replays stay idempotent.
async fn save_tree_tx(
    conn: &mut AsyncPgConnection,
    tree: &StudyUpdateTree,
) -> Result<bool, diesel::result::Error> {
    let study_id = tree.study.id;
    let updated = diesel::update(studies::table.filter(studies::id.eq(study_id)))
        .set(StudyRowUpdate {
            title: &tree.study.title,
            description: tree.study.description.as_deref(),
            rule: tree.study.rule.as_deref(),
            is_online: tree.study.is_online,
            status: tree.study.status.as_i16(),
        })
        .execute(conn)
        .await?;
    if updated == 0 {
        return Ok(false);
    }

    for tag in &tree.tags {
        diesel::insert_into(study_tags::table)
            .values(NewStudyTagRow {
                study_id,
                tag_id: tag.tag_id,
                is_valid: tag.is_valid,
            })
            .on_conflict((study_tags::study_id, study_tags::tag_id))
            .do_update()
            .set(study_tags::is_valid.eq(tag.is_valid))
            .execute(conn)
            .await?;
    }

    for eval in &tree.evals {
        diesel::insert_into(study_evals::table)
            .values(NewStudyEvalRow {
                study_id,
                user_id: eval.user_id,
                score: eval.score,
                content: eval.content.as_deref(),
                is_valid: eval.is_valid,
            })
            .on_conflict((study_evals::study_id, study_evals::user_id))
            .do_update()
            .set((
                study_evals::score.eq(eval.score),
                study_evals::content.eq(eval.content.as_deref()),
                study_evals::is_valid.eq(eval.is_valid),
            ))
            .execute(conn)
            .await?;
    }

    for notice in &tree.notices {
        let notice_id = match notice.id {
            Some(id) => {
                diesel::update(
                    study_notices::table
                        .filter(study_notices::id.eq(id))
                        .filter(study_notices::study_id.eq(study_id)),
                )
                .set(StudyNoticeRowUpdate {
                    content: &notice.content,
                    is_valid: notice.is_valid,
                })
                .execute(conn)
                .await?;
                id
            }
            None => {
                diesel::insert_into(study_notices::table)
                    .values(NewStudyNoticeRow {
                        study_id,
                        content: &notice.content,
                        is_valid: notice.is_valid,
                    })
                    .returning(study_notices::id)
                    .get_result(conn)
                    .await?
            }
        };

        for check in &notice.checks {
            diesel::insert_into(study_notice_checks::table)
                .values(NewNoticeCheckRow {
                    notice_id,
                    user_id: check.user_id,
                    is_valid: check.is_valid,
                })
                .on_conflict((
                    study_notice_checks::notice_id,
                    study_notice_checks::user_id,
                ))
                .do_update()
                .set(study_notice_checks::is_valid.eq(check.is_valid))
                .execute(conn)
                .await?;
        }
    }

    for session in &tree.sessions {
        let session_id = match session.id {
            Some(id) => {
                diesel::update(
                    sessions::table
                        .filter(sessions::id.eq(id))
                        .filter(sessions::study_id.eq(study_id)),
                )
                .set(SessionRowUpdate {
                    seq_num: session.seq_num,
                    title: &session.title,
                    description: session.description.as_deref(),
                    comment: session.comment.as_deref(),
                    is_valid: session.is_valid,
                })
                .execute(conn)
                .await?;
                id
            }
            None => {
                diesel::insert_into(sessions::table)
                    .values(NewSessionRow {
                        study_id,
                        seq_num: session.seq_num,
                        title: &session.title,
                        description: session.description.as_deref(),
                        comment: session.comment.as_deref(),
                        is_valid: session.is_valid,
                    })
                    .returning(sessions::id)
                    .get_result(conn)
                    .await?
            }
        };

        for check in &session.checks {
            diesel::insert_into(session_checks::table)
                .values(NewSessionCheckRow {
                    session_id,
                    user_id: check.user_id,
                    is_valid: check.is_valid,
                })
                .on_conflict((session_checks::session_id, session_checks::user_id))
                .do_update()
                .set(session_checks::is_valid.eq(check.is_valid))
                .execute(conn)
                .await?;
        }

        for material in &session.materials {
            match material.id {
                Some(id) => {
                    diesel::update(
                        study_materials::table
                            .filter(study_materials::id.eq(id))
                            .filter(study_materials::study_id.eq(study_id)),
                    )
                    .set(StudyMaterialRowUpdate {
                        kind: &material.kind,
                        content: material.content.as_deref(),
                        file_url: material.file_url.as_deref(),
                        is_valid: material.is_valid,
                    })
                    .execute(conn)
                    .await?;
                }
                None => {
                    diesel::insert_into(study_materials::table)
                        .values(NewStudyMaterialRow {
                            study_id,
                            session_id,
                            kind: &material.kind,
                            content: material.content.as_deref(),
                            file_url: material.file_url.as_deref(),
                            is_valid: material.is_valid,
                        })
                        .execute(conn)
                        .await?;
                }
            }
        }
    }

    Ok(true)
}

#[async_trait]
impl StudyRepository for DieselStudyRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Study>, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = studies::table
            .filter(studies::id.eq(id))
            .select(StudyRow::as_select())
            .first::<StudyRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_study).transpose()
    }

    async fn find_detail(&self, id: i64) -> Result<Option<StudyDetail>, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        load_detail(&mut conn, id).await
    }

    async fn search(
        &self,
        options: &StudySearchOptions,
    ) -> Result<Page<StudySummary>, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let keyword_pattern = options
            .keyword
            .as_ref()
            .map(|keyword| format!("%{}%", escape_like(keyword)));

        let mut count_query = studies::table
            .filter(studies::is_valid.eq(true))
            .into_boxed();
        let mut rows_query = studies::table
            .filter(studies::is_valid.eq(true))
            .into_boxed();

        if let Some(pattern) = &keyword_pattern {
            count_query = count_query.filter(studies::title.ilike(pattern.clone()));
            rows_query = rows_query.filter(studies::title.ilike(pattern.clone()));
        }
        if let Some(is_online) = options.is_online {
            count_query = count_query.filter(studies::is_online.eq(is_online));
            rows_query = rows_query.filter(studies::is_online.eq(is_online));
        }
        if let Some(status) = options.status {
            count_query = count_query.filter(studies::status.eq(status.as_i16()));
            rows_query = rows_query.filter(studies::status.eq(status.as_i16()));
        }
        if let Some(tag_id) = options.tag_id {
            let tagged = study_tags::table
                .filter(study_tags::tag_id.eq(tag_id))
                .filter(study_tags::is_valid.eq(true))
                .select(study_tags::study_id);
            count_query = count_query.filter(studies::id.eq_any(tagged.clone()));
            rows_query = rows_query.filter(studies::id.eq_any(tagged));
        }

        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let offset = i64::from(options.page) * i64::from(options.size);
        let rows: Vec<StudyRow> = rows_query
            .order((studies::created_at.desc(), studies::id.desc()))
            .offset(offset)
            .limit(i64::from(options.size))
            .select(StudyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(|row| {
                row_to_study(row).map(|study| StudySummary {
                    id: study.id,
                    title: study.title,
                    description: study.description,
                    is_online: study.is_online,
                    status: study.status,
                    hit: study.hit,
                    like_cnt: study.like_cnt,
                    bookmark_cnt: study.bookmark_cnt,
                    leader_id: study.leader_id,
                    created_at: study.created_at,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page: options.page,
            size: options.size,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn insert_tree(&self, tree: &NewStudyTree) -> Result<StudyDetail, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let study_id = conn
            .transaction(|conn| async move { insert_tree_tx(conn, tree).await }.scope_boxed())
            .await
            .map_err(map_diesel)?;

        load_detail(&mut conn, study_id)
            .await?
            .ok_or_else(|| StudyRepositoryError::query("inserted study vanished before reload"))
    }

    async fn save_tree(&self, tree: &StudyUpdateTree) -> Result<bool, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| async move { save_tree_tx(conn, tree).await }.scope_boxed())
            .await
            .map_err(map_diesel)
    }

    async fn mark_removed(&self, id: i64) -> Result<bool, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(
            studies::table
                .filter(studies::id.eq(id))
                .filter(studies::is_valid.eq(true)),
        )
        .set(studies::is_valid.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(updated > 0)
    }

    async fn mark_shared(&self, id: i64) -> Result<bool, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(
            studies::table
                .filter(studies::id.eq(id))
                .filter(studies::is_valid.eq(true)),
        )
        .set(studies::is_shared.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        Ok(updated > 0)
    }
}
