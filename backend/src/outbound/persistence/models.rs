//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Infallible row-to-entity conversions live here so the repositories
//! that share a table do not duplicate them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Bookmark, Follow, Session, Study, StudyEval, StudyLike, StudyMaterial, StudyNotice,
    StudyStatus, StudyTag, User, UserEval, UserTag,
};

use super::schema::{
    bookmarks, follows, session_checks, sessions, studies, study_evals, study_likes,
    study_materials, study_notice_checks, study_notices, study_tags, user_evals, user_tags, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub introduction: Option<String>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<String>,
    pub refresh_token: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password: row.password,
            name: row.name,
            nickname: row.nickname,
            image_url: row.image_url,
            introduction: row.introduction,
            age: row.age,
            sido_id: row.sido_id,
            gugun_id: row.gugun_id,
            phone_number: row.phone_number,
            refresh_token: row.refresh_token,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub nickname: &'a str,
    pub image_url: Option<&'a str>,
    pub introduction: Option<&'a str>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<&'a str>,
}

// The patch carries the full profile state, so absent optionals clear their
// columns instead of being skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRowUpdate<'a> {
    pub name: &'a str,
    pub nickname: &'a str,
    pub image_url: Option<&'a str>,
    pub introduction: Option<&'a str>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserTagRow {
    pub id: i64,
    pub user_id: i64,
    pub tag_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserTagRow> for UserTag {
    fn from(row: UserTagRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            tag_id: row.tag_id,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_tags)]
pub(crate) struct NewUserTagRow {
    pub user_id: i64,
    pub tag_id: i64,
}

// ---------------------------------------------------------------------------
// Studies and their children
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = studies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudyRow {
    pub id: i64,
    pub is_valid: bool,
    pub title: String,
    pub description: Option<String>,
    pub rule: Option<String>,
    pub is_online: bool,
    pub hit: i32,
    pub like_cnt: i32,
    pub bookmark_cnt: i32,
    pub is_shared: bool,
    pub status: i16,
    pub leader_id: i64,
    pub original_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StudyRow> for Study {
    type Error = String;

    fn try_from(row: StudyRow) -> Result<Self, Self::Error> {
        let status = StudyStatus::from_i16(row.status)
            .ok_or_else(|| format!("unknown study status code {}", row.status))?;
        Ok(Self {
            id: row.id,
            is_valid: row.is_valid,
            title: row.title,
            description: row.description,
            rule: row.rule,
            is_online: row.is_online,
            hit: row.hit,
            like_cnt: row.like_cnt,
            bookmark_cnt: row.bookmark_cnt,
            is_shared: row.is_shared,
            status,
            leader_id: row.leader_id,
            original_id: row.original_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = studies)]
pub(crate) struct NewStudyRow<'a> {
    pub is_valid: bool,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub rule: Option<&'a str>,
    pub is_online: bool,
    pub hit: i32,
    pub status: i16,
    pub leader_id: i64,
    pub original_id: Option<i64>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = studies)]
pub(crate) struct StudyRowUpdate<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub rule: Option<&'a str>,
    pub is_online: bool,
    pub status: i16,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudyTagRow {
    pub id: i64,
    pub study_id: i64,
    pub tag_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StudyTagRow> for StudyTag {
    fn from(row: StudyTagRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            tag_id: row.tag_id,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_tags)]
pub(crate) struct NewStudyTagRow {
    pub study_id: i64,
    pub tag_id: i64,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: i64,
    pub study_id: i64,
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            seq_num: row.seq_num,
            title: row.title,
            description: row.description,
            comment: row.comment,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub study_id: i64,
    pub seq_num: i32,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub comment: Option<&'a str>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sessions)]
pub(crate) struct SessionRowUpdate<'a> {
    pub seq_num: i32,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub comment: Option<&'a str>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_materials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudyMaterialRow {
    pub id: i64,
    pub study_id: i64,
    pub session_id: i64,
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StudyMaterialRow> for StudyMaterial {
    fn from(row: StudyMaterialRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            session_id: row.session_id,
            kind: row.kind,
            content: row.content,
            file_url: row.file_url,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_materials)]
pub(crate) struct NewStudyMaterialRow<'a> {
    pub study_id: i64,
    pub session_id: i64,
    pub kind: &'a str,
    pub content: Option<&'a str>,
    pub file_url: Option<&'a str>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = study_materials)]
pub(crate) struct StudyMaterialRowUpdate<'a> {
    pub kind: &'a str,
    pub content: Option<&'a str>,
    pub file_url: Option<&'a str>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_notices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudyNoticeRow {
    pub id: i64,
    pub study_id: i64,
    pub content: String,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StudyNoticeRow> for StudyNotice {
    fn from(row: StudyNoticeRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            content: row.content,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_notices)]
pub(crate) struct NewStudyNoticeRow<'a> {
    pub study_id: i64,
    pub content: &'a str,
    pub is_valid: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = study_notices)]
pub(crate) struct StudyNoticeRowUpdate<'a> {
    pub content: &'a str,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_notice_checks)]
pub(crate) struct NewNoticeCheckRow {
    pub notice_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = session_checks)]
pub(crate) struct NewSessionCheckRow {
    pub session_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
}

// ---------------------------------------------------------------------------
// Pair rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_evals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudyEvalRow {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub content: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StudyEvalRow> for StudyEval {
    fn from(row: StudyEvalRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            user_id: row.user_id,
            score: row.score,
            content: row.content,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_evals)]
pub(crate) struct NewStudyEvalRow<'a> {
    pub study_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub content: Option<&'a str>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudyLikeRow {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StudyLikeRow> for StudyLike {
    fn from(row: StudyLikeRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            user_id: row.user_id,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_likes)]
pub(crate) struct NewStudyLikeRow {
    pub study_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookmarks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookmarkRow {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        Self {
            id: row.id,
            study_id: row.study_id,
            user_id: row.user_id,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookmarks)]
pub(crate) struct NewBookmarkRow {
    pub study_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FollowRow {
    pub id: i64,
    pub follower_id: i64,
    pub followee_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FollowRow> for Follow {
    fn from(row: FollowRow) -> Self {
        Self {
            id: row.id,
            follower_id: row.follower_id,
            followee_id: row.followee_id,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub follower_id: i64,
    pub followee_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_evals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserEvalRow {
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluated_id: i64,
    pub score: i32,
    pub content: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserEvalRow> for UserEval {
    fn from(row: UserEvalRow) -> Self {
        Self {
            id: row.id,
            evaluator_id: row.evaluator_id,
            evaluated_id: row.evaluated_id,
            score: row.score,
            content: row.content,
            is_valid: row.is_valid,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_evals)]
pub(crate) struct NewUserEvalRow<'a> {
    pub evaluator_id: i64,
    pub evaluated_id: i64,
    pub score: i32,
    pub content: Option<&'a str>,
    pub is_valid: bool,
}
