//! Study aggregate entities and the clone plan.
//!
//! The study is the aggregate root: tags, sessions (with their materials) and
//! notices hang off it by parent id. Every entity is soft-deleted by flipping
//! `is_valid`; rows are never removed. [`StudyDetail::clone_plan`] captures
//! the deep-copy semantics of the clone operation as a pure value so the
//! persistence adapter only has to walk the tree inside one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::User;

/// Lifecycle state of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StudyStatus {
    /// Initial state; also the state a clone starts in.
    Preparing,
    /// Open for members.
    Recruiting,
    /// Sessions are running.
    InProgress,
    /// Wrapped up.
    Finished,
}

impl StudyStatus {
    /// Small-int representation used by the persistence layer.
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Preparing => 0,
            Self::Recruiting => 1,
            Self::InProgress => 2,
            Self::Finished => 3,
        }
    }

    /// Decode the small-int representation; unknown values are rejected.
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Preparing),
            1 => Some(Self::Recruiting),
            2 => Some(Self::InProgress),
            3 => Some(Self::Finished),
            _ => None,
        }
    }
}

impl Default for StudyStatus {
    fn default() -> Self {
        Self::Preparing
    }
}

/// Aggregate root: a study-group record.
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
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
    pub status: StudyStatus,
    pub leader_id: i64,
    pub original_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Study {
    /// Soft-delete the study.
    pub fn remove(&mut self) {
        self.is_valid = false;
    }

    /// Mark the study shared; repeated calls are no-ops.
    pub fn share(&mut self) {
        self.is_shared = true;
    }

    /// Increment the like counter.
    pub fn add_like(&mut self) {
        self.like_cnt += 1;
    }

    /// Decrement the like counter, never below zero.
    pub fn remove_like(&mut self) {
        self.like_cnt = (self.like_cnt - 1).max(0);
    }

    /// Increment the bookmark counter.
    pub fn add_bookmark(&mut self) {
        self.bookmark_cnt += 1;
    }

    /// Decrement the bookmark counter, never below zero.
    pub fn remove_bookmark(&mut self) {
        self.bookmark_cnt = (self.bookmark_cnt - 1).max(0);
    }
}

/// Tag attached to a study.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyTag {
    pub id: i64,
    pub study_id: i64,
    pub tag_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// A scheduled meeting within a study.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: i64,
    pub study_id: i64,
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// File-backed material attached to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyMaterial {
    pub id: i64,
    pub study_id: i64,
    pub session_id: i64,
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Study-wide announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyNotice {
    pub id: i64,
    pub study_id: i64,
    pub content: String,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user read receipt for a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyNoticeCheck {
    pub id: i64,
    pub notice_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user attendance mark for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCheck {
    pub id: i64,
    pub session_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Member evaluation of a study; unique per `(study_id, user_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyEval {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub content: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Like pair row; unique per `(study_id, user_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyLike {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Bookmark pair row; unique per `(study_id, user_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Record of a user having participated in a study.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationHistory {
    pub id: i64,
    pub study_id: i64,
    pub user_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// A session together with its materials, as loaded for the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetail {
    pub session: Session,
    pub materials: Vec<StudyMaterial>,
}

/// The fully loaded study aggregate: root plus child collections.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyDetail {
    pub study: Study,
    pub tags: Vec<StudyTag>,
    pub sessions: Vec<SessionDetail>,
    pub notices: Vec<StudyNotice>,
}

/// Aggregate plus the leader's account, as served to detail reads.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyView {
    pub detail: StudyDetail,
    pub leader: User,
}

/// Scalar fields for a study row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudy {
    pub is_valid: bool,
    pub title: String,
    pub description: Option<String>,
    pub rule: Option<String>,
    pub is_online: bool,
    pub hit: i32,
    pub status: StudyStatus,
    pub leader_id: i64,
    pub original_id: Option<i64>,
}

/// Tag draft inside a [`NewStudyTree`]; the study id is assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyTag {
    pub tag_id: i64,
    pub is_valid: bool,
}

/// Session draft with its nested material drafts.
///
/// Materials stay nested under the session they came from, so the adapter can
/// re-parent each one to the freshly assigned session id without any
/// seq-num-based matching.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionTree {
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub is_valid: bool,
    pub materials: Vec<NewStudyMaterial>,
}

/// Material draft inside a [`NewSessionTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyMaterial {
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub is_valid: bool,
}

/// Notice draft inside a [`NewStudyTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyNotice {
    pub content: String,
    pub is_valid: bool,
}

/// A complete study tree ready for one atomic insert.
///
/// Used both for creating a brand-new study and for persisting a clone plan.
/// The adapter persists the root first, then tags, sessions, materials and
/// notices, so foreign keys always reference rows that already exist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyTree {
    pub study: NewStudy,
    pub tags: Vec<NewStudyTag>,
    pub sessions: Vec<NewSessionTree>,
    pub notices: Vec<NewStudyNotice>,
}

impl StudyDetail {
    /// Build the deep-copy plan for cloning this study.
    ///
    /// Copied from the source: `is_valid`, `title`, `description`, `hit`,
    /// `rule`, `is_online`, every tag, every session (title, description,
    /// comment, seq num) with its materials (kind, content, and the file url;
    /// the blob itself is shared, not duplicated), and every notice.
    ///
    /// Reset on the clone: both counters start at zero, the status returns to
    /// [`StudyStatus::Preparing`], the share flag is cleared, `leader_id`
    /// comes from the caller, and `original_id` points back at the source.
    /// Likes, bookmarks, evaluations, checks and participation history are
    /// not carried over; the clone starts with zero social state.
    pub fn clone_plan(&self, leader_id: i64) -> NewStudyTree {
        NewStudyTree {
            study: NewStudy {
                is_valid: self.study.is_valid,
                title: self.study.title.clone(),
                description: self.study.description.clone(),
                rule: self.study.rule.clone(),
                is_online: self.study.is_online,
                hit: self.study.hit,
                status: StudyStatus::Preparing,
                leader_id,
                original_id: Some(self.study.id),
            },
            tags: self
                .tags
                .iter()
                .map(|tag| NewStudyTag {
                    tag_id: tag.tag_id,
                    is_valid: tag.is_valid,
                })
                .collect(),
            sessions: self
                .sessions
                .iter()
                .map(|detail| NewSessionTree {
                    seq_num: detail.session.seq_num,
                    title: detail.session.title.clone(),
                    description: detail.session.description.clone(),
                    comment: detail.session.comment.clone(),
                    is_valid: detail.session.is_valid,
                    materials: detail
                        .materials
                        .iter()
                        .map(|material| NewStudyMaterial {
                            kind: material.kind.clone(),
                            content: material.content.clone(),
                            file_url: material.file_url.clone(),
                            is_valid: material.is_valid,
                        })
                        .collect(),
                })
                .collect(),
            notices: self
                .notices
                .iter()
                .map(|notice| NewStudyNotice {
                    content: notice.content.clone(),
                    is_valid: notice.is_valid,
                })
                .collect(),
        }
    }
}

/// Root field changes carried by an update request.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPatch {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub rule: Option<String>,
    pub is_online: bool,
    pub status: StudyStatus,
}

/// Tag entry in an update tree; upserted on `(study_id, tag_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyTagUpdate {
    pub tag_id: i64,
    pub is_valid: bool,
}

/// Evaluation entry in an update tree; upserted on `(study_id, user_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyEvalUpdate {
    pub user_id: i64,
    pub score: i32,
    pub content: Option<String>,
    pub is_valid: bool,
}

/// Read-receipt entry nested under a notice; upserted on its natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckUpdate {
    pub user_id: i64,
    pub is_valid: bool,
}

/// Notice entry in an update tree with its read receipts.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyNoticeUpdate {
    pub id: Option<i64>,
    pub content: String,
    pub is_valid: bool,
    pub checks: Vec<CheckUpdate>,
}

/// Material entry nested under a session update.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyMaterialUpdate {
    pub id: Option<i64>,
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub is_valid: bool,
}

/// Session entry in an update tree with its checks and materials.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub id: Option<i64>,
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub is_valid: bool,
    pub checks: Vec<CheckUpdate>,
    pub materials: Vec<StudyMaterialUpdate>,
}

/// A full aggregate update as supplied by the update request.
///
/// Children carrying `is_valid = false` are soft deletions. Entries with an
/// id update the existing row; entries without one are inserts (pair-like
/// children are upserted on their composite natural key instead, which keeps
/// repeated identical payloads idempotent).
#[derive(Debug, Clone, PartialEq)]
pub struct StudyUpdateTree {
    pub study: StudyPatch,
    pub tags: Vec<StudyTagUpdate>,
    pub evals: Vec<StudyEvalUpdate>,
    pub notices: Vec<StudyNoticeUpdate>,
    pub sessions: Vec<SessionUpdate>,
}

/// Search filters for the study listing; all filters are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudySearchOptions {
    pub keyword: Option<String>,
    pub tag_id: Option<i64>,
    pub is_online: Option<bool>,
    pub status: Option<StudyStatus>,
    pub page: u32,
    pub size: u32,
}

/// Flat projection returned by the search query.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_online: bool,
    pub status: StudyStatus,
    pub hit: i32,
    pub like_cnt: i32,
    pub bookmark_cnt: i32,
    pub leader_id: i64,
    pub created_at: DateTime<Utc>,
}

/// One page of results with the total row count for the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

#[cfg(test)]
#[path = "study_tests.rs"]
mod tests;
