//! Study HTTP handlers.
//!
//! ```text
//! GET    /study            search with filters
//! POST   /study            create a study tree
//! GET    /study/{id}       load the aggregate
//! PUT    /study/{id}       apply an aggregate update
//! DELETE /study/{id}       soft-delete
//! PUT    /study/{id}/share mark shared
//! POST   /study/{id}/clone deep-copy for a new leader
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CheckUpdate, NewSessionTree, NewStudy, NewStudyNotice, NewStudyTag, NewStudyTree, Page,
    SessionDetail, SessionUpdate, StudyDetail, StudyEvalUpdate, StudyMaterialUpdate,
    StudyNotice, StudyNoticeUpdate, StudyPatch, StudySearchOptions, StudyStatus, StudySummary,
    StudyTag, StudyTagUpdate, StudyUpdateTree, StudyView,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::materials::MaterialResponse;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, require_positive_id};

/// Session payload inside a create request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreateRequest {
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
}

/// Notice payload inside a create request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeCreateRequest {
    pub content: String,
}

/// Request payload for creating a study.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub rule: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    pub leader_id: Option<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub sessions: Vec<SessionCreateRequest>,
    #[serde(default)]
    pub notices: Vec<NoticeCreateRequest>,
}

fn default_true() -> bool {
    true
}

/// Read-receipt or attendance payload inside an update request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub user_id: i64,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

/// Tag payload inside an update request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagUpdateRequest {
    pub tag_id: i64,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

/// Evaluation payload inside an update request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvalUpdateRequest {
    pub user_id: i64,
    pub score: i32,
    pub content: Option<String>,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

/// Notice payload inside an update request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeUpdateRequest {
    pub id: Option<i64>,
    pub content: String,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default)]
    pub checks: Vec<CheckRequest>,
}

/// Material payload inside an update request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUpdateRequest {
    pub id: Option<i64>,
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

/// Session payload inside an update request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdateRequest {
    pub id: Option<i64>,
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default)]
    pub checks: Vec<CheckRequest>,
    #[serde(default)]
    pub materials: Vec<MaterialUpdateRequest>,
}

/// Request payload for updating the whole aggregate.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyUpdateRequest {
    pub title: String,
    pub description: Option<String>,
    pub rule: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub status: StudyStatus,
    #[serde(default)]
    pub tags: Vec<TagUpdateRequest>,
    #[serde(default)]
    pub evals: Vec<EvalUpdateRequest>,
    #[serde(default)]
    pub notices: Vec<NoticeUpdateRequest>,
    #[serde(default)]
    pub sessions: Vec<SessionUpdateRequest>,
}

/// Request payload for cloning a study.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    pub leader_id: Option<i64>,
}

/// Tag entry in a study response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: i64,
    pub tag_id: i64,
    pub is_valid: bool,
}

/// Session entry in a study response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: i64,
    pub seq_num: i32,
    pub title: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub is_valid: bool,
    pub materials: Vec<MaterialResponse>,
}

/// Notice entry in a study response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub id: i64,
    pub content: String,
    pub is_valid: bool,
    pub created_at: String,
}

/// Full aggregate response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyDetailResponse {
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
    pub created_at: String,
    pub tags: Vec<TagResponse>,
    pub sessions: Vec<SessionResponse>,
    pub notices: Vec<NoticeResponse>,
    /// Present on detail reads; create and clone echo only the tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<UserResponse>,
}

/// Flat search hit.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudySummaryResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_online: bool,
    pub status: StudyStatus,
    pub hit: i32,
    pub like_cnt: i32,
    pub bookmark_cnt: i32,
    pub leader_id: i64,
    pub created_at: String,
}

/// One page of search hits.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyPageResponse {
    pub items: Vec<StudySummaryResponse>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

fn default_page_size() -> u32 {
    20
}

/// Search filters accepted as query parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub tag_id: Option<i64>,
    pub is_online: Option<bool>,
    pub status: Option<StudyStatus>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

impl From<StudyTag> for TagResponse {
    fn from(tag: StudyTag) -> Self {
        Self {
            id: tag.id,
            tag_id: tag.tag_id,
            is_valid: tag.is_valid,
        }
    }
}

impl From<SessionDetail> for SessionResponse {
    fn from(detail: SessionDetail) -> Self {
        Self {
            id: detail.session.id,
            seq_num: detail.session.seq_num,
            title: detail.session.title,
            description: detail.session.description,
            comment: detail.session.comment,
            is_valid: detail.session.is_valid,
            materials: detail
                .materials
                .into_iter()
                .filter(|material| material.is_valid)
                .map(MaterialResponse::from)
                .collect(),
        }
    }
}

impl From<StudyNotice> for NoticeResponse {
    fn from(notice: StudyNotice) -> Self {
        Self {
            id: notice.id,
            content: notice.content,
            is_valid: notice.is_valid,
            created_at: notice.created_at.to_rfc3339(),
        }
    }
}

impl From<StudyDetail> for StudyDetailResponse {
    fn from(detail: StudyDetail) -> Self {
        let study = detail.study;
        Self {
            id: study.id,
            is_valid: study.is_valid,
            title: study.title,
            description: study.description,
            rule: study.rule,
            is_online: study.is_online,
            hit: study.hit,
            like_cnt: study.like_cnt,
            bookmark_cnt: study.bookmark_cnt,
            is_shared: study.is_shared,
            status: study.status,
            leader_id: study.leader_id,
            original_id: study.original_id,
            created_at: study.created_at.to_rfc3339(),
            // Soft-deleted children stay in the aggregate for clone and
            // update reconciliation but never reach a client.
            tags: detail
                .tags
                .into_iter()
                .filter(|tag| tag.is_valid)
                .map(TagResponse::from)
                .collect(),
            sessions: detail
                .sessions
                .into_iter()
                .filter(|session| session.session.is_valid)
                .map(SessionResponse::from)
                .collect(),
            notices: detail
                .notices
                .into_iter()
                .filter(|notice| notice.is_valid)
                .map(NoticeResponse::from)
                .collect(),
            leader: None,
        }
    }
}

impl From<StudyView> for StudyDetailResponse {
    fn from(view: StudyView) -> Self {
        let mut response = StudyDetailResponse::from(view.detail);
        response.leader = Some(view.leader.into());
        response
    }
}

impl From<StudySummary> for StudySummaryResponse {
    fn from(summary: StudySummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            description: summary.description,
            is_online: summary.is_online,
            status: summary.status,
            hit: summary.hit,
            like_cnt: summary.like_cnt,
            bookmark_cnt: summary.bookmark_cnt,
            leader_id: summary.leader_id,
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

impl From<Page<StudySummary>> for StudyPageResponse {
    fn from(page: Page<StudySummary>) -> Self {
        Self {
            items: page
                .items
                .into_iter()
                .map(StudySummaryResponse::from)
                .collect(),
            page: page.page,
            size: page.size,
            total: page.total,
        }
    }
}

fn build_create_tree(payload: StudyCreateRequest) -> ApiResult<(i64, NewStudyTree)> {
    let leader_id = payload.leader_id.ok_or_else(|| missing_field_error("leaderId"))?;
    let leader_id = require_positive_id(leader_id, "leaderId")?;

    let tree = NewStudyTree {
        study: NewStudy {
            is_valid: true,
            title: payload.title,
            description: payload.description,
            rule: payload.rule,
            is_online: payload.is_online,
            hit: 0,
            status: StudyStatus::Preparing,
            leader_id,
            original_id: None,
        },
        tags: payload
            .tag_ids
            .into_iter()
            .map(|tag_id| NewStudyTag {
                tag_id,
                is_valid: true,
            })
            .collect(),
        sessions: payload
            .sessions
            .into_iter()
            .map(|session| NewSessionTree {
                seq_num: session.seq_num,
                title: session.title,
                description: session.description,
                comment: session.comment,
                is_valid: true,
                materials: Vec::new(),
            })
            .collect(),
        notices: payload
            .notices
            .into_iter()
            .map(|notice| NewStudyNotice {
                content: notice.content,
                is_valid: true,
            })
            .collect(),
    };
    Ok((leader_id, tree))
}

fn build_update_tree(study_id: i64, payload: StudyUpdateRequest) -> StudyUpdateTree {
    StudyUpdateTree {
        study: StudyPatch {
            id: study_id,
            title: payload.title,
            description: payload.description,
            rule: payload.rule,
            is_online: payload.is_online,
            status: payload.status,
        },
        tags: payload
            .tags
            .into_iter()
            .map(|tag| StudyTagUpdate {
                tag_id: tag.tag_id,
                is_valid: tag.is_valid,
            })
            .collect(),
        evals: payload
            .evals
            .into_iter()
            .map(|eval| StudyEvalUpdate {
                user_id: eval.user_id,
                score: eval.score,
                content: eval.content,
                is_valid: eval.is_valid,
            })
            .collect(),
        notices: payload
            .notices
            .into_iter()
            .map(|notice| StudyNoticeUpdate {
                id: notice.id,
                content: notice.content,
                is_valid: notice.is_valid,
                checks: notice
                    .checks
                    .into_iter()
                    .map(|check| CheckUpdate {
                        user_id: check.user_id,
                        is_valid: check.is_valid,
                    })
                    .collect(),
            })
            .collect(),
        sessions: payload
            .sessions
            .into_iter()
            .map(|session| SessionUpdate {
                id: session.id,
                seq_num: session.seq_num,
                title: session.title,
                description: session.description,
                comment: session.comment,
                is_valid: session.is_valid,
                checks: session
                    .checks
                    .into_iter()
                    .map(|check| CheckUpdate {
                        user_id: check.user_id,
                        is_valid: check.is_valid,
                    })
                    .collect(),
                materials: session
                    .materials
                    .into_iter()
                    .map(|material| StudyMaterialUpdate {
                        id: material.id,
                        kind: material.kind,
                        content: material.content,
                        file_url: material.file_url,
                        is_valid: material.is_valid,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/study/{study_id}",
    tags = ["studies"],
    params(("study_id" = i64, Path, description = "Study identifier")),
    responses(
        (status = 200, description = "Study aggregate", body = StudyDetailResponse),
        (status = 404, description = "Study not found or removed")
    )
)]
#[get("/study/{study_id}")]
pub async fn get_study(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<StudyDetailResponse>> {
    let study_id = require_positive_id(path.into_inner(), "studyId")?;
    let detail = state.studies.get_study(study_id).await?;
    Ok(web::Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/study",
    tags = ["studies"],
    request_body = StudyCreateRequest,
    responses(
        (status = 200, description = "Created study", body = StudyDetailResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[post("/study")]
pub async fn create_study(
    state: web::Data<HttpState>,
    payload: web::Json<StudyCreateRequest>,
) -> ApiResult<web::Json<StudyDetailResponse>> {
    let (_leader_id, tree) = build_create_tree(payload.into_inner())?;
    let created = state.studies.create_study(tree).await?;
    Ok(web::Json(created.into()))
}

#[utoipa::path(
    put,
    path = "/study/{study_id}",
    tags = ["studies"],
    params(("study_id" = i64, Path, description = "Study identifier")),
    request_body = StudyUpdateRequest,
    responses(
        (status = 200, description = "Update applied"),
        (status = 404, description = "Study not found or removed")
    )
)]
#[put("/study/{study_id}")]
pub async fn update_study(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<StudyUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let study_id = require_positive_id(path.into_inner(), "studyId")?;
    let tree = build_update_tree(study_id, payload.into_inner());
    state.studies.update_study(tree).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/study/{study_id}",
    tags = ["studies"],
    params(("study_id" = i64, Path, description = "Study identifier")),
    responses(
        (status = 200, description = "Study soft-deleted"),
        (status = 404, description = "Study not found or already removed")
    )
)]
#[delete("/study/{study_id}")]
pub async fn remove_study(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let study_id = require_positive_id(path.into_inner(), "studyId")?;
    state.studies.remove_study(study_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    put,
    path = "/study/{study_id}/share",
    tags = ["studies"],
    params(("study_id" = i64, Path, description = "Study identifier")),
    responses(
        (status = 200, description = "Study marked shared"),
        (status = 404, description = "Study not found or removed")
    )
)]
#[put("/study/{study_id}/share")]
pub async fn share_study(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let study_id = require_positive_id(path.into_inner(), "studyId")?;
    state.studies.share_study(study_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    post,
    path = "/study/{study_id}/clone",
    tags = ["studies"],
    params(("study_id" = i64, Path, description = "Source study identifier")),
    request_body = CloneRequest,
    responses(
        (status = 200, description = "The clone, counters reset", body = StudyDetailResponse),
        (status = 404, description = "Source study or leader not found")
    )
)]
#[post("/study/{study_id}/clone")]
pub async fn clone_study(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<CloneRequest>,
) -> ApiResult<web::Json<StudyDetailResponse>> {
    let study_id = require_positive_id(path.into_inner(), "studyId")?;
    let leader_id = payload
        .into_inner()
        .leader_id
        .ok_or_else(|| missing_field_error("leaderId"))?;
    let leader_id = require_positive_id(leader_id, "leaderId")?;
    let cloned = state.studies.clone_study(study_id, leader_id).await?;
    Ok(web::Json(cloned.into()))
}

#[utoipa::path(
    get,
    path = "/study",
    tags = ["studies"],
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = StudyPageResponse),
        (status = 400, description = "Invalid page size")
    )
)]
#[get("/study")]
pub async fn search_studies(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<StudyPageResponse>> {
    let query = query.into_inner();
    let page = state
        .studies
        .search_studies(StudySearchOptions {
            keyword: query.keyword,
            tag_id: query.tag_id,
            is_online: query.is_online,
            status: query.status,
            page: query.page,
            size: query.size,
        })
        .await?;
    Ok(web::Json(page.into()))
}
