//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every HTTP endpoint and the request/response schemas
//! they reference. The generated specification backs the Swagger UI served
//! in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::error::ApiError;
use crate::inbound::http::materials::{MaterialCreateMeta, MaterialResponse, MaterialUpdateMeta};
use crate::inbound::http::studies::{
    CheckRequest, CloneRequest, EvalUpdateRequest, MaterialUpdateRequest, NoticeCreateRequest,
    NoticeResponse, NoticeUpdateRequest, SessionCreateRequest, SessionResponse,
    SessionUpdateRequest, StudyCreateRequest, StudyDetailResponse, StudyPageResponse,
    StudySummaryResponse, StudyUpdateRequest, TagResponse, TagUpdateRequest,
};
use crate::inbound::http::study_social::StudyEvalRequest;
use crate::inbound::http::users::{
    RefreshTokenRequest, RefreshTokenResponse, UserCreateRequest, UserEvalRequest,
    UserProfileResponse, UserResponse, UserUpdateRequest,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lighthouse backend API",
        description = "HTTP interface for study groups, their sessions and materials, \
                       and the social interactions around them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::studies::get_study,
        crate::inbound::http::studies::create_study,
        crate::inbound::http::studies::update_study,
        crate::inbound::http::studies::remove_study,
        crate::inbound::http::studies::share_study,
        crate::inbound::http::studies::clone_study,
        crate::inbound::http::studies::search_studies,
        crate::inbound::http::study_social::add_like,
        crate::inbound::http::study_social::remove_like,
        crate::inbound::http::study_social::add_bookmark,
        crate::inbound::http::study_social::remove_bookmark,
        crate::inbound::http::study_social::add_eval,
        crate::inbound::http::study_social::remove_eval,
        crate::inbound::http::study_social::add_tag,
        crate::inbound::http::study_social::remove_tag,
        crate::inbound::http::materials::create_material,
        crate::inbound::http::materials::get_material,
        crate::inbound::http::materials::update_material,
        crate::inbound::http::materials::remove_material,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::get_user_by_email,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::remove_user,
        crate::inbound::http::users::save_refresh_token,
        crate::inbound::http::users::get_refresh_token,
        crate::inbound::http::users::follow,
        crate::inbound::http::users::unfollow,
        crate::inbound::http::users::add_eval,
        crate::inbound::http::users::remove_eval,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiError,
        StudyCreateRequest,
        StudyUpdateRequest,
        SessionCreateRequest,
        SessionUpdateRequest,
        NoticeCreateRequest,
        NoticeUpdateRequest,
        CheckRequest,
        TagUpdateRequest,
        EvalUpdateRequest,
        MaterialUpdateRequest,
        CloneRequest,
        StudyDetailResponse,
        StudyPageResponse,
        StudySummaryResponse,
        SessionResponse,
        NoticeResponse,
        TagResponse,
        StudyEvalRequest,
        MaterialCreateMeta,
        MaterialUpdateMeta,
        MaterialResponse,
        UserCreateRequest,
        UserUpdateRequest,
        RefreshTokenRequest,
        RefreshTokenResponse,
        UserEvalRequest,
        UserResponse,
        UserProfileResponse,
    )),
    tags(
        (name = "studies", description = "Study aggregates and their lifecycle"),
        (name = "study-social", description = "Likes, bookmarks, evaluations and tags on studies"),
        (name = "materials", description = "Session materials and their files"),
        (name = "users", description = "Accounts, follows and peer evaluations"),
        (name = "health", description = "Liveness probes")
    )
)]
pub struct ApiDoc;
