//! User HTTP handlers: accounts, follows and peer evaluations.
//!
//! ```text
//! POST   /user                          register
//! GET    /user/{id}                     profile with interest tags
//! GET    /user/email/{email}            account lookup by address
//! PUT    /user/{id}                     update profile and tags
//! DELETE /user/{id}                     soft-delete
//! PUT    /user/{id}/refresh-token       store or clear the token slot
//! GET    /user/{id}/refresh-token       read the token slot
//! POST/DELETE /follow/{follower}/{followee}
//! POST   /user-eval                     DELETE /user-eval/{evaluator}/{evaluated}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NewUser, NewUserEval, User, UserPatch, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_positive_id;

/// Request payload for registering a user.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
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
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Request payload for updating a profile. Email and password stay outside
/// the profile path.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    pub name: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub introduction: Option<String>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Request payload for the refresh token slot; `null` clears it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Current contents of the refresh token slot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub refresh_token: Option<String>,
}

/// Request payload for evaluating another user.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEvalRequest {
    pub evaluator_id: i64,
    pub evaluated_id: i64,
    pub score: i32,
    pub content: Option<String>,
}

/// Account as returned to clients. The password and refresh token never
/// leave the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub introduction: Option<String>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<String>,
    pub is_valid: bool,
    pub created_at: String,
}

/// Account with its interest tag ids.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub tag_ids: Vec<i64>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            nickname: user.nickname,
            image_url: user.image_url,
            introduction: user.introduction,
            age: user.age,
            sido_id: user.sido_id,
            gugun_id: user.gugun_id,
            phone_number: user.phone_number,
            is_valid: user.is_valid,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user: profile.user.into(),
            tag_ids: profile
                .tags
                .iter()
                .filter(|tag| tag.is_valid)
                .map(|tag| tag.tag_id)
                .collect(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/user",
    tags = ["users"],
    request_body = UserCreateRequest,
    responses(
        (status = 200, description = "Registered account", body = UserResponse),
        (status = 400, description = "Invalid email or taken address")
    )
)]
#[post("/user")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserCreateRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let payload = payload.into_inner();
    let created = state
        .users
        .register_user(
            NewUser {
                email: payload.email,
                password: payload.password,
                name: payload.name,
                nickname: payload.nickname,
                image_url: payload.image_url,
                introduction: payload.introduction,
                age: payload.age,
                sido_id: payload.sido_id,
                gugun_id: payload.gugun_id,
                phone_number: payload.phone_number,
            },
            &payload.tag_ids,
        )
        .await?;
    Ok(web::Json(created.into()))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tags = ["users"],
    params(("user_id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile with interest tags", body = UserProfileResponse),
        (status = 404, description = "User not found or removed")
    )
)]
#[get("/user/{user_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let user_id = require_positive_id(path.into_inner(), "userId")?;
    let profile = state.users.get_profile(user_id).await?;
    Ok(web::Json(profile.into()))
}

#[utoipa::path(
    get,
    path = "/user/email/{email}",
    tags = ["users"],
    params(("email" = String, Path, description = "Registered email address")),
    responses(
        (status = 200, description = "Account for the address", body = UserResponse),
        (status = 404, description = "No live account for the address")
    )
)]
#[get("/user/email/{email}")]
pub async fn get_user_by_email(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let email = path.into_inner();
    if email.trim().is_empty() {
        return Err(Error::validation_failed("email must not be empty").into());
    }
    let user = state.users.get_user_by_email(&email).await?;
    Ok(web::Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/user/{user_id}",
    tags = ["users"],
    params(("user_id" = i64, Path, description = "User identifier")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 404, description = "User not found or removed")
    )
)]
#[put("/user/{user_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UserUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = require_positive_id(path.into_inner(), "userId")?;
    let payload = payload.into_inner();
    state
        .users
        .update_user(
            UserPatch {
                id: user_id,
                name: payload.name,
                nickname: payload.nickname,
                image_url: payload.image_url,
                introduction: payload.introduction,
                age: payload.age,
                sido_id: payload.sido_id,
                gugun_id: payload.gugun_id,
                phone_number: payload.phone_number,
            },
            &payload.tag_ids,
        )
        .await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/user/{user_id}",
    tags = ["users"],
    params(("user_id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User soft-deleted"),
        (status = 404, description = "User not found or already removed")
    )
)]
#[delete("/user/{user_id}")]
pub async fn remove_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user_id = require_positive_id(path.into_inner(), "userId")?;
    state.users.remove_user(user_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    put,
    path = "/user/{user_id}/refresh-token",
    tags = ["users"],
    params(("user_id" = i64, Path, description = "User identifier")),
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token slot updated"),
        (status = 404, description = "User not found or removed")
    )
)]
#[put("/user/{user_id}/refresh-token")]
pub async fn save_refresh_token(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<RefreshTokenRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = require_positive_id(path.into_inner(), "userId")?;
    state
        .users
        .save_refresh_token(user_id, payload.into_inner().refresh_token)
        .await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}/refresh-token",
    tags = ["users"],
    params(("user_id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Current token slot", body = RefreshTokenResponse),
        (status = 404, description = "User not found or removed")
    )
)]
#[get("/user/{user_id}/refresh-token")]
pub async fn get_refresh_token(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RefreshTokenResponse>> {
    let user_id = require_positive_id(path.into_inner(), "userId")?;
    let refresh_token = state.users.refresh_token(user_id).await?;
    Ok(web::Json(RefreshTokenResponse { refresh_token }))
}

#[utoipa::path(
    post,
    path = "/follow/{follower_id}/{followee_id}",
    tags = ["user-social"],
    params(
        ("follower_id" = i64, Path, description = "Following user"),
        ("followee_id" = i64, Path, description = "Followed user")
    ),
    responses(
        (status = 200, description = "Follow recorded"),
        (status = 400, description = "Self-follow rejected"),
        (status = 409, description = "Follow already exists")
    )
)]
#[post("/follow/{follower_id}/{followee_id}")]
pub async fn follow(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (follower_id, followee_id) = path.into_inner();
    let follower_id = require_positive_id(follower_id, "followerId")?;
    let followee_id = require_positive_id(followee_id, "followeeId")?;
    state.users.follow(follower_id, followee_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/follow/{follower_id}/{followee_id}",
    tags = ["user-social"],
    params(
        ("follower_id" = i64, Path, description = "Following user"),
        ("followee_id" = i64, Path, description = "Followed user")
    ),
    responses(
        (status = 200, description = "Follow withdrawn"),
        (status = 404, description = "No live follow for the pair")
    )
)]
#[delete("/follow/{follower_id}/{followee_id}")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (follower_id, followee_id) = path.into_inner();
    let follower_id = require_positive_id(follower_id, "followerId")?;
    let followee_id = require_positive_id(followee_id, "followeeId")?;
    state.users.unfollow(follower_id, followee_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    post,
    path = "/user-eval",
    tags = ["user-social"],
    request_body = UserEvalRequest,
    responses(
        (status = 200, description = "Evaluation recorded"),
        (status = 400, description = "Score out of range or self-evaluation"),
        (status = 409, description = "Evaluation already exists")
    )
)]
#[post("/user-eval")]
pub async fn add_eval(
    state: web::Data<HttpState>,
    payload: web::Json<UserEvalRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let evaluator_id = require_positive_id(payload.evaluator_id, "evaluatorId")?;
    let evaluated_id = require_positive_id(payload.evaluated_id, "evaluatedId")?;
    state
        .users
        .add_eval(NewUserEval {
            evaluator_id,
            evaluated_id,
            score: payload.score,
            content: payload.content,
        })
        .await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/user-eval/{evaluator_id}/{evaluated_id}",
    tags = ["user-social"],
    params(
        ("evaluator_id" = i64, Path, description = "Evaluating user"),
        ("evaluated_id" = i64, Path, description = "Evaluated user")
    ),
    responses(
        (status = 200, description = "Evaluation withdrawn"),
        (status = 404, description = "No live evaluation for the pair")
    )
)]
#[delete("/user-eval/{evaluator_id}/{evaluated_id}")]
pub async fn remove_eval(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (evaluator_id, evaluated_id) = path.into_inner();
    let evaluator_id = require_positive_id(evaluator_id, "evaluatorId")?;
    let evaluated_id = require_positive_id(evaluated_id, "evaluatedId")?;
    state.users.remove_eval(evaluator_id, evaluated_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}
