//! HTTP handlers for the pair rows hanging off a study.
//!
//! ```text
//! POST/DELETE /study-like/{study_id}/{user_id}
//! POST/DELETE /bookmark/{study_id}/{user_id}
//! POST        /study-eval          DELETE /study-eval/{study_id}/{user_id}
//! POST/DELETE /study-tag/{study_id}/{tag_id}
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_positive_id;

/// Request payload for evaluating a study.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyEvalRequest {
    pub study_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub content: Option<String>,
}

fn parse_pair(study_id: i64, user_id: i64, right_field: &str) -> ApiResult<(i64, i64)> {
    Ok((
        require_positive_id(study_id, "studyId")?,
        require_positive_id(user_id, right_field)?,
    ))
}

#[utoipa::path(
    post,
    path = "/study-like/{study_id}/{user_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("user_id" = i64, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Like recorded, counter incremented"),
        (status = 404, description = "Study or user not found"),
        (status = 409, description = "Like already exists")
    )
)]
#[post("/study-like/{study_id}/{user_id}")]
pub async fn add_like(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, user_id) = path.into_inner();
    let (study_id, user_id) = parse_pair(study_id, user_id, "userId")?;
    state.studies.add_like(study_id, user_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/study-like/{study_id}/{user_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("user_id" = i64, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Like withdrawn, counter decremented"),
        (status = 404, description = "No live like for the pair")
    )
)]
#[delete("/study-like/{study_id}/{user_id}")]
pub async fn remove_like(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, user_id) = path.into_inner();
    let (study_id, user_id) = parse_pair(study_id, user_id, "userId")?;
    state.studies.remove_like(study_id, user_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    post,
    path = "/bookmark/{study_id}/{user_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("user_id" = i64, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Bookmark recorded, counter incremented"),
        (status = 404, description = "Study or user not found"),
        (status = 409, description = "Bookmark already exists")
    )
)]
#[post("/bookmark/{study_id}/{user_id}")]
pub async fn add_bookmark(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, user_id) = path.into_inner();
    let (study_id, user_id) = parse_pair(study_id, user_id, "userId")?;
    state.studies.add_bookmark(study_id, user_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/bookmark/{study_id}/{user_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("user_id" = i64, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Bookmark withdrawn, counter decremented"),
        (status = 404, description = "No live bookmark for the pair")
    )
)]
#[delete("/bookmark/{study_id}/{user_id}")]
pub async fn remove_bookmark(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, user_id) = path.into_inner();
    let (study_id, user_id) = parse_pair(study_id, user_id, "userId")?;
    state.studies.remove_bookmark(study_id, user_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    post,
    path = "/study-eval",
    tags = ["study-social"],
    request_body = StudyEvalRequest,
    responses(
        (status = 200, description = "Evaluation recorded"),
        (status = 400, description = "Score out of range"),
        (status = 409, description = "Evaluation already exists")
    )
)]
#[post("/study-eval")]
pub async fn add_eval(
    state: web::Data<HttpState>,
    payload: web::Json<StudyEvalRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let (study_id, user_id) = parse_pair(payload.study_id, payload.user_id, "userId")?;
    state
        .studies
        .add_eval(study_id, user_id, payload.score, payload.content)
        .await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/study-eval/{study_id}/{user_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("user_id" = i64, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Evaluation withdrawn"),
        (status = 404, description = "No live evaluation for the pair")
    )
)]
#[delete("/study-eval/{study_id}/{user_id}")]
pub async fn remove_eval(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, user_id) = path.into_inner();
    let (study_id, user_id) = parse_pair(study_id, user_id, "userId")?;
    state.studies.remove_eval(study_id, user_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    post,
    path = "/study-tag/{study_id}/{tag_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("tag_id" = i64, Path, description = "Tag identifier")
    ),
    responses(
        (status = 200, description = "Tag attached"),
        (status = 409, description = "Tag already attached")
    )
)]
#[post("/study-tag/{study_id}/{tag_id}")]
pub async fn add_tag(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, tag_id) = path.into_inner();
    let (study_id, tag_id) = parse_pair(study_id, tag_id, "tagId")?;
    state.studies.add_tag(study_id, tag_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/study-tag/{study_id}/{tag_id}",
    tags = ["study-social"],
    params(
        ("study_id" = i64, Path, description = "Study identifier"),
        ("tag_id" = i64, Path, description = "Tag identifier")
    ),
    responses(
        (status = 200, description = "Tag detached"),
        (status = 404, description = "No live tag attachment for the pair")
    )
)]
#[delete("/study-tag/{study_id}/{tag_id}")]
pub async fn remove_tag(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (study_id, tag_id) = path.into_inner();
    let (study_id, tag_id) = parse_pair(study_id, tag_id, "tagId")?;
    state.studies.remove_tag(study_id, tag_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}
