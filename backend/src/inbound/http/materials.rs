//! Study material HTTP handlers.
//!
//! Create and update accept `multipart/form-data` with a JSON part named
//! `studymaterial` and an optional file part named `file`.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::json::Json as MpJson;
use actix_multipart::form::tempfile::TempFile;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, MaterialDraft, MaterialFile, StudyMaterial};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_positive_id;

/// JSON part of a material create form.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCreateMeta {
    pub study_id: i64,
    pub session_id: i64,
    pub kind: String,
    pub content: Option<String>,
}

/// JSON part of a material update form.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUpdateMeta {
    pub kind: String,
    pub content: Option<String>,
}

/// Multipart form for creating a material.
#[derive(Debug, MultipartForm)]
pub struct MaterialCreateForm {
    #[multipart(rename = "studymaterial")]
    pub meta: MpJson<MaterialCreateMeta>,
    pub file: Option<TempFile>,
}

/// Multipart form for updating a material.
#[derive(Debug, MultipartForm)]
pub struct MaterialUpdateForm {
    #[multipart(rename = "studymaterial")]
    pub meta: MpJson<MaterialUpdateMeta>,
    pub file: Option<TempFile>,
}

/// Material row as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialResponse {
    pub id: i64,
    pub study_id: i64,
    pub session_id: i64,
    pub kind: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub is_valid: bool,
    pub created_at: String,
}

impl From<StudyMaterial> for MaterialResponse {
    fn from(material: StudyMaterial) -> Self {
        Self {
            id: material.id,
            study_id: material.study_id,
            session_id: material.session_id,
            kind: material.kind,
            content: material.content,
            file_url: material.file_url,
            is_valid: material.is_valid,
            created_at: material.created_at.to_rfc3339(),
        }
    }
}

/// Pull the uploaded bytes out of the temp file actix spooled to disk.
fn read_upload(file: Option<TempFile>) -> ApiResult<Option<MaterialFile>> {
    let Some(file) = file else {
        return Ok(None);
    };
    let bytes = std::fs::read(file.file.path())
        .map_err(|err| Error::internal(format!("failed to read uploaded file: {err}")))?;
    let file_name = file.file_name.unwrap_or_else(|| "upload.bin".to_owned());
    Ok(Some(MaterialFile { bytes, file_name }))
}

#[utoipa::path(
    post,
    path = "/study-material",
    tags = ["materials"],
    responses(
        (status = 200, description = "Material created"),
        (status = 404, description = "Session not found"),
        (status = 503, description = "Blob store unreachable")
    )
)]
#[post("/study-material")]
pub async fn create_material(
    state: web::Data<HttpState>,
    form: MultipartForm<MaterialCreateForm>,
) -> ApiResult<HttpResponse> {
    let MaterialCreateForm { meta, file } = form.into_inner();
    let meta = meta.0;
    let study_id = require_positive_id(meta.study_id, "studyId")?;
    let session_id = require_positive_id(meta.session_id, "sessionId")?;
    let upload = read_upload(file)?;

    state
        .materials
        .create_material(
            study_id,
            session_id,
            MaterialDraft {
                kind: meta.kind,
                content: meta.content,
            },
            upload,
        )
        .await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    get,
    path = "/study-material/{material_id}",
    tags = ["materials"],
    params(("material_id" = i64, Path, description = "Material identifier")),
    responses(
        (status = 200, description = "Material row", body = MaterialResponse),
        (status = 404, description = "Material not found or removed")
    )
)]
#[get("/study-material/{material_id}")]
pub async fn get_material(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<MaterialResponse>> {
    let material_id = require_positive_id(path.into_inner(), "materialId")?;
    let material = state.materials.get_material(material_id).await?;
    Ok(web::Json(material.into()))
}

#[utoipa::path(
    put,
    path = "/study-material/{material_id}",
    tags = ["materials"],
    params(("material_id" = i64, Path, description = "Material identifier")),
    responses(
        (status = 200, description = "Material updated"),
        (status = 404, description = "Material not found or removed"),
        (status = 503, description = "Blob store unreachable")
    )
)]
#[put("/study-material/{material_id}")]
pub async fn update_material(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    form: MultipartForm<MaterialUpdateForm>,
) -> ApiResult<HttpResponse> {
    let material_id = require_positive_id(path.into_inner(), "materialId")?;
    let MaterialUpdateForm { meta, file } = form.into_inner();
    let meta = meta.0;
    let upload = read_upload(file)?;

    state
        .materials
        .update_material(
            material_id,
            MaterialDraft {
                kind: meta.kind,
                content: meta.content,
            },
            upload,
        )
        .await?;
    Ok(HttpResponse::Ok().body("success"))
}

#[utoipa::path(
    delete,
    path = "/study-material/{material_id}",
    tags = ["materials"],
    params(("material_id" = i64, Path, description = "Material identifier")),
    responses(
        (status = 200, description = "Material soft-deleted; the blob stays"),
        (status = 404, description = "Material not found or already removed")
    )
)]
#[delete("/study-material/{material_id}")]
pub async fn remove_material(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let material_id = require_positive_id(path.into_inner(), "materialId")?;
    state.materials.remove_material(material_id).await?;
    Ok(HttpResponse::Ok().body("success"))
}
