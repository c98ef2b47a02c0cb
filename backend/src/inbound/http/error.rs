//! HTTP error payloads and mapping from domain errors.
//!
//! The domain stays free of transport concerns; translating [`Error`] into
//! Actix responses happens here.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorKind};

/// Standard error envelope returned by HTTP handlers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[schema(example = "not_found")]
    kind: ErrorKind,
    #[schema(example = "study 42 not found")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    fn to_status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound | ErrorKind::MissingPair => StatusCode::NOT_FOUND,
            ErrorKind::DuplicatePair => StatusCode::CONFLICT,
            ErrorKind::Infrastructure => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.message().to_owned(),
            details: error.details().cloned(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        // Internal failure messages may carry SQL or pool detail; clients get
        // a fixed message while the original lands in the log.
        if matches!(self.kind, ErrorKind::Internal) {
            error!(message = %self.message, "internal error returned to client");
            let redacted = ApiError {
                kind: ErrorKind::Internal,
                message: "internal server error".to_owned(),
                details: None,
            };
            return HttpResponse::build(self.status_code()).json(redacted);
        }
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
