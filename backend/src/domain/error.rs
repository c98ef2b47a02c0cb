//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the domain only cares about the stable kind and the message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable kind describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request is malformed or fails validation.
    ValidationFailed,
    /// The requested entity does not exist or is soft-deleted.
    NotFound,
    /// A pair row with the same composite natural key already exists.
    DuplicatePair,
    /// The pair row addressed by a remove operation is absent or soft-deleted.
    MissingPair,
    /// The database or the blob store is unreachable; the client may retry.
    Infrastructure,
    /// An unexpected error occurred inside the domain.
    Internal,
}

/// Domain error payload carried from services to adapters.
///
/// Serialises as the `{kind, message}` envelope; `details` is attached only
/// when a handler or service adds structured context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "not_found")]
    kind: ErrorKind,
    #[schema(example = "study 42 not found")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorKind::ValidationFailed`].
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailed, message)
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Convenience constructor for [`ErrorKind::DuplicatePair`].
    pub fn duplicate_pair(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicatePair, message)
    }

    /// Convenience constructor for [`ErrorKind::MissingPair`].
    pub fn missing_pair(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingPair, message)
    }

    /// Convenience constructor for [`ErrorKind::Infrastructure`].
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Infrastructure, message)
    }

    /// Convenience constructor for [`ErrorKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
