//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod health;
pub mod materials;
pub mod state;
pub mod studies;
pub mod study_social;
pub mod users;
pub mod validation;

pub use error::{ApiError, ApiResult};
