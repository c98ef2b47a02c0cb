//! Diesel-backed persistence adapters for the repository ports.

mod diesel_error_mapping;
mod diesel_material_repository;
mod diesel_study_repository;
mod diesel_study_social_repository;
mod diesel_user_repository;
mod diesel_user_social_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_material_repository::DieselMaterialRepository;
pub use diesel_study_repository::DieselStudyRepository;
pub use diesel_study_social_repository::DieselStudySocialRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_user_social_repository::DieselUserSocialRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
