//! Domain ports for the hexagonal boundary.

mod blob_store;
mod material_repository;
mod study_repository;
mod study_social_repository;
mod user_repository;
mod user_social_repository;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use material_repository::MockMaterialRepository;
pub use material_repository::{
    MaterialRecordPatch, MaterialRepository, MaterialRepositoryError, NewMaterialRecord,
};
#[cfg(test)]
pub use study_repository::MockStudyRepository;
pub use study_repository::{StudyRepository, StudyRepositoryError};
#[cfg(test)]
pub use study_social_repository::MockStudySocialRepository;
pub use study_social_repository::{
    NewStudyEval, StudySocialRepository, StudySocialRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use user_social_repository::MockUserSocialRepository;
pub use user_social_repository::{UserSocialRepository, UserSocialRepositoryError};
