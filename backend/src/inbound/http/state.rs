//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and only see domain
//! services over trait-object ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BlobStore, MaterialRepository, StudyRepository, StudySocialRepository, UserRepository,
    UserSocialRepository,
};
use crate::domain::{MaterialService, StudyService, UserService};

/// Study service wired with trait-object ports.
pub type DynStudyService =
    StudyService<dyn StudyRepository, dyn StudySocialRepository, dyn UserRepository>;
/// Material service wired with trait-object ports.
pub type DynMaterialService = MaterialService<dyn MaterialRepository, dyn BlobStore>;
/// User service wired with trait-object ports.
pub type DynUserService = UserService<dyn UserRepository, dyn UserSocialRepository>;

/// Parameter object bundling the port implementations handlers depend on.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub study_repo: Arc<dyn StudyRepository>,
    pub study_social_repo: Arc<dyn StudySocialRepository>,
    pub material_repo: Arc<dyn MaterialRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub user_social_repo: Arc<dyn UserSocialRepository>,
    pub blob_store: Arc<dyn BlobStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub studies: DynStudyService,
    pub materials: DynMaterialService,
    pub users: DynUserService,
}

impl HttpState {
    /// Construct the state by wiring the services from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self {
            studies: StudyService::new(
                Arc::clone(&ports.study_repo),
                Arc::clone(&ports.study_social_repo),
                Arc::clone(&ports.user_repo),
            ),
            materials: MaterialService::new(
                Arc::clone(&ports.material_repo),
                Arc::clone(&ports.blob_store),
            ),
            users: UserService::new(
                Arc::clone(&ports.user_repo),
                Arc::clone(&ports.user_social_repo),
            ),
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
