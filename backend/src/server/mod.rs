//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::{health, materials, studies, study_social, users};
use crate::middleware::RequestId;
use crate::outbound::blob::HttpBlobStore;
use crate::outbound::persistence::{
    DieselMaterialRepository, DieselStudyRepository, DieselStudySocialRepository,
    DieselUserRepository, DieselUserSocialRepository,
};

/// Wire the Diesel and blob adapters into the handler state.
fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let blob_store = HttpBlobStore::new(config.blob_store.clone())
        .map_err(|err| std::io::Error::other(format!("blob store client: {err}")))?;

    let ports = HttpStatePorts {
        study_repo: Arc::new(DieselStudyRepository::new(config.db_pool.clone())),
        study_social_repo: Arc::new(DieselStudySocialRepository::new(config.db_pool.clone())),
        material_repo: Arc::new(DieselMaterialRepository::new(config.db_pool.clone())),
        user_repo: Arc::new(DieselUserRepository::new(config.db_pool.clone())),
        user_social_repo: Arc::new(DieselUserSocialRepository::new(config.db_pool.clone())),
        blob_store: Arc::new(blob_store),
    };

    Ok(web::Data::new(HttpState::new(ports)))
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(http_state)
        .wrap(RequestId)
        .service(studies::search_studies)
        .service(studies::create_study)
        .service(studies::get_study)
        .service(studies::update_study)
        .service(studies::remove_study)
        .service(studies::share_study)
        .service(studies::clone_study)
        .service(study_social::add_like)
        .service(study_social::remove_like)
        .service(study_social::add_bookmark)
        .service(study_social::remove_bookmark)
        .service(study_social::add_eval)
        .service(study_social::remove_eval)
        .service(study_social::add_tag)
        .service(study_social::remove_tag)
        .service(materials::create_material)
        .service(materials::get_material)
        .service(materials::update_material)
        .service(materials::remove_material)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::get_user_by_email)
        .service(users::update_user)
        .service(users::remove_user)
        .service(users::save_refresh_token)
        .service(users::get_refresh_token)
        .service(users::follow)
        .service(users::unfollow)
        .service(users::add_eval)
        .service(users::remove_eval)
        .service(health::live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when building the blob store client or
/// binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(bind_addr)?
        .run();

    Ok(server)
}
