//! End-to-end tests over the HTTP layer with in-memory ports.

mod support;

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use chrono::Utc;

use lighthouse_backend::domain::ports::FixtureBlobStore;
use lighthouse_backend::domain::{StudyNotice, StudyTag};
use lighthouse_backend::inbound::http::state::{HttpState, HttpStatePorts};
use lighthouse_backend::inbound::http::{health, materials, studies, study_social, users};

use support::InMemoryBackend;

fn app(
    backend: &InMemoryBackend,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let ports = HttpStatePorts {
        study_repo: Arc::new(backend.clone()),
        study_social_repo: Arc::new(backend.clone()),
        material_repo: Arc::new(backend.clone()),
        user_repo: Arc::new(backend.clone()),
        user_social_repo: Arc::new(backend.clone()),
        blob_store: Arc::new(FixtureBlobStore),
    };

    App::new()
        .app_data(web::Data::new(HttpState::new(ports)))
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
        .service(health::live)
}

#[actix_web::test]
async fn liveness_probe_responds() {
    let backend = InMemoryBackend::new();
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn create_study_returns_the_persisted_tree() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/study")
            .set_json(json!({
                "title": "rust reading group",
                "description": "weekly chapters",
                "isOnline": true,
                "leaderId": leader_id,
                "tagIds": [10, 20],
                "sessions": [
                    {"seqNum": 1, "title": "chapter one"},
                    {"seqNum": 2, "title": "chapter two"}
                ],
                "notices": [{"content": "first meeting friday"}]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["title"], "rust reading group");
    assert_eq!(body["status"], "preparing");
    assert_eq!(body["leaderId"], leader_id);
    assert_eq!(body["likeCnt"], 0);
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["sessions"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["notices"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn blank_title_is_rejected() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/study")
            .set_json(json!({"title": "   ", "leaderId": leader_id}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "validation_failed");
}

#[actix_web::test]
async fn missing_study_maps_to_not_found() {
    let backend = InMemoryBackend::new();
    let app = test::init_service(app(&backend)).await;

    let res =
        test::call_service(&app, test::TestRequest::get().uri("/study/999").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "not_found");
}

#[actix_web::test]
async fn study_detail_carries_the_leader_account() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let study_id = backend.seed_study("lead by example", leader_id);
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/study/{study_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["leader"]["id"], leader_id);
    assert_eq!(body["leader"]["nickname"], "leader");
    assert!(body["leader"].get("refreshToken").is_none());
}

#[actix_web::test]
async fn detail_reads_exclude_soft_deleted_children() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let study_id = backend.seed_study("pruned", leader_id);
    let kept_session = backend.seed_session(study_id, "kept");
    let dropped_session = backend.seed_session(study_id, "dropped");
    {
        let mut world = backend.world();
        let detail = world
            .studies
            .iter_mut()
            .find(|detail| detail.study.id == study_id)
            .expect("seeded study");
        detail
            .sessions
            .iter_mut()
            .find(|entry| entry.session.id == dropped_session)
            .expect("seeded session")
            .session
            .is_valid = false;
        detail.tags.push(StudyTag {
            id: 800,
            study_id,
            tag_id: 100,
            is_valid: false,
            created_at: Utc::now(),
        });
        detail.notices.push(StudyNotice {
            id: 801,
            study_id,
            content: "withdrawn".to_owned(),
            is_valid: false,
            created_at: Utc::now(),
        });
    }
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/study/{study_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    let sessions = body["sessions"].as_array().expect("sessions array");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], kept_session);
    assert_eq!(sessions[0]["title"], "kept");
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["notices"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn removed_study_disappears_from_reads() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let study_id = backend.seed_study("ephemeral", leader_id);
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/study/{study_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(test::read_body(res).await, "success");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/study/{study_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn sharing_twice_stays_successful() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let study_id = backend.seed_study("shared", leader_id);
    let app = test::init_service(app(&backend)).await;

    for _ in 0..2 {
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/study/{study_id}/share"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert!(backend.world().studies[0].study.is_shared);
}

#[actix_web::test]
async fn clone_resets_lifecycle_and_links_back() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let new_leader_id = backend.seed_user("fork@example.com", "fork");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/study")
            .set_json(json!({
                "title": "original",
                "leaderId": leader_id,
                "sessions": [{"seqNum": 1, "title": "intro"}]
            }))
            .to_request(),
    )
    .await;
    let created: Value = test::read_body_json(res).await;
    let study_id = created["id"].as_i64().expect("study id");

    // Some social state on the source that must not carry over.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/study-like/{study_id}/{new_leader_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/study/{study_id}/clone"))
            .set_json(json!({"leaderId": new_leader_id}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let clone: Value = test::read_body_json(res).await;
    assert_ne!(clone["id"], created["id"]);
    assert_eq!(clone["originalId"], study_id);
    assert_eq!(clone["leaderId"], new_leader_id);
    assert_eq!(clone["status"], "preparing");
    assert_eq!(clone["likeCnt"], 0);
    assert_eq!(clone["isShared"], false);
    assert_eq!(clone["sessions"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn duplicate_like_conflicts() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let fan_id = backend.seed_user("fan@example.com", "fan");
    let study_id = backend.seed_study("popular", leader_id);
    let app = test::init_service(app(&backend)).await;

    let uri = format!("/study-like/{study_id}/{fan_id}");
    let res = test::call_service(&app, test::TestRequest::post().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, test::TestRequest::post().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "duplicate_pair");
}

#[actix_web::test]
async fn bookmark_routes_round_trip() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let reader_id = backend.seed_user("reader@example.com", "reader");
    let study_id = backend.seed_study("saved for later", leader_id);
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/bookmark/{study_id}/{reader_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(backend.world().studies[0].study.bookmark_cnt, 1);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/bookmark/{study_id}/{reader_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(test::read_body(res).await, "success");
    assert_eq!(backend.world().studies[0].study.bookmark_cnt, 0);
}

#[actix_web::test]
async fn removing_an_absent_like_maps_to_missing_pair() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let fan_id = backend.seed_user("fan@example.com", "fan");
    let study_id = backend.seed_study("quiet", leader_id);
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/study-like/{study_id}/{fan_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "missing_pair");
}

#[actix_web::test]
async fn out_of_range_eval_score_is_rejected() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let member_id = backend.seed_user("member@example.com", "member");
    let study_id = backend.seed_study("rated", leader_id);
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/study-eval")
            .set_json(json!({
                "studyId": study_id,
                "userId": member_id,
                "score": 6,
                "content": "too enthusiastic"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "validation_failed");
}

#[actix_web::test]
async fn search_pages_through_live_studies() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    backend.seed_study("first", leader_id);
    backend.seed_study("second", leader_id);
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/study?size=1").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["total"], 2);
    assert_eq!(body["size"], 1);
}

#[actix_web::test]
async fn oversized_page_request_is_rejected() {
    let backend = InMemoryBackend::new();
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/study?size=500").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_email_registration_is_rejected() {
    let backend = InMemoryBackend::new();
    let app = test::init_service(app(&backend)).await;

    let payload = json!({
        "email": "dup@example.com",
        "password": "pw-1234",
        "name": "First Registrant",
        "nickname": "first"
    });
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/user")
            .set_json(&payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/user")
            .set_json(&payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "validation_failed");
}

#[actix_web::test]
async fn profile_scalars_survive_register_and_update() {
    let backend = InMemoryBackend::new();
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/user")
            .set_json(json!({
                "email": "haeun@example.com",
                "password": "pw-5678",
                "name": "Kim Haeun",
                "nickname": "haeun",
                "age": 29,
                "sidoId": 5,
                "gugunId": 21,
                "phoneNumber": "010-1234-5678",
                "tagIds": [100]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let user_id = body["id"].as_i64().expect("created id");
    assert_eq!(body["name"], "Kim Haeun");
    assert_eq!(body["age"], 29);
    assert_eq!(body["sidoId"], 5);
    assert_eq!(body["gugunId"], 21);
    assert_eq!(body["phoneNumber"], "010-1234-5678");
    assert!(body.get("password").is_none());

    // The patch carries the full profile state; an omitted optional clears.
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/user/{user_id}"))
            .set_json(json!({
                "name": "Kim Ha-eun",
                "nickname": "haeun",
                "age": 30,
                "sidoId": 5,
                "gugunId": 21,
                "tagIds": [100]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/user/{user_id}"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["name"], "Kim Ha-eun");
    assert_eq!(body["age"], 30);
    assert_eq!(body["email"], "haeun@example.com");
    assert_eq!(body["sidoId"], 5);
    assert_eq!(body["phoneNumber"], Value::Null);
    assert_eq!(body["tagIds"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn user_response_never_leaks_the_refresh_token() {
    let backend = InMemoryBackend::new();
    let user_id = backend.seed_user("member@example.com", "member");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/user/{user_id}/refresh-token"))
            .set_json(json!({"refreshToken": "opaque-token"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/user/{user_id}"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert!(body.get("refreshToken").is_none());
    assert!(body.get("password").is_none());
    assert_eq!(body["email"], "member@example.com");

    // The slot itself is readable through its own endpoint.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/user/{user_id}/refresh-token"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["refreshToken"], "opaque-token");
}

#[actix_web::test]
async fn email_lookup_finds_the_live_account() {
    let backend = InMemoryBackend::new();
    let user_id = backend.seed_user("finder@example.com", "finder");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/user/email/finder@example.com")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["id"], user_id);
    assert_eq!(body["nickname"], "finder");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/user/email/stranger@example.com")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn self_follow_is_rejected() {
    let backend = InMemoryBackend::new();
    let user_id = backend.seed_user("loner@example.com", "loner");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/follow/{user_id}/{user_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn material_upload_stores_the_blob_url() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let study_id = backend.seed_study("hands-on", leader_id);
    let session_id = backend.seed_session(study_id, "workshop");
    let app = test::init_service(app(&backend)).await;

    let boundary = "3ba8ba2ad41c4c4f8b1cbdb271e42f1b";
    let meta = json!({
        "studyId": study_id,
        "sessionId": session_id,
        "kind": "slides",
        "content": "week one deck"
    });
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"studymaterial\"\r\n\
         Content-Type: application/json\r\n\r\n\
         {meta}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"deck.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         not really a pdf\r\n\
         --{boundary}--\r\n"
    );

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/study-material")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(test::read_body(res).await, "success");

    let stored = backend.world().materials[0].clone();
    assert_eq!(stored.kind, "slides");
    assert_eq!(
        stored.file_url.as_deref(),
        Some("https://blobs.invalid/deck.pdf")
    );
}

#[actix_web::test]
async fn material_soft_delete_keeps_the_row() {
    let backend = InMemoryBackend::new();
    let leader_id = backend.seed_user("leader@example.com", "leader");
    let study_id = backend.seed_study("hands-on", leader_id);
    let session_id = backend.seed_session(study_id, "workshop");
    let material_id = backend.seed_material(study_id, session_id, "notes");
    let app = test::init_service(app(&backend)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/study-material/{material_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let world = backend.world();
    assert_eq!(world.materials.len(), 1);
    assert!(!world.materials[0].is_valid);
}
