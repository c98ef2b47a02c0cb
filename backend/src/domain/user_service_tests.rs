//! Tests for the user service.

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;

use super::*;
use crate::domain::ErrorKind;
use crate::domain::ports::{MockUserRepository, MockUserSocialRepository};

fn live_user(id: i64) -> User {
    User {
        id,
        password: "secret".to_owned(),
        name: format!("User {id}"),
        age: None,
        sido_id: None,
        gugun_id: None,
        phone_number: None,
        email: format!("user{id}@example.com"),
        nickname: format!("user-{id}"),
        image_url: None,
        introduction: None,
        refresh_token: None,
        is_valid: true,
        created_at: Utc::now(),
    }
}

fn registration() -> NewUser {
    NewUser {
        email: "ada@example.com".to_owned(),
        password: "n0te5".to_owned(),
        name: "Ada Lovelace".to_owned(),
        nickname: "ada".to_owned(),
        image_url: None,
        introduction: Some("fp and graphs".to_owned()),
        age: Some(36),
        sido_id: Some(1),
        gugun_id: Some(11),
        phone_number: Some("010-0000-0000".to_owned()),
    }
}

fn service(
    user_repo: MockUserRepository,
    social_repo: MockUserSocialRepository,
) -> UserService<MockUserRepository, MockUserSocialRepository> {
    UserService::new(Arc::new(user_repo), Arc::new(social_repo))
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let mut user_repo = MockUserRepository::new();
    user_repo.expect_insert().times(0);

    let svc = service(user_repo, MockUserSocialRepository::new());
    let mut request = registration();
    request.email = "not-an-address".to_owned();
    let error = svc
        .register_user(request, &[])
        .await
        .expect_err("invalid email");

    assert_eq!(error.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn register_rejects_empty_password() {
    let mut user_repo = MockUserRepository::new();
    user_repo.expect_insert().times(0);

    let svc = service(user_repo, MockUserSocialRepository::new());
    let mut request = registration();
    request.password = String::new();
    let error = svc
        .register_user(request, &[])
        .await
        .expect_err("empty password");

    assert_eq!(error.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut user_repo = MockUserRepository::new();
    user_repo
        .expect_find_by_email()
        .with(eq("ada@example.com"))
        .times(1)
        .return_once(|_| Ok(Some(live_user(3))));
    user_repo.expect_insert().times(0);

    let svc = service(user_repo, MockUserSocialRepository::new());
    let error = svc
        .register_user(registration(), &[])
        .await
        .expect_err("email taken");

    assert_eq!(error.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn register_inserts_user_with_tags() {
    let mut user_repo = MockUserRepository::new();
    user_repo
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    user_repo
        .expect_insert()
        .withf(|user, tag_ids| {
            user.nickname == "ada"
                && user.name == "Ada Lovelace"
                && user.age == Some(36)
                && user.sido_id == Some(1)
                && user.gugun_id == Some(11)
                && user.phone_number.as_deref() == Some("010-0000-0000")
                && *tag_ids == [100, 101]
        })
        .times(1)
        .return_once(|_, _| Ok(live_user(9)));

    let svc = service(user_repo, MockUserSocialRepository::new());
    let created = svc
        .register_user(registration(), &[100, 101])
        .await
        .expect("register succeeds");

    assert_eq!(created.id, 9);
}

#[tokio::test]
async fn get_user_hides_soft_deleted_accounts() {
    let mut user_repo = MockUserRepository::new();
    user_repo.expect_find_by_id().times(1).return_once(|id| {
        let mut user = live_user(id);
        user.is_valid = false;
        Ok(Some(user))
    });

    let svc = service(user_repo, MockUserSocialRepository::new());
    let error = svc.get_user(3).await.expect_err("soft-deleted is hidden");

    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn follow_rejects_self_follow() {
    let mut social_repo = MockUserSocialRepository::new();
    social_repo.expect_insert_follow().times(0);

    let svc = service(MockUserRepository::new(), social_repo);
    let error = svc.follow(4, 4).await.expect_err("self follow");

    assert_eq!(error.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn follow_maps_duplicate_to_duplicate_pair() {
    let mut user_repo = MockUserRepository::new();
    user_repo
        .expect_find_by_id()
        .times(2)
        .returning(|id| Ok(Some(live_user(id))));

    let mut social_repo = MockUserSocialRepository::new();
    social_repo
        .expect_insert_follow()
        .with(eq(4), eq(5))
        .times(1)
        .return_once(|a, b| Err(UserSocialRepositoryError::duplicate(a, b)));

    let svc = service(user_repo, social_repo);
    let error = svc.follow(4, 5).await.expect_err("duplicate follow");

    assert_eq!(error.kind(), ErrorKind::DuplicatePair);
}

#[tokio::test]
async fn unfollow_maps_absent_pair_to_missing_pair() {
    let mut social_repo = MockUserSocialRepository::new();
    social_repo
        .expect_remove_follow()
        .times(1)
        .return_once(|_, _| Ok(false));

    let svc = service(MockUserRepository::new(), social_repo);
    let error = svc.unfollow(4, 5).await.expect_err("absent pair");

    assert_eq!(error.kind(), ErrorKind::MissingPair);
}

#[tokio::test]
async fn add_eval_rejects_self_evaluation() {
    let svc = service(MockUserRepository::new(), MockUserSocialRepository::new());
    let error = svc
        .add_eval(NewUserEval {
            evaluator_id: 4,
            evaluated_id: 4,
            score: 5,
            content: None,
        })
        .await
        .expect_err("self evaluation");

    assert_eq!(error.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn add_eval_rejects_out_of_range_score() {
    let svc = service(MockUserRepository::new(), MockUserSocialRepository::new());
    let error = svc
        .add_eval(NewUserEval {
            evaluator_id: 4,
            evaluated_id: 5,
            score: 0,
            content: None,
        })
        .await
        .expect_err("score out of range");

    assert_eq!(error.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn add_eval_inserts_the_pair_row() {
    let mut user_repo = MockUserRepository::new();
    user_repo
        .expect_find_by_id()
        .times(2)
        .returning(|id| Ok(Some(live_user(id))));

    let mut social_repo = MockUserSocialRepository::new();
    social_repo.expect_insert_eval().times(1).return_once(|eval| {
        Ok(UserEval {
            id: 21,
            evaluator_id: eval.evaluator_id,
            evaluated_id: eval.evaluated_id,
            score: eval.score,
            content: eval.content.clone(),
            is_valid: true,
            created_at: Utc::now(),
        })
    });

    let svc = service(user_repo, social_repo);
    let eval = svc
        .add_eval(NewUserEval {
            evaluator_id: 4,
            evaluated_id: 5,
            score: 4,
            content: Some("great moderator".to_owned()),
        })
        .await
        .expect("eval succeeds");

    assert_eq!((eval.evaluator_id, eval.evaluated_id, eval.score), (4, 5, 4));
}

#[tokio::test]
async fn save_refresh_token_maps_missing_user_to_not_found() {
    let mut user_repo = MockUserRepository::new();
    user_repo
        .expect_save_refresh_token()
        .with(eq(3), eq(Some("token".to_owned())))
        .times(1)
        .return_once(|_, _| Ok(false));

    let svc = service(user_repo, MockUserSocialRepository::new());
    let error = svc
        .save_refresh_token(3, Some("token".to_owned()))
        .await
        .expect_err("missing user");

    assert_eq!(error.kind(), ErrorKind::NotFound);
}
