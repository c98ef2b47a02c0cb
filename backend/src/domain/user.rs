//! User entities and the user-side pair rows.

use chrono::{DateTime, Utc};

/// An account on the platform. `password` and `refresh_token` are held for
/// the auth layer that sits in front of this service and never serialised
/// out.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub introduction: Option<String>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<String>,
    pub refresh_token: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Soft-delete the account.
    pub fn remove(&mut self) {
        self.is_valid = false;
    }
}

/// Fields required to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub introduction: Option<String>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<String>,
}

/// Profile field changes carried by an update request. Email and password
/// are not updatable through the profile path.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPatch {
    pub id: i64,
    pub name: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub introduction: Option<String>,
    pub age: Option<i32>,
    pub sido_id: Option<i64>,
    pub gugun_id: Option<i64>,
    pub phone_number: Option<String>,
}

/// Interest tag attached to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTag {
    pub id: i64,
    pub user_id: i64,
    pub tag_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with their interest tags.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub tags: Vec<UserTag>,
}

/// Follow pair row; unique per `(follower_id, followee_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub followee_id: i64,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Peer evaluation of a user; unique per `(evaluator_id, evaluated_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserEval {
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluated_id: i64,
    pub score: i32,
    pub content: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to record a peer evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserEval {
    pub evaluator_id: i64,
    pub evaluated_id: i64,
    pub score: i32,
    pub content: Option<String>,
}
