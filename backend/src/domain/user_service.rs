//! User domain services: accounts, follows and peer evaluations.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{
    UserRepository, UserRepositoryError, UserSocialRepository, UserSocialRepositoryError,
};
use crate::domain::study_service::{EVAL_SCORE_MAX, EVAL_SCORE_MIN};
use crate::domain::{Error, Follow, NewUser, NewUserEval, User, UserEval, UserPatch, UserProfile};

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::infrastructure(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::validation_failed(format!("email {email} is already registered"))
        }
    }
}

fn map_social_repo_error(error: UserSocialRepositoryError, pair: &str) -> Error {
    match error {
        UserSocialRepositoryError::Connection { message } => {
            Error::infrastructure(format!("user social repository unavailable: {message}"))
        }
        UserSocialRepositoryError::Query { message } => {
            Error::internal(format!("user social repository error: {message}"))
        }
        UserSocialRepositoryError::Duplicate { left_id, right_id } => Error::duplicate_pair(
            format!("{pair} already exists for users {left_id} and {right_id}"),
        ),
        UserSocialRepositoryError::UserMissing { user_id } => {
            Error::not_found(format!("user {user_id} not found"))
        }
    }
}

/// Service for accounts and the pair rows between users.
pub struct UserService<U: ?Sized, S: ?Sized> {
    user_repo: Arc<U>,
    social_repo: Arc<S>,
}

impl<U: ?Sized, S: ?Sized> Clone for UserService<U, S> {
    fn clone(&self) -> Self {
        Self {
            user_repo: Arc::clone(&self.user_repo),
            social_repo: Arc::clone(&self.social_repo),
        }
    }
}

impl<U: ?Sized, S: ?Sized> UserService<U, S> {
    /// Create the service with its repositories.
    pub fn new(user_repo: Arc<U>, social_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            social_repo,
        }
    }
}

impl<U, S> UserService<U, S>
where
    U: UserRepository + ?Sized,
    S: UserSocialRepository + ?Sized,
{
    async fn require_live_user(&self, user_id: i64) -> Result<User, Error> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?;
        match user {
            Some(user) if user.is_valid => Ok(user),
            _ => Err(Error::not_found(format!("user {user_id} not found"))),
        }
    }

    /// Register a new account with its interest tags.
    pub async fn register_user(&self, user: NewUser, tag_ids: &[i64]) -> Result<User, Error> {
        if user.email.trim().is_empty() || !user.email.contains('@') {
            return Err(Error::validation_failed("email address is invalid"));
        }
        if user.password.is_empty() {
            return Err(Error::validation_failed("password must not be empty"));
        }
        if user.nickname.trim().is_empty() {
            return Err(Error::validation_failed("nickname must not be empty"));
        }
        let existing = self
            .user_repo
            .find_by_email(&user.email)
            .await
            .map_err(map_user_repo_error)?;
        if existing.is_some() {
            return Err(Error::validation_failed(format!(
                "email {} is already registered",
                user.email
            )));
        }

        let created = self
            .user_repo
            .insert(&user, tag_ids)
            .await
            .map_err(map_user_repo_error)?;
        info!(user_id = created.id, "user registered");
        Ok(created)
    }

    /// Fetch a live account.
    pub async fn get_user(&self, user_id: i64) -> Result<User, Error> {
        self.require_live_user(user_id).await
    }

    /// Look up a live account by its email address.
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, Error> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(map_user_repo_error)?;
        user.ok_or_else(|| Error::not_found(format!("no account registered for {email}")))
    }

    /// Load a live account with its interest tags.
    pub async fn get_profile(&self, user_id: i64) -> Result<UserProfile, Error> {
        let profile = self
            .user_repo
            .find_profile(user_id)
            .await
            .map_err(map_user_repo_error)?;
        profile.ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    /// Update profile fields and replace the interest tags.
    pub async fn update_user(&self, patch: UserPatch, tag_ids: &[i64]) -> Result<(), Error> {
        if patch.nickname.trim().is_empty() {
            return Err(Error::validation_failed("nickname must not be empty"));
        }
        let updated = self
            .user_repo
            .update(&patch, tag_ids)
            .await
            .map_err(map_user_repo_error)?;
        if !updated {
            return Err(Error::not_found(format!("user {} not found", patch.id)));
        }
        Ok(())
    }

    /// Soft-delete an account.
    pub async fn remove_user(&self, user_id: i64) -> Result<(), Error> {
        let removed = self
            .user_repo
            .mark_removed(user_id)
            .await
            .map_err(map_user_repo_error)?;
        if !removed {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        info!(user_id, "user removed");
        Ok(())
    }

    /// Store or clear the refresh token slot.
    pub async fn save_refresh_token(
        &self,
        user_id: i64,
        token: Option<String>,
    ) -> Result<(), Error> {
        let saved = self
            .user_repo
            .save_refresh_token(user_id, token)
            .await
            .map_err(map_user_repo_error)?;
        if !saved {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        Ok(())
    }

    /// Read the current refresh token, if one is stored.
    pub async fn refresh_token(&self, user_id: i64) -> Result<Option<String>, Error> {
        let user = self.require_live_user(user_id).await?;
        Ok(user.refresh_token)
    }

    /// Follow another user.
    pub async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<Follow, Error> {
        if follower_id == followee_id {
            return Err(Error::validation_failed("users cannot follow themselves"));
        }
        self.require_live_user(follower_id).await?;
        self.require_live_user(followee_id).await?;
        self.social_repo
            .insert_follow(follower_id, followee_id)
            .await
            .map_err(|err| map_social_repo_error(err, "follow"))
    }

    /// Withdraw a follow.
    pub async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<(), Error> {
        let removed = self
            .social_repo
            .remove_follow(follower_id, followee_id)
            .await
            .map_err(|err| map_social_repo_error(err, "follow"))?;
        if !removed {
            return Err(Error::missing_pair(format!(
                "user {follower_id} does not follow user {followee_id}"
            )));
        }
        Ok(())
    }

    /// Record a peer evaluation.
    pub async fn add_eval(&self, eval: NewUserEval) -> Result<UserEval, Error> {
        if eval.evaluator_id == eval.evaluated_id {
            return Err(Error::validation_failed("users cannot evaluate themselves"));
        }
        if !(EVAL_SCORE_MIN..=EVAL_SCORE_MAX).contains(&eval.score) {
            return Err(Error::validation_failed(format!(
                "score must be between {EVAL_SCORE_MIN} and {EVAL_SCORE_MAX}"
            )));
        }
        self.require_live_user(eval.evaluator_id).await?;
        self.require_live_user(eval.evaluated_id).await?;
        self.social_repo
            .insert_eval(&eval)
            .await
            .map_err(|err| map_social_repo_error(err, "evaluation"))
    }

    /// Withdraw a peer evaluation.
    pub async fn remove_eval(&self, evaluator_id: i64, evaluated_id: i64) -> Result<(), Error> {
        let removed = self
            .social_repo
            .remove_eval(evaluator_id, evaluated_id)
            .await
            .map_err(|err| map_social_repo_error(err, "evaluation"))?;
        if !removed {
            return Err(Error::missing_pair(format!(
                "no evaluation found by user {evaluator_id} of user {evaluated_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
