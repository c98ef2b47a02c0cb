//! Study domain services.
//!
//! Orchestrates the study aggregate and its pair rows. Services perform
//! reads and validation up front and delegate exactly one atomic mutation to
//! a repository port, so failure anywhere leaves no partial write behind.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{
    NewStudyEval, StudyRepository, StudyRepositoryError, StudySocialRepository,
    StudySocialRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Bookmark, Error, NewStudyTree, Page, StudyDetail, StudyEval, StudyLike, StudySearchOptions,
    StudySummary, StudyTag, StudyUpdateTree, StudyView,
};

/// Evaluation scores are a five-point scale.
pub const EVAL_SCORE_MIN: i32 = 1;
pub const EVAL_SCORE_MAX: i32 = 5;

/// Search pages are capped so one request cannot drag the whole table.
pub const SEARCH_SIZE_MAX: u32 = 100;

fn map_study_repo_error(error: StudyRepositoryError) -> Error {
    match error {
        StudyRepositoryError::Connection { message } => {
            Error::infrastructure(format!("study repository unavailable: {message}"))
        }
        StudyRepositoryError::Query { message } => {
            Error::internal(format!("study repository error: {message}"))
        }
    }
}

fn map_social_repo_error(error: StudySocialRepositoryError, pair: &str) -> Error {
    match error {
        StudySocialRepositoryError::Connection { message } => {
            Error::infrastructure(format!("study social repository unavailable: {message}"))
        }
        StudySocialRepositoryError::Query { message } => {
            Error::internal(format!("study social repository error: {message}"))
        }
        StudySocialRepositoryError::Duplicate { study_id, user_id } => Error::duplicate_pair(
            format!("{pair} already exists for study {study_id} and user {user_id}"),
        ),
        StudySocialRepositoryError::StudyMissing { study_id } => {
            Error::not_found(format!("study {study_id} not found"))
        }
    }
}

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

/// Service for the study aggregate and its pair rows.
pub struct StudyService<R: ?Sized, S: ?Sized, U: ?Sized> {
    study_repo: Arc<R>,
    social_repo: Arc<S>,
    user_repo: Arc<U>,
}

impl<R: ?Sized, S: ?Sized, U: ?Sized> Clone for StudyService<R, S, U> {
    fn clone(&self) -> Self {
        Self {
            study_repo: Arc::clone(&self.study_repo),
            social_repo: Arc::clone(&self.social_repo),
            user_repo: Arc::clone(&self.user_repo),
        }
    }
}

impl<R: ?Sized, S: ?Sized, U: ?Sized> StudyService<R, S, U> {
    /// Create the service with its repositories.
    pub fn new(study_repo: Arc<R>, social_repo: Arc<S>, user_repo: Arc<U>) -> Self {
        Self {
            study_repo,
            social_repo,
            user_repo,
        }
    }
}

impl<R, S, U> StudyService<R, S, U>
where
    R: StudyRepository + ?Sized,
    S: StudySocialRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn require_live_user(&self, user_id: i64) -> Result<(), Error> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?;
        match user {
            Some(user) if user.is_valid => Ok(()),
            _ => Err(Error::not_found(format!("user {user_id} not found"))),
        }
    }

    async fn require_live_detail(&self, study_id: i64) -> Result<StudyDetail, Error> {
        let detail = self
            .study_repo
            .find_detail(study_id)
            .await
            .map_err(map_study_repo_error)?;
        match detail {
            Some(detail) if detail.study.is_valid => Ok(detail),
            _ => Err(Error::not_found(format!("study {study_id} not found"))),
        }
    }

    /// Load the full aggregate for a live study together with its leader.
    pub async fn get_study(&self, study_id: i64) -> Result<StudyView, Error> {
        let detail = self.require_live_detail(study_id).await?;
        let leader = self
            .user_repo
            .find_by_id(detail.study.leader_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| {
                Error::internal(format!(
                    "study {study_id} references a missing leader account"
                ))
            })?;
        Ok(StudyView { detail, leader })
    }

    /// Create a study from a complete tree.
    pub async fn create_study(&self, tree: NewStudyTree) -> Result<StudyDetail, Error> {
        if tree.study.title.trim().is_empty() {
            return Err(Error::validation_failed("study title must not be empty"));
        }
        self.require_live_user(tree.study.leader_id).await?;

        let created = self
            .study_repo
            .insert_tree(&tree)
            .await
            .map_err(map_study_repo_error)?;
        info!(study_id = created.study.id, "study created");
        Ok(created)
    }

    /// Apply an aggregate update to a live study.
    pub async fn update_study(&self, tree: StudyUpdateTree) -> Result<(), Error> {
        if tree.study.title.trim().is_empty() {
            return Err(Error::validation_failed("study title must not be empty"));
        }
        for eval in &tree.evals {
            validate_score(eval.score)?;
        }
        self.require_live_detail(tree.study.id).await?;

        let updated = self
            .study_repo
            .save_tree(&tree)
            .await
            .map_err(map_study_repo_error)?;
        if !updated {
            return Err(Error::not_found(format!(
                "study {} not found",
                tree.study.id
            )));
        }
        Ok(())
    }

    /// Soft-delete a live study.
    pub async fn remove_study(&self, study_id: i64) -> Result<(), Error> {
        let removed = self
            .study_repo
            .mark_removed(study_id)
            .await
            .map_err(map_study_repo_error)?;
        if !removed {
            return Err(Error::not_found(format!("study {study_id} not found")));
        }
        info!(study_id, "study removed");
        Ok(())
    }

    /// Mark a live study shared; repeated calls succeed.
    pub async fn share_study(&self, study_id: i64) -> Result<(), Error> {
        let shared = self
            .study_repo
            .mark_shared(study_id)
            .await
            .map_err(map_study_repo_error)?;
        if !shared {
            return Err(Error::not_found(format!("study {study_id} not found")));
        }
        Ok(())
    }

    /// Deep-copy a study for a new leader.
    ///
    /// The source aggregate is loaded, turned into an insert plan with
    /// counters and lifecycle state reset, and persisted as one transaction.
    /// Material rows are copied but their blobs are shared with the source.
    pub async fn clone_study(
        &self,
        study_id: i64,
        leader_id: i64,
    ) -> Result<StudyDetail, Error> {
        self.require_live_user(leader_id).await?;
        let source = self.require_live_detail(study_id).await?;

        let plan = source.clone_plan(leader_id);
        let created = self
            .study_repo
            .insert_tree(&plan)
            .await
            .map_err(map_study_repo_error)?;
        info!(
            source_id = study_id,
            clone_id = created.study.id,
            "study cloned"
        );
        Ok(created)
    }

    /// Search live studies.
    pub async fn search_studies(
        &self,
        options: StudySearchOptions,
    ) -> Result<Page<StudySummary>, Error> {
        if options.size == 0 || options.size > SEARCH_SIZE_MAX {
            return Err(Error::validation_failed(format!(
                "page size must be between 1 and {SEARCH_SIZE_MAX}"
            )));
        }
        self.study_repo
            .search(&options)
            .await
            .map_err(map_study_repo_error)
    }

    /// Like a study on behalf of a user.
    pub async fn add_like(&self, study_id: i64, user_id: i64) -> Result<StudyLike, Error> {
        self.require_live_user(user_id).await?;
        self.social_repo
            .insert_like(study_id, user_id)
            .await
            .map_err(|err| map_social_repo_error(err, "like"))
    }

    /// Withdraw a like.
    pub async fn remove_like(&self, study_id: i64, user_id: i64) -> Result<(), Error> {
        let removed = self
            .social_repo
            .remove_like(study_id, user_id)
            .await
            .map_err(|err| map_social_repo_error(err, "like"))?;
        if !removed {
            return Err(Error::missing_pair(format!(
                "no like found for study {study_id} and user {user_id}"
            )));
        }
        Ok(())
    }

    /// Bookmark a study on behalf of a user.
    pub async fn add_bookmark(&self, study_id: i64, user_id: i64) -> Result<Bookmark, Error> {
        self.require_live_user(user_id).await?;
        self.social_repo
            .insert_bookmark(study_id, user_id)
            .await
            .map_err(|err| map_social_repo_error(err, "bookmark"))
    }

    /// Withdraw a bookmark.
    pub async fn remove_bookmark(&self, study_id: i64, user_id: i64) -> Result<(), Error> {
        let removed = self
            .social_repo
            .remove_bookmark(study_id, user_id)
            .await
            .map_err(|err| map_social_repo_error(err, "bookmark"))?;
        if !removed {
            return Err(Error::missing_pair(format!(
                "no bookmark found for study {study_id} and user {user_id}"
            )));
        }
        Ok(())
    }

    /// Record a member's evaluation of a study.
    pub async fn add_eval(
        &self,
        study_id: i64,
        user_id: i64,
        score: i32,
        content: Option<String>,
    ) -> Result<StudyEval, Error> {
        validate_score(score)?;
        self.require_live_user(user_id).await?;
        self.social_repo
            .insert_eval(&NewStudyEval {
                study_id,
                user_id,
                score,
                content,
            })
            .await
            .map_err(|err| map_social_repo_error(err, "evaluation"))
    }

    /// Withdraw an evaluation.
    pub async fn remove_eval(&self, study_id: i64, user_id: i64) -> Result<(), Error> {
        let removed = self
            .social_repo
            .remove_eval(study_id, user_id)
            .await
            .map_err(|err| map_social_repo_error(err, "evaluation"))?;
        if !removed {
            return Err(Error::missing_pair(format!(
                "no evaluation found for study {study_id} and user {user_id}"
            )));
        }
        Ok(())
    }

    /// Attach a tag to a study.
    pub async fn add_tag(&self, study_id: i64, tag_id: i64) -> Result<StudyTag, Error> {
        self.social_repo
            .insert_tag(study_id, tag_id)
            .await
            .map_err(|err| map_social_repo_error(err, "tag"))
    }

    /// Detach a tag from a study.
    pub async fn remove_tag(&self, study_id: i64, tag_id: i64) -> Result<(), Error> {
        let removed = self
            .social_repo
            .remove_tag(study_id, tag_id)
            .await
            .map_err(|err| map_social_repo_error(err, "tag"))?;
        if !removed {
            return Err(Error::missing_pair(format!(
                "no tag {tag_id} found on study {study_id}"
            )));
        }
        Ok(())
    }
}

fn validate_score(score: i32) -> Result<(), Error> {
    if !(EVAL_SCORE_MIN..=EVAL_SCORE_MAX).contains(&score) {
        return Err(Error::validation_failed(format!(
            "score must be between {EVAL_SCORE_MIN} and {EVAL_SCORE_MAX}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "study_service_tests.rs"]
mod tests;
