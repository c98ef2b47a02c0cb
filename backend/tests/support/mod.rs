//! In-memory port implementations shared by the integration tests.
//!
//! One [`InMemoryBackend`] implements every repository port over a single
//! mutex-guarded world, mirroring the transactional adapters closely enough
//! to exercise the services and HTTP layer end to end without a database.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use lighthouse_backend::domain::ports::{
    MaterialRecordPatch, MaterialRepository, MaterialRepositoryError, NewMaterialRecord,
    NewStudyEval, StudyRepository, StudyRepositoryError, StudySocialRepository,
    StudySocialRepositoryError, UserRepository, UserRepositoryError, UserSocialRepository,
    UserSocialRepositoryError,
};
use lighthouse_backend::domain::{
    Bookmark, Follow, NewStudyTree, NewUser, NewUserEval, Page, Session, SessionDetail, Study,
    StudyDetail, StudyEval, StudyLike, StudyMaterial, StudyNotice, StudySearchOptions,
    StudySummary, StudyTag, StudyUpdateTree, User, UserEval, UserPatch, UserProfile, UserTag,
};

#[derive(Default)]
pub struct World {
    next_id: i64,
    pub studies: Vec<StudyDetail>,
    pub likes: Vec<StudyLike>,
    pub bookmarks: Vec<Bookmark>,
    pub study_evals: Vec<StudyEval>,
    pub materials: Vec<StudyMaterial>,
    pub users: Vec<User>,
    pub user_tags: Vec<UserTag>,
    pub follows: Vec<Follow>,
    pub user_evals: Vec<UserEval>,
}

impl World {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_study_mut(&mut self, study_id: i64) -> Option<&mut Study> {
        self.studies
            .iter_mut()
            .map(|detail| &mut detail.study)
            .find(|study| study.id == study_id && study.is_valid)
    }
}

/// Cloneable handle implementing every repository port over a shared world.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    world: Arc<Mutex<World>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().expect("world mutex poisoned")
    }

    /// Seed a live user and return their id.
    pub fn seed_user(&self, email: &str, nickname: &str) -> i64 {
        let mut world = self.world();
        let id = world.next_id();
        world.users.push(User {
            id,
            email: email.to_owned(),
            password: "hunter2".to_owned(),
            name: nickname.to_owned(),
            nickname: nickname.to_owned(),
            image_url: None,
            introduction: None,
            age: None,
            sido_id: None,
            gugun_id: None,
            phone_number: None,
            refresh_token: None,
            is_valid: true,
            created_at: Utc::now(),
        });
        id
    }

    /// Seed a live study led by `leader_id` and return its id.
    pub fn seed_study(&self, title: &str, leader_id: i64) -> i64 {
        let mut world = self.world();
        let id = world.next_id();
        world.studies.push(StudyDetail {
            study: Study {
                id,
                is_valid: true,
                title: title.to_owned(),
                description: None,
                rule: None,
                is_online: true,
                hit: 0,
                like_cnt: 0,
                bookmark_cnt: 0,
                is_shared: false,
                status: Default::default(),
                leader_id,
                original_id: None,
                created_at: Utc::now(),
            },
            tags: Vec::new(),
            sessions: Vec::new(),
            notices: Vec::new(),
        });
        id
    }

    /// Seed a live session under a study and return its id.
    pub fn seed_session(&self, study_id: i64, title: &str) -> i64 {
        let mut world = self.world();
        let id = world.next_id();
        let session = Session {
            id,
            study_id,
            seq_num: 1,
            title: title.to_owned(),
            description: None,
            comment: None,
            is_valid: true,
            created_at: Utc::now(),
        };
        let detail = world
            .studies
            .iter_mut()
            .find(|detail| detail.study.id == study_id)
            .expect("seeded study exists");
        detail.sessions.push(SessionDetail {
            session,
            materials: Vec::new(),
        });
        id
    }

    /// Seed a live material under a session and return its id.
    pub fn seed_material(&self, study_id: i64, session_id: i64, kind: &str) -> i64 {
        let mut world = self.world();
        let id = world.next_id();
        world.materials.push(StudyMaterial {
            id,
            study_id,
            session_id,
            kind: kind.to_owned(),
            content: None,
            file_url: None,
            is_valid: true,
            created_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl StudyRepository for InMemoryBackend {
    async fn find_by_id(&self, id: i64) -> Result<Option<Study>, StudyRepositoryError> {
        let world = self.world();
        Ok(world
            .studies
            .iter()
            .find(|detail| detail.study.id == id)
            .map(|detail| detail.study.clone()))
    }

    async fn find_detail(&self, id: i64) -> Result<Option<StudyDetail>, StudyRepositoryError> {
        let world = self.world();
        Ok(world
            .studies
            .iter()
            .find(|detail| detail.study.id == id)
            .cloned())
    }

    async fn search(
        &self,
        options: &StudySearchOptions,
    ) -> Result<Page<StudySummary>, StudyRepositoryError> {
        let world = self.world();
        let matches: Vec<&Study> = world
            .studies
            .iter()
            .map(|detail| &detail.study)
            .filter(|study| study.is_valid)
            .filter(|study| {
                options
                    .keyword
                    .as_ref()
                    .is_none_or(|keyword| study.title.contains(keyword.as_str()))
            })
            .filter(|study| options.is_online.is_none_or(|flag| study.is_online == flag))
            .filter(|study| options.status.is_none_or(|status| study.status == status))
            .collect();

        let total = matches.len() as u64;
        let start = (options.page as usize) * (options.size as usize);
        let items = matches
            .into_iter()
            .skip(start)
            .take(options.size as usize)
            .map(|study| StudySummary {
                id: study.id,
                title: study.title.clone(),
                description: study.description.clone(),
                is_online: study.is_online,
                status: study.status,
                hit: study.hit,
                like_cnt: study.like_cnt,
                bookmark_cnt: study.bookmark_cnt,
                leader_id: study.leader_id,
                created_at: study.created_at,
            })
            .collect();

        Ok(Page {
            items,
            page: options.page,
            size: options.size,
            total,
        })
    }

    async fn insert_tree(&self, tree: &NewStudyTree) -> Result<StudyDetail, StudyRepositoryError> {
        let mut world = self.world();
        let study_id = world.next_id();
        let now = Utc::now();

        let tags = tree
            .tags
            .iter()
            .map(|tag| {
                let id = world.next_id();
                StudyTag {
                    id,
                    study_id,
                    tag_id: tag.tag_id,
                    is_valid: tag.is_valid,
                    created_at: now,
                }
            })
            .collect();

        let sessions = tree
            .sessions
            .iter()
            .map(|session| {
                let session_id = world.next_id();
                let materials = session
                    .materials
                    .iter()
                    .map(|material| {
                        let id = world.next_id();
                        StudyMaterial {
                            id,
                            study_id,
                            session_id,
                            kind: material.kind.clone(),
                            content: material.content.clone(),
                            file_url: material.file_url.clone(),
                            is_valid: material.is_valid,
                            created_at: now,
                        }
                    })
                    .collect();
                SessionDetail {
                    session: Session {
                        id: session_id,
                        study_id,
                        seq_num: session.seq_num,
                        title: session.title.clone(),
                        description: session.description.clone(),
                        comment: session.comment.clone(),
                        is_valid: session.is_valid,
                        created_at: now,
                    },
                    materials,
                }
            })
            .collect();

        let notices = tree
            .notices
            .iter()
            .map(|notice| {
                let id = world.next_id();
                StudyNotice {
                    id,
                    study_id,
                    content: notice.content.clone(),
                    is_valid: notice.is_valid,
                    created_at: now,
                }
            })
            .collect();

        let detail = StudyDetail {
            study: Study {
                id: study_id,
                is_valid: tree.study.is_valid,
                title: tree.study.title.clone(),
                description: tree.study.description.clone(),
                rule: tree.study.rule.clone(),
                is_online: tree.study.is_online,
                hit: tree.study.hit,
                like_cnt: 0,
                bookmark_cnt: 0,
                is_shared: false,
                status: tree.study.status,
                leader_id: tree.study.leader_id,
                original_id: tree.study.original_id,
                created_at: now,
            },
            tags,
            sessions,
            notices,
        };
        world.studies.push(detail.clone());
        Ok(detail)
    }

    async fn save_tree(&self, tree: &StudyUpdateTree) -> Result<bool, StudyRepositoryError> {
        let mut world = self.world();
        let Some(detail) = world
            .studies
            .iter_mut()
            .find(|detail| detail.study.id == tree.study.id)
        else {
            return Ok(false);
        };

        detail.study.title = tree.study.title.clone();
        detail.study.description = tree.study.description.clone();
        detail.study.rule = tree.study.rule.clone();
        detail.study.is_online = tree.study.is_online;
        detail.study.status = tree.study.status;

        for session in &tree.sessions {
            if let Some(id) = session.id {
                if let Some(existing) = detail
                    .sessions
                    .iter_mut()
                    .find(|existing| existing.session.id == id)
                {
                    existing.session.title = session.title.clone();
                    existing.session.seq_num = session.seq_num;
                    existing.session.is_valid = session.is_valid;
                }
            }
        }
        for notice in &tree.notices {
            if let Some(id) = notice.id {
                if let Some(existing) = detail.notices.iter_mut().find(|existing| existing.id == id)
                {
                    existing.content = notice.content.clone();
                    existing.is_valid = notice.is_valid;
                }
            }
        }
        Ok(true)
    }

    async fn mark_removed(&self, id: i64) -> Result<bool, StudyRepositoryError> {
        let mut world = self.world();
        match world.live_study_mut(id) {
            Some(study) => {
                study.is_valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_shared(&self, id: i64) -> Result<bool, StudyRepositoryError> {
        let mut world = self.world();
        match world.live_study_mut(id) {
            Some(study) => {
                study.is_shared = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl StudySocialRepository for InMemoryBackend {
    async fn find_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<StudyLike>, StudySocialRepositoryError> {
        let world = self.world();
        Ok(world
            .likes
            .iter()
            .find(|like| like.study_id == study_id && like.user_id == user_id && like.is_valid)
            .cloned())
    }

    async fn insert_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<StudyLike, StudySocialRepositoryError> {
        let mut world = self.world();
        if world.live_study_mut(study_id).is_none() {
            return Err(StudySocialRepositoryError::study_missing(study_id));
        }
        if world
            .likes
            .iter()
            .any(|like| like.study_id == study_id && like.user_id == user_id && like.is_valid)
        {
            return Err(StudySocialRepositoryError::duplicate(study_id, user_id));
        }

        let id = world.next_id();
        let like = StudyLike {
            id,
            study_id,
            user_id,
            is_valid: true,
            created_at: Utc::now(),
        };
        world.likes.push(like.clone());
        if let Some(study) = world.live_study_mut(study_id) {
            study.add_like();
        }
        Ok(like)
    }

    async fn remove_like(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut world = self.world();
        let Some(like) = world
            .likes
            .iter_mut()
            .find(|like| like.study_id == study_id && like.user_id == user_id && like.is_valid)
        else {
            return Ok(false);
        };
        like.is_valid = false;
        if let Some(study) = world.live_study_mut(study_id) {
            study.remove_like();
        }
        Ok(true)
    }

    async fn find_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<Bookmark>, StudySocialRepositoryError> {
        let world = self.world();
        Ok(world
            .bookmarks
            .iter()
            .find(|mark| mark.study_id == study_id && mark.user_id == user_id && mark.is_valid)
            .cloned())
    }

    async fn insert_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Bookmark, StudySocialRepositoryError> {
        let mut world = self.world();
        if world.live_study_mut(study_id).is_none() {
            return Err(StudySocialRepositoryError::study_missing(study_id));
        }
        if world
            .bookmarks
            .iter()
            .any(|mark| mark.study_id == study_id && mark.user_id == user_id && mark.is_valid)
        {
            return Err(StudySocialRepositoryError::duplicate(study_id, user_id));
        }

        let id = world.next_id();
        let mark = Bookmark {
            id,
            study_id,
            user_id,
            is_valid: true,
            created_at: Utc::now(),
        };
        world.bookmarks.push(mark.clone());
        if let Some(study) = world.live_study_mut(study_id) {
            study.add_bookmark();
        }
        Ok(mark)
    }

    async fn remove_bookmark(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut world = self.world();
        let Some(mark) = world
            .bookmarks
            .iter_mut()
            .find(|mark| mark.study_id == study_id && mark.user_id == user_id && mark.is_valid)
        else {
            return Ok(false);
        };
        mark.is_valid = false;
        if let Some(study) = world.live_study_mut(study_id) {
            study.remove_bookmark();
        }
        Ok(true)
    }

    async fn find_eval(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<Option<StudyEval>, StudySocialRepositoryError> {
        let world = self.world();
        Ok(world
            .study_evals
            .iter()
            .find(|eval| eval.study_id == study_id && eval.user_id == user_id && eval.is_valid)
            .cloned())
    }

    async fn insert_eval(
        &self,
        eval: &NewStudyEval,
    ) -> Result<StudyEval, StudySocialRepositoryError> {
        let mut world = self.world();
        if world.live_study_mut(eval.study_id).is_none() {
            return Err(StudySocialRepositoryError::study_missing(eval.study_id));
        }
        if world.study_evals.iter().any(|existing| {
            existing.study_id == eval.study_id
                && existing.user_id == eval.user_id
                && existing.is_valid
        }) {
            return Err(StudySocialRepositoryError::duplicate(
                eval.study_id,
                eval.user_id,
            ));
        }

        let id = world.next_id();
        let row = StudyEval {
            id,
            study_id: eval.study_id,
            user_id: eval.user_id,
            score: eval.score,
            content: eval.content.clone(),
            is_valid: true,
            created_at: Utc::now(),
        };
        world.study_evals.push(row.clone());
        Ok(row)
    }

    async fn remove_eval(
        &self,
        study_id: i64,
        user_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut world = self.world();
        let Some(eval) = world
            .study_evals
            .iter_mut()
            .find(|eval| eval.study_id == study_id && eval.user_id == user_id && eval.is_valid)
        else {
            return Ok(false);
        };
        eval.is_valid = false;
        Ok(true)
    }

    async fn find_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<Option<StudyTag>, StudySocialRepositoryError> {
        let world = self.world();
        Ok(world
            .studies
            .iter()
            .find(|detail| detail.study.id == study_id)
            .and_then(|detail| {
                detail
                    .tags
                    .iter()
                    .find(|tag| tag.tag_id == tag_id && tag.is_valid)
                    .cloned()
            }))
    }

    async fn insert_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<StudyTag, StudySocialRepositoryError> {
        let mut world = self.world();
        if world.live_study_mut(study_id).is_none() {
            return Err(StudySocialRepositoryError::study_missing(study_id));
        }
        let id = world.next_id();
        let detail = world
            .studies
            .iter_mut()
            .find(|detail| detail.study.id == study_id)
            .expect("study just checked");
        if detail
            .tags
            .iter()
            .any(|tag| tag.tag_id == tag_id && tag.is_valid)
        {
            return Err(StudySocialRepositoryError::duplicate(study_id, tag_id));
        }
        let tag = StudyTag {
            id,
            study_id,
            tag_id,
            is_valid: true,
            created_at: Utc::now(),
        };
        detail.tags.push(tag.clone());
        Ok(tag)
    }

    async fn remove_tag(
        &self,
        study_id: i64,
        tag_id: i64,
    ) -> Result<bool, StudySocialRepositoryError> {
        let mut world = self.world();
        let Some(detail) = world
            .studies
            .iter_mut()
            .find(|detail| detail.study.id == study_id)
        else {
            return Ok(false);
        };
        match detail
            .tags
            .iter_mut()
            .find(|tag| tag.tag_id == tag_id && tag.is_valid)
        {
            Some(tag) => {
                tag.is_valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl MaterialRepository for InMemoryBackend {
    async fn find_by_id(&self, id: i64) -> Result<Option<StudyMaterial>, MaterialRepositoryError> {
        let world = self.world();
        Ok(world
            .materials
            .iter()
            .find(|material| material.id == id)
            .cloned())
    }

    async fn insert(
        &self,
        record: &NewMaterialRecord,
    ) -> Result<StudyMaterial, MaterialRepositoryError> {
        let mut world = self.world();
        let session_live = world.studies.iter().any(|detail| {
            detail.study.id == record.study_id
                && detail.sessions.iter().any(|session| {
                    session.session.id == record.session_id && session.session.is_valid
                })
        });
        if !session_live {
            return Err(MaterialRepositoryError::session_missing(record.session_id));
        }

        let id = world.next_id();
        let material = StudyMaterial {
            id,
            study_id: record.study_id,
            session_id: record.session_id,
            kind: record.kind.clone(),
            content: record.content.clone(),
            file_url: record.file_url.clone(),
            is_valid: true,
            created_at: Utc::now(),
        };
        world.materials.push(material.clone());
        Ok(material)
    }

    async fn update(
        &self,
        id: i64,
        patch: &MaterialRecordPatch,
    ) -> Result<bool, MaterialRepositoryError> {
        let mut world = self.world();
        match world
            .materials
            .iter_mut()
            .find(|material| material.id == id && material.is_valid)
        {
            Some(material) => {
                material.kind = patch.kind.clone();
                material.content = patch.content.clone();
                material.file_url = patch.file_url.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_removed(&self, id: i64) -> Result<bool, MaterialRepositoryError> {
        let mut world = self.world();
        match world
            .materials
            .iter_mut()
            .find(|material| material.id == id && material.is_valid)
        {
            Some(material) => {
                material.is_valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryBackend {
    async fn insert(&self, user: &NewUser, tag_ids: &[i64]) -> Result<User, UserRepositoryError> {
        let mut world = self.world();
        if world
            .users
            .iter()
            .any(|existing| existing.email == user.email && existing.is_valid)
        {
            return Err(UserRepositoryError::duplicate_email(user.email.as_str()));
        }

        let id = world.next_id();
        let row = User {
            id,
            email: user.email.clone(),
            password: user.password.clone(),
            name: user.name.clone(),
            nickname: user.nickname.clone(),
            image_url: user.image_url.clone(),
            introduction: user.introduction.clone(),
            age: user.age,
            sido_id: user.sido_id,
            gugun_id: user.gugun_id,
            phone_number: user.phone_number.clone(),
            refresh_token: None,
            is_valid: true,
            created_at: Utc::now(),
        };
        world.users.push(row.clone());
        for tag_id in tag_ids {
            let tag_row_id = world.next_id();
            world.user_tags.push(UserTag {
                id: tag_row_id,
                user_id: id,
                tag_id: *tag_id,
                is_valid: true,
                created_at: Utc::now(),
            });
        }
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserRepositoryError> {
        let world = self.world();
        Ok(world.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let world = self.world();
        Ok(world
            .users
            .iter()
            .find(|user| user.email == email && user.is_valid)
            .cloned())
    }

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, UserRepositoryError> {
        let world = self.world();
        let Some(user) = world
            .users
            .iter()
            .find(|user| user.id == id && user.is_valid)
        else {
            return Ok(None);
        };
        let tags = world
            .user_tags
            .iter()
            .filter(|tag| tag.user_id == id && tag.is_valid)
            .cloned()
            .collect();
        Ok(Some(UserProfile {
            user: user.clone(),
            tags,
        }))
    }

    async fn update(
        &self,
        patch: &UserPatch,
        tag_ids: &[i64],
    ) -> Result<bool, UserRepositoryError> {
        let mut world = self.world();
        let Some(user) = world
            .users
            .iter_mut()
            .find(|user| user.id == patch.id && user.is_valid)
        else {
            return Ok(false);
        };
        user.name = patch.name.clone();
        user.nickname = patch.nickname.clone();
        user.image_url = patch.image_url.clone();
        user.introduction = patch.introduction.clone();
        user.age = patch.age;
        user.sido_id = patch.sido_id;
        user.gugun_id = patch.gugun_id;
        user.phone_number = patch.phone_number.clone();

        for tag in world
            .user_tags
            .iter_mut()
            .filter(|tag| tag.user_id == patch.id)
        {
            tag.is_valid = tag_ids.contains(&tag.tag_id);
        }
        let known: Vec<i64> = world
            .user_tags
            .iter()
            .filter(|tag| tag.user_id == patch.id)
            .map(|tag| tag.tag_id)
            .collect();
        for tag_id in tag_ids.iter().filter(|tag_id| !known.contains(tag_id)) {
            let id = world.next_id();
            world.user_tags.push(UserTag {
                id,
                user_id: patch.id,
                tag_id: *tag_id,
                is_valid: true,
                created_at: Utc::now(),
            });
        }
        Ok(true)
    }

    async fn mark_removed(&self, id: i64) -> Result<bool, UserRepositoryError> {
        let mut world = self.world();
        match world
            .users
            .iter_mut()
            .find(|user| user.id == id && user.is_valid)
        {
            Some(user) => {
                user.is_valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save_refresh_token(
        &self,
        user_id: i64,
        token: Option<String>,
    ) -> Result<bool, UserRepositoryError> {
        let mut world = self.world();
        match world
            .users
            .iter_mut()
            .find(|user| user.id == user_id && user.is_valid)
        {
            Some(user) => {
                user.refresh_token = token;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserSocialRepository for InMemoryBackend {
    async fn find_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<Option<Follow>, UserSocialRepositoryError> {
        let world = self.world();
        Ok(world
            .follows
            .iter()
            .find(|follow| {
                follow.follower_id == follower_id
                    && follow.followee_id == followee_id
                    && follow.is_valid
            })
            .cloned())
    }

    async fn insert_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<Follow, UserSocialRepositoryError> {
        let mut world = self.world();
        for user_id in [follower_id, followee_id] {
            if !world
                .users
                .iter()
                .any(|user| user.id == user_id && user.is_valid)
            {
                return Err(UserSocialRepositoryError::user_missing(user_id));
            }
        }
        if world.follows.iter().any(|follow| {
            follow.follower_id == follower_id
                && follow.followee_id == followee_id
                && follow.is_valid
        }) {
            return Err(UserSocialRepositoryError::duplicate(
                follower_id,
                followee_id,
            ));
        }

        let id = world.next_id();
        let follow = Follow {
            id,
            follower_id,
            followee_id,
            is_valid: true,
            created_at: Utc::now(),
        };
        world.follows.push(follow.clone());
        Ok(follow)
    }

    async fn remove_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<bool, UserSocialRepositoryError> {
        let mut world = self.world();
        match world.follows.iter_mut().find(|follow| {
            follow.follower_id == follower_id
                && follow.followee_id == followee_id
                && follow.is_valid
        }) {
            Some(follow) => {
                follow.is_valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_eval(
        &self,
        evaluator_id: i64,
        evaluated_id: i64,
    ) -> Result<Option<UserEval>, UserSocialRepositoryError> {
        let world = self.world();
        Ok(world
            .user_evals
            .iter()
            .find(|eval| {
                eval.evaluator_id == evaluator_id
                    && eval.evaluated_id == evaluated_id
                    && eval.is_valid
            })
            .cloned())
    }

    async fn insert_eval(
        &self,
        eval: &NewUserEval,
    ) -> Result<UserEval, UserSocialRepositoryError> {
        let mut world = self.world();
        for user_id in [eval.evaluator_id, eval.evaluated_id] {
            if !world
                .users
                .iter()
                .any(|user| user.id == user_id && user.is_valid)
            {
                return Err(UserSocialRepositoryError::user_missing(user_id));
            }
        }
        if world.user_evals.iter().any(|existing| {
            existing.evaluator_id == eval.evaluator_id
                && existing.evaluated_id == eval.evaluated_id
                && existing.is_valid
        }) {
            return Err(UserSocialRepositoryError::duplicate(
                eval.evaluator_id,
                eval.evaluated_id,
            ));
        }

        let id = world.next_id();
        let row = UserEval {
            id,
            evaluator_id: eval.evaluator_id,
            evaluated_id: eval.evaluated_id,
            score: eval.score,
            content: eval.content.clone(),
            is_valid: true,
            created_at: Utc::now(),
        };
        world.user_evals.push(row.clone());
        Ok(row)
    }

    async fn remove_eval(
        &self,
        evaluator_id: i64,
        evaluated_id: i64,
    ) -> Result<bool, UserSocialRepositoryError> {
        let mut world = self.world();
        match world.user_evals.iter_mut().find(|eval| {
            eval.evaluator_id == evaluator_id
                && eval.evaluated_id == evaluated_id
                && eval.is_valid
        }) {
            Some(eval) => {
                eval.is_valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
