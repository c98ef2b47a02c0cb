//! Domain model: entities, services and the ports they drive.

mod error;
mod material_service;
pub mod ports;
mod study;
mod study_service;
mod user;
mod user_service;

pub use error::{Error, ErrorKind};
pub use material_service::{MaterialDraft, MaterialFile, MaterialService};
pub use study::{
    Bookmark, CheckUpdate, NewSessionTree, NewStudy, NewStudyMaterial, NewStudyNotice,
    NewStudyTag, NewStudyTree, Page, ParticipationHistory, Session, SessionCheck, SessionDetail,
    SessionUpdate, Study, StudyDetail, StudyEval, StudyEvalUpdate, StudyLike, StudyMaterial,
    StudyMaterialUpdate, StudyNotice, StudyNoticeCheck, StudyNoticeUpdate, StudyPatch,
    StudySearchOptions, StudyStatus, StudySummary, StudyTag, StudyTagUpdate, StudyUpdateTree,
    StudyView,
};
pub use study_service::{
    EVAL_SCORE_MAX, EVAL_SCORE_MIN, SEARCH_SIZE_MAX, StudyService,
};
pub use user::{Follow, NewUser, NewUserEval, User, UserEval, UserPatch, UserProfile, UserTag};
pub use user_service::UserService;
