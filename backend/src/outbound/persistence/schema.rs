//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match the migrations exactly. Every table carries `is_valid` for
//! soft deletion and `created_at` for auditing; rows are never deleted.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        email -> Varchar,
        password -> Varchar,
        name -> Varchar,
        nickname -> Varchar,
        image_url -> Nullable<Text>,
        introduction -> Nullable<Text>,
        age -> Nullable<Int4>,
        sido_id -> Nullable<Int8>,
        gugun_id -> Nullable<Int8>,
        phone_number -> Nullable<Varchar>,
        refresh_token -> Nullable<Text>,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Interest tags attached to users; unique on (user_id, tag_id).
    user_tags (id) {
        id -> Int8,
        user_id -> Int8,
        tag_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Study aggregate roots. `status` is a small-int lifecycle code and the
    /// two counters mirror the live rows in study_likes and bookmarks.
    studies (id) {
        id -> Int8,
        is_valid -> Bool,
        title -> Varchar,
        description -> Nullable<Text>,
        rule -> Nullable<Text>,
        is_online -> Bool,
        hit -> Int4,
        like_cnt -> Int4,
        bookmark_cnt -> Int4,
        is_shared -> Bool,
        status -> Int2,
        leader_id -> Int8,
        original_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tags attached to studies; unique on (study_id, tag_id).
    study_tags (id) {
        id -> Int8,
        study_id -> Int8,
        tag_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled meetings within a study.
    sessions (id) {
        id -> Int8,
        study_id -> Int8,
        seq_num -> Int4,
        title -> Varchar,
        description -> Nullable<Text>,
        comment -> Nullable<Text>,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// File-backed materials attached to sessions.
    study_materials (id) {
        id -> Int8,
        study_id -> Int8,
        session_id -> Int8,
        kind -> Varchar,
        content -> Nullable<Text>,
        file_url -> Nullable<Text>,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Study-wide announcements.
    study_notices (id) {
        id -> Int8,
        study_id -> Int8,
        content -> Text,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Read receipts for notices; unique on (notice_id, user_id).
    study_notice_checks (id) {
        id -> Int8,
        notice_id -> Int8,
        user_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attendance marks for sessions; unique on (session_id, user_id).
    session_checks (id) {
        id -> Int8,
        session_id -> Int8,
        user_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Member evaluations of studies; unique on (study_id, user_id).
    study_evals (id) {
        id -> Int8,
        study_id -> Int8,
        user_id -> Int8,
        score -> Int4,
        content -> Nullable<Text>,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Like pair rows; unique on (study_id, user_id).
    study_likes (id) {
        id -> Int8,
        study_id -> Int8,
        user_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookmark pair rows; unique on (study_id, user_id).
    bookmarks (id) {
        id -> Int8,
        study_id -> Int8,
        user_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Participation records; unique on (study_id, user_id).
    participation_histories (id) {
        id -> Int8,
        study_id -> Int8,
        user_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Follow edges between users; unique on (follower_id, followee_id).
    follows (id) {
        id -> Int8,
        follower_id -> Int8,
        followee_id -> Int8,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Peer evaluations; unique on (evaluator_id, evaluated_id).
    user_evals (id) {
        id -> Int8,
        evaluator_id -> Int8,
        evaluated_id -> Int8,
        score -> Int4,
        content -> Nullable<Text>,
        is_valid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_tags,
    studies,
    study_tags,
    sessions,
    study_materials,
    study_notices,
    study_notice_checks,
    session_checks,
    study_evals,
    study_likes,
    bookmarks,
    participation_histories,
    follows,
    user_evals,
);
