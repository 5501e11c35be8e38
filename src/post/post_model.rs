use crate::utils::pagination::page_window;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

pub const MAX_POSTS_PER_PAGE: i64 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub text: String,
    pub author_id: ObjectId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub sort_on_hot: f64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub comment_count: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PostResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub text: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub votes: i64,
    pub is_locked: bool,
    pub nsfw: bool,
    pub spoiler: bool,
    pub comment_count: i64,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        PostResponse {
            id: post.id.to_hex(),
            title: post.title,
            text: post.text,
            author_id: post.author_id.to_hex(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            votes: post.votes,
            is_locked: post.is_locked,
            nsfw: post.nsfw,
            spoiler: post.spoiler,
            comment_count: post.comment_count,
        }
    }
}

/// Author-level toggles accepted on `PATCH /posts/{post_id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    LockComments,
    UnlockComments,
    MarkNsfw,
    UnmarkNsfw,
    Spoiler,
    Unspoiler,
}

impl PostAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "lock_comments" => Some(PostAction::LockComments),
            "unlock_comments" => Some(PostAction::UnlockComments),
            "mark_nsfw" => Some(PostAction::MarkNsfw),
            "unmark_nsfw" => Some(PostAction::UnmarkNsfw),
            "spoiler" => Some(PostAction::Spoiler),
            "unspoiler" => Some(PostAction::Unspoiler),
            _ => None,
        }
    }

    /// Field the action writes and the value it writes there.
    pub fn flag(&self) -> (&'static str, bool) {
        match self {
            PostAction::LockComments => ("is_locked", true),
            PostAction::UnlockComments => ("is_locked", false),
            PostAction::MarkNsfw => ("nsfw", true),
            PostAction::UnmarkNsfw => ("nsfw", false),
            PostAction::Spoiler => ("spoiler", true),
            PostAction::Unspoiler => ("spoiler", false),
        }
    }
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub text: Option<String>,
}

/// `?sort=hot|new|top&limit&page` on post listings.
#[derive(Debug, Deserialize, Default)]
pub struct PostListQuery {
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl PostListQuery {
    pub fn window(&self) -> (u64, i64) {
        page_window(self.limit, self.page, MAX_POSTS_PER_PAGE)
    }
}
