use crate::comment::sort::CommentSort;
use crate::utils::pagination::page_window;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 2;
pub const DEFAULT_DEPTH: usize = 3;
pub const MAX_USER_COMMENTS: i64 = 100;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ParentType {
    Post,
    Comment,
}

impl ParentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Post" => Some(ParentType::Post),
            "Comment" => Some(ParentType::Comment),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub parent: ObjectId,
    pub parent_type: ParentType,
    pub post: ObjectId,
    pub text: String,
    pub author: ObjectId,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub upvoters: Vec<ObjectId>,
    #[serde(default)]
    pub downvoters: Vec<ObjectId>,
    #[serde(default)]
    pub sort_on_hot: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<ObjectId>,
    #[serde(default)]
    pub replies_count: i64,
    #[serde(default)]
    pub is_locked: bool,
}

impl Comment {
    /// Current vote of `user` on this comment: 1, -1 or 0.
    pub fn vote_of(&self, user: &ObjectId) -> i32 {
        if self.upvoters.contains(user) {
            1
        } else if self.downvoters.contains(user) {
            -1
        } else {
            0
        }
    }
}

/// Placeholder for children that were not returned, carrying their ids so
/// the client can fetch them through `/comments/more`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MoreChildren {
    pub count: usize,
    pub children: Vec<String>,
}

impl MoreChildren {
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a ObjectId>) -> Option<Self> {
        let children: Vec<String> = ids.into_iter().map(|id| id.to_hex()).collect();
        if children.is_empty() {
            return None;
        }
        Some(MoreChildren {
            count: children.len(),
            children,
        })
    }
}

/// Public view of a comment. Also the node type of assembled trees.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentNode {
    #[serde(rename = "_id")]
    pub id: String,
    pub parent: String,
    pub parent_type: ParentType,
    pub post: String,
    pub text: String,
    pub author: String,
    pub votes: i64,
    pub replies_count: i64,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommentNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_children: Option<MoreChildren>,
}

impl From<Comment> for CommentNode {
    fn from(comment: Comment) -> Self {
        CommentNode {
            id: comment.id.to_hex(),
            parent: comment.parent.to_hex(),
            parent_type: comment.parent_type,
            post: comment.post.to_hex(),
            text: comment.text,
            author: comment.author.to_hex(),
            votes: comment.votes,
            replies_count: comment.replies_count,
            is_locked: comment.is_locked,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            children: Vec::new(),
            more_children: None,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentTree {
    pub comments: Vec<CommentNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_children: Option<MoreChildren>,
}

/// Normalised limit/depth/sort shared by the tree and more-children fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub limit: usize,
    pub depth: usize,
    pub sort: CommentSort,
}

impl TreeParams {
    pub fn new(limit: Option<i64>, depth: Option<i64>, sort: Option<&str>) -> Self {
        let limit = match limit {
            Some(limit) if limit > 0 => limit as usize,
            _ => DEFAULT_LIMIT,
        };
        // zero is treated like a missing depth
        let depth = match depth {
            Some(depth) if depth > 0 => depth as usize,
            _ => DEFAULT_DEPTH,
        };
        TreeParams {
            limit,
            depth,
            sort: CommentSort::parse(sort),
        }
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams::new(None, None, None)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CommentTreeQuery {
    pub limit: Option<i64>,
    pub depth: Option<i64>,
    pub sort: Option<String>,
    pub comment_id: Option<String>,
}

impl CommentTreeQuery {
    pub fn params(&self) -> TreeParams {
        TreeParams::new(self.limit, self.depth, self.sort.as_deref())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct MoreChildrenQuery {
    /// Comma separated comment ids.
    pub children: Option<String>,
    pub limit: Option<i64>,
    pub depth: Option<i64>,
    pub sort: Option<String>,
}

impl MoreChildrenQuery {
    pub fn params(&self) -> TreeParams {
        TreeParams::new(self.limit, self.depth, self.sort.as_deref())
    }

    pub fn children(&self) -> Vec<String> {
        self.children
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct UserCommentsQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub sort: Option<String>,
}

impl UserCommentsQuery {
    /// Returns `(skip, limit)` with limit capped and page defaulting to 1.
    pub fn window(&self) -> (u64, i64) {
        page_window(self.limit, self.page, MAX_USER_COMMENTS)
    }
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub parent: Option<String>,
    pub parent_type: Option<String>,
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub dir: i32,
}
