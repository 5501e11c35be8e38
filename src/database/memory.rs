//! In-process stand-ins for the MongoDB repositories, used by the tests.

use crate::comment::model::{Comment, ParentType};
use crate::comment::repository::CommentRepository;
use crate::comment::sort::{CommentSort, hot_score};
use crate::post::post_model::Post;
use crate::post::post_repository::PostRepository;
use crate::utils::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryCommentRepository {
    comments: RwLock<HashMap<ObjectId, Comment>>,
    reads: AtomicUsize,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read requests served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut comments = self.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(StoreError(format!("duplicate key {}", comment.id)));
        }
        comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, StoreError> {
        self.count_read();
        // let other requests run between a read and the write that follows it
        actix_web::rt::task::yield_now().await;
        Ok(self.comments.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Comment>, StoreError> {
        self.count_read();
        let comments = self.comments.read().await;
        Ok(comments
            .values()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn find_children(
        &self,
        parents: &[ObjectId],
        sort: CommentSort,
    ) -> Result<Vec<Comment>, StoreError> {
        self.count_read();
        let comments = self.comments.read().await;
        let mut children: Vec<Comment> = comments
            .values()
            .filter(|c| parents.contains(&c.parent))
            .cloned()
            .collect();
        children.sort_by(|a, b| sort.compare(a, b));
        Ok(children)
    }

    async fn find_by_author(
        &self,
        author: &ObjectId,
        sort: CommentSort,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        self.count_read();
        let comments = self.comments.read().await;
        let mut authored: Vec<Comment> = comments
            .values()
            .filter(|c| &c.author == author)
            .cloned()
            .collect();
        authored.sort_by(|a, b| sort.compare(a, b));
        Ok(authored
            .into_iter()
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn add_reply(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), StoreError> {
        if let Some(comment) = self.comments.write().await.get_mut(parent) {
            if !comment.replies.contains(child) {
                comment.replies.push(*child);
                comment.replies_count += 1;
            }
        }
        Ok(())
    }

    async fn remove_reply(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), StoreError> {
        if let Some(comment) = self.comments.write().await.get_mut(parent) {
            if comment.replies.contains(child) {
                comment.replies.retain(|id| id != child);
                comment.replies_count -= 1;
            }
        }
        Ok(())
    }

    async fn update_text(
        &self,
        id: &ObjectId,
        text: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut comments = self.comments.write().await;
        Ok(comments.get_mut(id).map(|comment| {
            comment.text = text.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn apply_vote(
        &self,
        id: &ObjectId,
        user: &ObjectId,
        previous: i32,
        dir: i32,
    ) -> Result<Option<Comment>, StoreError> {
        let mut comments = self.comments.write().await;
        let Some(comment) = comments.get_mut(id) else {
            return Ok(None);
        };
        if comment.vote_of(user) != previous {
            return Ok(None);
        }
        comment.upvoters.retain(|voter| voter != user);
        comment.downvoters.retain(|voter| voter != user);
        match dir {
            1 => comment.upvoters.push(*user),
            -1 => comment.downvoters.push(*user),
            _ => {}
        }
        comment.votes += i64::from(dir - previous);
        Ok(Some(comment.clone()))
    }

    async fn set_hot_score(
        &self,
        id: &ObjectId,
        votes: i64,
        score: f64,
    ) -> Result<(), StoreError> {
        if let Some(comment) = self.comments.write().await.get_mut(id) {
            if comment.votes == votes {
                comment.sort_on_hot = score;
            }
        }
        Ok(())
    }

    async fn delete_by_post(&self, post: &ObjectId) -> Result<u64, StoreError> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|_, comment| &comment.post != post);
        Ok((before - comments.len()) as u64)
    }

    async fn set_locked(&self, id: &ObjectId, locked: bool) -> Result<bool, StoreError> {
        match self.comments.write().await.get_mut(id) {
            Some(comment) if comment.is_locked != locked => {
                comment.is_locked = locked;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self.comments.write().await.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<HashMap<ObjectId, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn find_page(
        &self,
        author: Option<&ObjectId>,
        sort: CommentSort,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut page: Vec<Post> = posts
            .values()
            .filter(|post| author.is_none_or(|author| &post.author_id == author))
            .cloned()
            .collect();
        page.sort_by(|a, b| sort.compare(a, b));
        Ok(page
            .into_iter()
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_text(&self, id: &ObjectId, text: &str) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(id).map(|post| {
            post.text = text.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn set_flag(
        &self,
        id: &ObjectId,
        field: &str,
        value: bool,
    ) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(id) else {
            return Ok(false);
        };
        let flag = match field {
            "is_locked" => &mut post.is_locked,
            "nsfw" => &mut post.nsfw,
            "spoiler" => &mut post.spoiler,
            other => return Err(StoreError(format!("unknown post flag {}", other))),
        };
        if *flag == value {
            return Ok(false);
        }
        *flag = value;
        Ok(true)
    }

    async fn adjust_comment_count(&self, id: &ObjectId, delta: i64) -> Result<(), StoreError> {
        if let Some(post) = self.posts.write().await.get_mut(id) {
            post.comment_count += delta;
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self.posts.write().await.remove(id).is_some())
    }
}

/// A comment written `minutes_ago` before a fixed reference time.
pub fn comment_fixture(
    post: &ObjectId,
    parent: &ObjectId,
    parent_type: ParentType,
    minutes_ago: i64,
) -> Comment {
    let created_at = reference_time() - Duration::minutes(minutes_ago);
    Comment {
        id: ObjectId::new(),
        parent: *parent,
        parent_type,
        post: *post,
        text: format!("written {} minutes ago", minutes_ago),
        author: ObjectId::new(),
        votes: 0,
        upvoters: Vec::new(),
        downvoters: Vec::new(),
        sort_on_hot: hot_score(0, created_at),
        created_at,
        updated_at: created_at,
        replies: Vec::new(),
        replies_count: 0,
        is_locked: false,
    }
}

pub fn post_fixture(author: &ObjectId) -> Post {
    let created_at = reference_time();
    Post {
        id: ObjectId::new(),
        title: "A post".to_string(),
        text: "Body".to_string(),
        author_id: *author,
        created_at,
        updated_at: created_at,
        votes: 0,
        sort_on_hot: hot_score(0, created_at),
        is_locked: false,
        nsfw: false,
        spoiler: false,
        comment_count: 0,
    }
}

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
