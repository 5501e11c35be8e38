use crate::comment::repository::CommentRepository;
use crate::comment::sort::{CommentSort, hot_score};
use crate::post::post_model::{Post, PostAction, PostListQuery, PostResponse};
use crate::post::post_repository::PostRepository;
use crate::utils::error::CustomError;
use chrono::Utc;
use log::info;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        PostService { posts, comments }
    }

    pub async fn create_post(
        &self,
        author_id: ObjectId,
        title: String,
        text: String,
    ) -> Result<PostResponse, CustomError> {
        let now = Utc::now();
        let post = Post {
            id: ObjectId::new(),
            title,
            text,
            author_id,
            created_at: now,
            updated_at: now,
            votes: 0,
            sort_on_hot: hot_score(0, now),
            is_locked: false,
            nsfw: false,
            spoiler: false,
            comment_count: 0,
        };

        self.posts.insert(&post).await?;

        info!("Post {} created by {}", post.id, author_id);
        Ok(post.into())
    }

    pub async fn get_post(&self, id: &str) -> Result<PostResponse, CustomError> {
        let object_id = parse_post_id(id)?;
        let post = self
            .posts
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))?;
        Ok(post.into())
    }

    pub async fn update_post(
        &self,
        id: &str,
        user: &ObjectId,
        text: &str,
    ) -> Result<PostResponse, CustomError> {
        let post = self.owned_post(id, user).await?;
        let updated = self
            .posts
            .update_text(&post.id, text)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))?;
        Ok(updated.into())
    }

    /// Listing of all posts, one page at a time.
    pub async fn list_posts(
        &self,
        query: &PostListQuery,
    ) -> Result<Vec<PostResponse>, CustomError> {
        self.page(None, query).await
    }

    pub async fn user_posts(
        &self,
        user_id: &str,
        query: &PostListQuery,
    ) -> Result<Vec<PostResponse>, CustomError> {
        let author = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".into()))?;
        self.page(Some(&author), query).await
    }

    /// Removes the post and then its whole comment thread.
    pub async fn delete_post(&self, id: &str, user: &ObjectId) -> Result<(), CustomError> {
        let post = self.owned_post(id, user).await?;
        if !self.posts.delete(&post.id).await? {
            return Err(CustomError::NotFoundError("Post not found".into()));
        }
        let removed = self.comments.delete_by_post(&post.id).await?;
        info!("Post {} deleted with {} comments", post.id, removed);
        Ok(())
    }

    /// Applies an author toggle such as `lock_comments`; a repeated toggle
    /// is a conflict.
    pub async fn post_action(
        &self,
        id: &str,
        user: &ObjectId,
        action: PostAction,
    ) -> Result<(), CustomError> {
        let post = self.owned_post(id, user).await?;
        let (field, value) = action.flag();
        if !self.posts.set_flag(&post.id, field, value).await? {
            return Err(CustomError::ConflictError(
                "Action already performed".into(),
            ));
        }
        info!("Post {} {:?}", post.id, action);
        Ok(())
    }

    async fn page(
        &self,
        author: Option<&ObjectId>,
        query: &PostListQuery,
    ) -> Result<Vec<PostResponse>, CustomError> {
        let (skip, limit) = query.window();
        let sort = CommentSort::parse(query.sort.as_deref());
        let posts = self.posts.find_page(author, sort, skip, limit).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    async fn owned_post(&self, id: &str, user: &ObjectId) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        let post = self
            .posts
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))?;
        if &post.author_id != user {
            return Err(CustomError::UnauthorizedError("User must be author".into()));
        }
        Ok(post)
    }
}

fn parse_post_id(id: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(id).map_err(|_| CustomError::BadRequestError("Invalid post ID".into()))
}
