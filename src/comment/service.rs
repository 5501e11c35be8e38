use crate::comment::error::CommentError;
use crate::comment::model::{
    Comment, CommentNode, CommentTree, CommentTreeQuery, ParentType, TreeParams,
    UserCommentsQuery,
};
use crate::comment::repository::CommentRepository;
use crate::comment::sort::{CommentSort, hot_score};
use crate::comment::tree::CommentTreeAssembler;
use crate::post::post_repository::PostRepository;
use chrono::Utc;
use log::{debug, info, warn};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

/// Reads of the voter lists a vote may go through before giving up.
const VOTE_ATTEMPTS: usize = 3;

/// Fields of a new comment, already checked for presence by the controller.
pub struct NewComment {
    pub parent: String,
    pub parent_type: String,
    pub text: String,
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        CommentService { comments, posts }
    }

    /// Threaded view of a post, or of one of its comments when
    /// `query.comment_id` is set.
    pub async fn comment_tree(
        &self,
        post_id: &str,
        query: &CommentTreeQuery,
    ) -> Result<CommentTree, CommentError> {
        if post_id.trim().is_empty() {
            return Err(CommentError::Validation("Invalid request".to_string()));
        }
        let assembler = CommentTreeAssembler::new(self.comments.as_ref(), query.params());

        let post_id = ObjectId::parse_str(post_id).map_err(|_| CommentError::PostNotFound)?;
        if self.posts.find_by_id(&post_id).await?.is_none() {
            return Err(CommentError::PostNotFound);
        }

        let comment_id = query
            .comment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let Some(comment_id) = comment_id else {
            return Ok(assembler.post_tree(&post_id).await?);
        };
        let comment_id =
            ObjectId::parse_str(comment_id).map_err(|_| CommentError::CommentNotFound)?;
        let anchor = self
            .comments
            .find_by_id(&comment_id)
            .await?
            .ok_or(CommentError::CommentNotFound)?;
        if anchor.post != post_id {
            return Err(CommentError::CommentNotChild);
        }

        Ok(assembler.anchored_tree(anchor).await?)
    }

    /// Expands comments previously listed in a more-children marker.
    /// Ids that do not resolve are skipped.
    pub async fn more_children(
        &self,
        children: &[String],
        params: TreeParams,
    ) -> Result<Vec<CommentNode>, CommentError> {
        if children.is_empty() {
            return Err(CommentError::Validation(
                "Children query parameter is required".to_string(),
            ));
        }

        let ids: Vec<ObjectId> = children
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let requested = self.comments.find_by_ids(&ids).await?;
        let assembler = CommentTreeAssembler::new(self.comments.as_ref(), params);
        Ok(assembler.expand_children(requested).await?)
    }

    pub async fn create_comment(
        &self,
        author: ObjectId,
        new_comment: NewComment,
    ) -> Result<CommentNode, CommentError> {
        let parent_type = ParentType::parse(&new_comment.parent_type)
            .ok_or_else(|| CommentError::Validation("Invalid parent type".to_string()))?;
        let parent =
            ObjectId::parse_str(&new_comment.parent).map_err(|_| CommentError::InvalidParent)?;

        let post = match parent_type {
            ParentType::Post => {
                let post = self
                    .posts
                    .find_by_id(&parent)
                    .await?
                    .ok_or(CommentError::InvalidParent)?;
                if post.is_locked {
                    return Err(CommentError::ParentLocked);
                }
                post.id
            }
            ParentType::Comment => {
                let comment = self
                    .comments
                    .find_by_id(&parent)
                    .await?
                    .ok_or(CommentError::InvalidParent)?;
                if comment.is_locked {
                    return Err(CommentError::ParentLocked);
                }
                comment.post
            }
        };

        let now = Utc::now();
        let comment = Comment {
            id: ObjectId::new(),
            parent,
            parent_type,
            post,
            text: new_comment.text,
            author,
            votes: 0,
            upvoters: Vec::new(),
            downvoters: Vec::new(),
            sort_on_hot: hot_score(0, now),
            created_at: now,
            updated_at: now,
            replies: Vec::new(),
            replies_count: 0,
            is_locked: false,
        };
        self.comments.insert(&comment).await?;

        // Not atomic with the insert above; a failure here leaves the
        // parent's counters behind.
        match parent_type {
            ParentType::Post => self.posts.adjust_comment_count(&parent, 1).await?,
            ParentType::Comment => self.comments.add_reply(&parent, &comment.id).await?,
        }

        info!("Comment {} created under {:?} {}", comment.id, parent_type, parent);
        Ok(comment.into())
    }

    pub async fn get_comment(&self, id: &str) -> Result<CommentNode, CommentError> {
        let id = ObjectId::parse_str(id).map_err(|_| CommentError::CommentNotFound)?;
        let comment = self
            .comments
            .find_by_id(&id)
            .await?
            .ok_or(CommentError::CommentNotFound)?;
        Ok(comment.into())
    }

    pub async fn update_comment(
        &self,
        id: &str,
        user: &ObjectId,
        text: &str,
    ) -> Result<CommentNode, CommentError> {
        let comment = self.owned_comment(id, user).await?;
        let updated = self
            .comments
            .update_text(&comment.id, text)
            .await?
            .ok_or(CommentError::CommentNotFound)?;

        debug!("Comment {} edited", updated.id);
        Ok(updated.into())
    }

    pub async fn delete_comment(&self, id: &str, user: &ObjectId) -> Result<(), CommentError> {
        let comment = self.owned_comment(id, user).await?;
        if !self.comments.delete(&comment.id).await? {
            return Err(CommentError::CommentNotFound);
        }

        match comment.parent_type {
            ParentType::Post => {
                self.posts
                    .adjust_comment_count(&comment.parent, -1)
                    .await?
            }
            ParentType::Comment => {
                self.comments
                    .remove_reply(&comment.parent, &comment.id)
                    .await?
            }
        }

        info!("Comment {} deleted", comment.id);
        Ok(())
    }

    /// Records `user`'s vote (`1`, `-1`, or `0` to retract) and returns the
    /// new net vote count.
    pub async fn vote(&self, id: &str, user: &ObjectId, dir: i32) -> Result<i64, CommentError> {
        if !(-1..=1).contains(&dir) {
            return Err(CommentError::Validation(
                "Invalid vote direction".to_string(),
            ));
        }
        let id = ObjectId::parse_str(id).map_err(|_| CommentError::CommentNotFound)?;

        for _ in 0..VOTE_ATTEMPTS {
            let comment = self
                .comments
                .find_by_id(&id)
                .await?
                .ok_or(CommentError::CommentNotFound)?;
            let previous = comment.vote_of(user);
            if previous == dir {
                return Err(CommentError::AlreadyPerformed);
            }

            let Some(updated) = self.comments.apply_vote(&id, user, previous, dir).await? else {
                debug!("Vote of {} on {} changed underneath, retrying", user, id);
                continue;
            };
            let score = hot_score(updated.votes, updated.created_at);
            self.comments
                .set_hot_score(&id, updated.votes, score)
                .await?;
            return Ok(updated.votes);
        }

        warn!("Gave up voting on {} after {} attempts", id, VOTE_ATTEMPTS);
        Err(CommentError::VoteConflict)
    }

    pub async fn set_locked(
        &self,
        id: &str,
        user: &ObjectId,
        locked: bool,
    ) -> Result<(), CommentError> {
        let comment = self.owned_comment(id, user).await?;
        if !self.comments.set_locked(&comment.id, locked).await? {
            return Err(CommentError::AlreadyPerformed);
        }
        Ok(())
    }

    pub async fn user_comments(
        &self,
        user_id: &str,
        query: &UserCommentsQuery,
    ) -> Result<Vec<CommentNode>, CommentError> {
        let author = ObjectId::parse_str(user_id)
            .map_err(|_| CommentError::Validation("Invalid user ID".to_string()))?;
        let (skip, limit) = query.window();
        let sort = CommentSort::parse(query.sort.as_deref());

        let comments = self
            .comments
            .find_by_author(&author, sort, skip, limit)
            .await?;
        Ok(comments.into_iter().map(CommentNode::from).collect())
    }

    async fn owned_comment(&self, id: &str, user: &ObjectId) -> Result<Comment, CommentError> {
        let id = ObjectId::parse_str(id).map_err(|_| CommentError::CommentNotFound)?;
        let comment = self
            .comments
            .find_by_id(&id)
            .await?
            .ok_or(CommentError::CommentNotFound)?;
        if &comment.author != user {
            warn!("User {} is not the author of comment {}", user, id);
            return Err(CommentError::NotAuthor);
        }
        Ok(comment)
    }
}
