use crate::comment::model::Comment;
use crate::comment::sort::CommentSort;
use crate::utils::error::StoreError;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

/// Document-store operations the comment service and tree assembler rely on.
///
/// Every method is a single store request; nothing here spans documents.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, StoreError>;

    /// Comments whose `_id` is in `ids`, in no particular order.
    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Comment>, StoreError>;

    /// Every direct child of any of `parents`, ordered by `sort`.
    async fn find_children(
        &self,
        parents: &[ObjectId],
        sort: CommentSort,
    ) -> Result<Vec<Comment>, StoreError>;

    async fn find_by_author(
        &self,
        author: &ObjectId,
        sort: CommentSort,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError>;

    /// Appends `child` to the parent's replies and bumps `replies_count`.
    /// Matches nothing when `child` is already a reply of `parent`.
    async fn add_reply(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), StoreError>;

    /// Pulls `child` from the parent's replies and drops `replies_count`.
    /// Matches nothing when `child` is not a reply of `parent`.
    async fn remove_reply(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), StoreError>;

    async fn update_text(&self, id: &ObjectId, text: &str)
    -> Result<Option<Comment>, StoreError>;

    /// Moves `user`'s vote from `previous` to `dir` and shifts `votes` by the
    /// difference. Matches nothing, returning `None`, when the stored vote of
    /// `user` is no longer `previous` or the comment is gone.
    async fn apply_vote(
        &self,
        id: &ObjectId,
        user: &ObjectId,
        previous: i32,
        dir: i32,
    ) -> Result<Option<Comment>, StoreError>;

    /// Stores the hot score computed for `votes`. Skipped when the vote count
    /// has moved on since.
    async fn set_hot_score(&self, id: &ObjectId, votes: i64, score: f64)
    -> Result<(), StoreError>;

    /// Removes every comment of a post's thread; returns how many went.
    async fn delete_by_post(&self, post: &ObjectId) -> Result<u64, StoreError>;

    /// Flips `is_locked`; returns false when it already had that value.
    async fn set_locked(&self, id: &ObjectId, locked: bool) -> Result<bool, StoreError>;

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

pub struct MongoCommentRepository {
    collection: Collection<Comment>,
}

impl MongoCommentRepository {
    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client.database(database).collection::<Comment>("comments");
        MongoCommentRepository { collection }
    }
}

#[async_trait]
impl CommentRepository for MongoCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        self.collection.insert_one(comment).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Comment>, StoreError> {
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_children(
        &self,
        parents: &[ObjectId],
        sort: CommentSort,
    ) -> Result<Vec<Comment>, StoreError> {
        let cursor = self
            .collection
            .find(doc! { "parent": { "$in": parents.to_vec() } })
            .sort(sort.sort_document())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_author(
        &self,
        author: &ObjectId,
        sort: CommentSort,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        let cursor = self
            .collection
            .find(doc! { "author": author })
            .sort(sort.sort_document())
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_reply(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), StoreError> {
        self.collection
            .update_one(
                doc! { "_id": parent, "replies": { "$ne": child } },
                doc! {
                    "$push": { "replies": child },
                    "$inc": { "replies_count": 1 },
                },
            )
            .await?;
        Ok(())
    }

    async fn remove_reply(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), StoreError> {
        self.collection
            .update_one(
                doc! { "_id": parent, "replies": child },
                doc! {
                    "$pull": { "replies": child },
                    "$inc": { "replies_count": -1 },
                },
            )
            .await?;
        Ok(())
    }

    async fn update_text(
        &self,
        id: &ObjectId,
        text: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "text": text,
                        "updated_at": mongodb::bson::DateTime::now(),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn apply_vote(
        &self,
        id: &ObjectId,
        user: &ObjectId,
        previous: i32,
        dir: i32,
    ) -> Result<Option<Comment>, StoreError> {
        let mut filter = doc! { "_id": id };
        match voter_field(previous) {
            Some(field) => {
                filter.insert(field, *user);
            }
            None => {
                filter.insert("upvoters", doc! { "$ne": user });
                filter.insert("downvoters", doc! { "$ne": user });
            }
        }

        let mut update = doc! { "$inc": { "votes": i64::from(dir - previous) } };
        if let Some(field) = voter_field(previous) {
            let mut pull = Document::new();
            pull.insert(field, *user);
            update.insert("$pull", pull);
        }
        if let Some(field) = voter_field(dir) {
            let mut add = Document::new();
            add.insert(field, *user);
            update.insert("$addToSet", add);
        }

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn set_hot_score(
        &self,
        id: &ObjectId,
        votes: i64,
        score: f64,
    ) -> Result<(), StoreError> {
        self.collection
            .update_one(
                doc! { "_id": id, "votes": votes },
                doc! { "$set": { "sort_on_hot": score } },
            )
            .await?;
        Ok(())
    }

    async fn delete_by_post(&self, post: &ObjectId) -> Result<u64, StoreError> {
        let result = self.collection.delete_many(doc! { "post": post }).await?;
        Ok(result.deleted_count)
    }

    async fn set_locked(&self, id: &ObjectId, locked: bool) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "is_locked": { "$ne": locked } },
                doc! { "$set": { "is_locked": locked } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Voter list recording a vote in direction `dir`; none for a retracted vote.
fn voter_field(dir: i32) -> Option<&'static str> {
    match dir {
        1 => Some("upvoters"),
        -1 => Some("downvoters"),
        _ => None,
    }
}
