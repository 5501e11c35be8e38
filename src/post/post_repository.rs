use crate::comment::sort::CommentSort;
use crate::post::post_model::Post;
use crate::utils::error::StoreError;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, StoreError>;

    /// One page of posts ordered by `sort`, limited to `author` when given.
    async fn find_page(
        &self,
        author: Option<&ObjectId>,
        sort: CommentSort,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Post>, StoreError>;

    async fn update_text(&self, id: &ObjectId, text: &str) -> Result<Option<Post>, StoreError>;

    /// Sets a boolean flag; returns false when the flag already had `value`.
    async fn set_flag(&self, id: &ObjectId, field: &str, value: bool)
    -> Result<bool, StoreError>;

    async fn adjust_comment_count(&self, id: &ObjectId, delta: i64) -> Result<(), StoreError>;

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

pub struct MongoPostRepository {
    collection: Collection<Post>,
}

impl MongoPostRepository {
    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client.database(database).collection::<Post>("posts");
        MongoPostRepository { collection }
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        self.collection.insert_one(post).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_page(
        &self,
        author: Option<&ObjectId>,
        sort: CommentSort,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Post>, StoreError> {
        let filter = match author {
            Some(author) => doc! { "author_id": author },
            None => Document::new(),
        };
        let cursor = self
            .collection
            .find(filter)
            .sort(sort.sort_document())
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_text(&self, id: &ObjectId, text: &str) -> Result<Option<Post>, StoreError> {
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

    async fn set_flag(
        &self,
        id: &ObjectId,
        field: &str,
        value: bool,
    ) -> Result<bool, StoreError> {
        let mut filter = doc! { "_id": id };
        filter.insert(field, doc! { "$ne": value });
        let mut set = Document::new();
        set.insert(field, value);

        let result = self
            .collection
            .update_one(filter, doc! { "$set": set })
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn adjust_comment_count(&self, id: &ObjectId, delta: i64) -> Result<(), StoreError> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "comment_count": delta } },
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
