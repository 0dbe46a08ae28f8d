//! Review Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::Result;
use crate::shared::memory::MemoryCollection;
use crate::user::entity::normalize_email;
use super::entity::Review;

pub const REVIEWS_COLLECTION: &str = "reviews";

/// Review queries return newest first.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: &Review) -> Result<()>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Review>>;

    async fn find_all(&self) -> Result<Vec<Review>>;

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Review>>;

    async fn find_by_reviewer(&self, email: &str) -> Result<Vec<Review>>;

    async fn delete(&self, id: &ObjectId) -> Result<bool>;

    /// Returns the number of reviews removed.
    async fn delete_by_listing(&self, listing_id: &str) -> Result<u64>;
}

pub struct MongoReviewRepository {
    collection: Collection<Review>,
}

impl MongoReviewRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(REVIEWS_COLLECTION),
        }
    }

    async fn find_newest_first(&self, filter: bson::Document) -> Result<Vec<Review>> {
        let cursor = self.collection
            .find(filter)
            .sort(doc! { "date": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl ReviewRepository for MongoReviewRepository {
    async fn insert(&self, review: &Review) -> Result<()> {
        self.collection.insert_one(review).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Review>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<Review>> {
        self.find_newest_first(doc! {}).await
    }

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Review>> {
        self.find_newest_first(doc! { "propertyId": listing_id }).await
    }

    async fn find_by_reviewer(&self, email: &str) -> Result<Vec<Review>> {
        self.find_newest_first(doc! { "email": normalize_email(email) }).await
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_listing(&self, listing_id: &str) -> Result<u64> {
        let result = self.collection.delete_many(doc! { "propertyId": listing_id }).await?;
        Ok(result.deleted_count)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReviewRepository {
    reviews: MemoryCollection<Review>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut reviews: Vec<Review>) -> Vec<Review> {
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn insert(&self, review: &Review) -> Result<()> {
        self.reviews.insert(review.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Review>> {
        Ok(self.reviews.find_by_id(id))
    }

    async fn find_all(&self) -> Result<Vec<Review>> {
        Ok(Self::newest_first(self.reviews.find_all(|_| true)))
    }

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Review>> {
        Ok(Self::newest_first(self.reviews.find_all(|r| r.property_id == listing_id)))
    }

    async fn find_by_reviewer(&self, email: &str) -> Result<Vec<Review>> {
        let email = normalize_email(email);
        Ok(Self::newest_first(self.reviews.find_all(|r| r.email == email)))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.reviews.delete_where(|r| r.id == *id) > 0)
    }

    async fn delete_by_listing(&self, listing_id: &str) -> Result<u64> {
        Ok(self.reviews.delete_where(|r| r.property_id == listing_id))
    }
}
