//! Listing Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::Result;
use crate::shared::memory::MemoryCollection;
use crate::user::entity::normalize_email;
use super::entity::{Listing, ListingChanges, VerificationStatus};
use super::search::ListingPredicate;

pub const LISTINGS_COLLECTION: &str = "properties";

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert(&self, listing: &Listing) -> Result<()>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Listing>>;

    async fn find_all(&self) -> Result<Vec<Listing>>;

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Listing>>;

    /// Advertised listings that are also verified.
    async fn find_advertised(&self) -> Result<Vec<Listing>>;

    async fn search(&self, predicate: &ListingPredicate, skip: u64, limit: Option<i64>) -> Result<Vec<Listing>>;

    async fn count(&self, predicate: &ListingPredicate) -> Result<u64>;

    /// Returns false when no listing matched.
    async fn set_status(&self, id: &ObjectId, status: VerificationStatus) -> Result<bool>;

    async fn set_advertise(&self, id: &ObjectId, advertise: bool) -> Result<bool>;

    async fn update_details(&self, id: &ObjectId, changes: &ListingChanges) -> Result<bool>;

    /// Number of listings deleted (0 or 1).
    async fn delete(&self, id: &ObjectId) -> Result<u64>;

    async fn delete_by_agent(&self, agent_email: &str) -> Result<u64>;
}

pub struct MongoListingRepository {
    collection: Collection<Listing>,
}

impl MongoListingRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(LISTINGS_COLLECTION),
        }
    }
}

#[async_trait]
impl ListingRepository for MongoListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<()> {
        self.collection.insert_one(listing).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Listing>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<Listing>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Listing>> {
        let cursor = self.collection
            .find(doc! { "agentEmail": normalize_email(agent_email) })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_advertised(&self) -> Result<Vec<Listing>> {
        let cursor = self.collection
            .find(doc! { "advertise": true, "status": VerificationStatus::Verified.as_str() })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn search(&self, predicate: &ListingPredicate, skip: u64, limit: Option<i64>) -> Result<Vec<Listing>> {
        let mut find = self.collection.find(predicate.to_filter()).skip(skip);
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, predicate: &ListingPredicate) -> Result<u64> {
        Ok(self.collection.count_documents(predicate.to_filter()).await?)
    }

    async fn set_status(&self, id: &ObjectId, status: VerificationStatus) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str(), "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_advertise(&self, id: &ObjectId, advertise: bool) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "advertise": advertise, "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_details(&self, id: &ObjectId, changes: &ListingChanges) -> Result<bool> {
        let mut set = doc! { "updatedAt": bson::DateTime::now() };
        if let Some(title) = &changes.title {
            set.insert("title", title);
        }
        if let Some(location) = &changes.location {
            set.insert("location", location);
        }
        if let Some(image) = &changes.image {
            set.insert("image", image);
        }
        if let Some(description) = &changes.description {
            set.insert("description", description);
        }
        if let Some(min) = changes.minimum_price {
            set.insert("minimumPrice", min);
        }
        if let Some(max) = changes.maximum_price {
            set.insert("maximumPrice", max);
        }

        let result = self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_by_agent(&self, agent_email: &str) -> Result<u64> {
        let result = self.collection
            .delete_many(doc! { "agentEmail": normalize_email(agent_email) })
            .await?;
        Ok(result.deleted_count)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryListingRepository {
    listings: MemoryCollection<Listing>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<()> {
        self.listings.insert(listing.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Listing>> {
        Ok(self.listings.find_by_id(id))
    }

    async fn find_all(&self) -> Result<Vec<Listing>> {
        Ok(self.listings.find_all(|_| true))
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Listing>> {
        Ok(self.listings.find_all(|l| l.is_owned_by(agent_email)))
    }

    async fn find_advertised(&self) -> Result<Vec<Listing>> {
        Ok(self.listings.find_all(|l| l.advertise && l.is_verified()))
    }

    async fn search(&self, predicate: &ListingPredicate, skip: u64, limit: Option<i64>) -> Result<Vec<Listing>> {
        let matches = self.listings.find_all(|l| predicate.matches(l)).into_iter().skip(skip as usize);
        Ok(match limit {
            Some(limit) => matches.take(limit.max(0) as usize).collect(),
            None => matches.collect(),
        })
    }

    async fn count(&self, predicate: &ListingPredicate) -> Result<u64> {
        Ok(self.listings.count(|l| predicate.matches(l)))
    }

    async fn set_status(&self, id: &ObjectId, status: VerificationStatus) -> Result<bool> {
        let matched = self.listings.update_where(|l| l.id == *id, |l| {
            l.status = status;
            l.updated_at = Utc::now();
        });
        Ok(matched > 0)
    }

    async fn set_advertise(&self, id: &ObjectId, advertise: bool) -> Result<bool> {
        let matched = self.listings.update_where(|l| l.id == *id, |l| {
            l.advertise = advertise;
            l.updated_at = Utc::now();
        });
        Ok(matched > 0)
    }

    async fn update_details(&self, id: &ObjectId, changes: &ListingChanges) -> Result<bool> {
        Ok(self.listings.update_where(|l| l.id == *id, |l| changes.apply(l)) > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64> {
        Ok(self.listings.delete_where(|l| l.id == *id))
    }

    async fn delete_by_agent(&self, agent_email: &str) -> Result<u64> {
        Ok(self.listings.delete_where(|l| l.is_owned_by(agent_email)))
    }
}
