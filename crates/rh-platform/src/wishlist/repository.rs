//! Wishlist Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::{PlatformError, Result};
use crate::shared::memory::MemoryCollection;
use crate::user::entity::normalize_email;
use super::entity::WishlistEntry;

pub const WISHLIST_COLLECTION: &str = "wishlist";

#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Insert unless the buyer already saved this listing. Returns false on
    /// a duplicate.
    async fn insert_unique(&self, entry: &WishlistEntry) -> Result<bool>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<WishlistEntry>>;

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<WishlistEntry>>;

    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}

pub struct MongoWishlistRepository {
    collection: Collection<WishlistEntry>,
}

impl MongoWishlistRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(WISHLIST_COLLECTION),
        }
    }
}

#[async_trait]
impl WishlistRepository for MongoWishlistRepository {
    async fn insert_unique(&self, entry: &WishlistEntry) -> Result<bool> {
        let existing = self.collection
            .find_one(doc! { "propertyId": &entry.property_id, "buyerEmail": &entry.buyer_email })
            .await?;
        if existing.is_some() {
            return Ok(false);
        }
        match self.collection.insert_one(entry).await {
            Ok(_) => Ok(true),
            Err(e) if PlatformError::is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<WishlistEntry>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<WishlistEntry>> {
        let cursor = self.collection
            .find(doc! { "buyerEmail": normalize_email(buyer_email) })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryWishlistRepository {
    entries: MemoryCollection<WishlistEntry>,
}

impl InMemoryWishlistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlistRepository {
    async fn insert_unique(&self, entry: &WishlistEntry) -> Result<bool> {
        let (listing_id, buyer) = (entry.property_id.clone(), entry.buyer_email.clone());
        Ok(self.entries.insert_unless(entry.clone(), |e| e.is_for(&listing_id, &buyer)))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<WishlistEntry>> {
        Ok(self.entries.find_by_id(id))
    }

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<WishlistEntry>> {
        let email = normalize_email(buyer_email);
        let mut entries = self.entries.find_all(|e| e.buyer_email == email);
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.entries.delete_where(|e| e.id == *id) > 0)
    }
}
