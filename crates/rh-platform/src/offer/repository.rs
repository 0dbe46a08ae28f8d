//! Offer Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::{PlatformError, Result};
use crate::shared::memory::MemoryCollection;
use crate::user::entity::normalize_email;
use super::entity::{Offer, OfferStatus};

pub const OFFERS_COLLECTION: &str = "offeredProperty";

#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Insert unless an offer for the same (listing, buyer) exists.
    /// Returns false when the pair is already taken.
    async fn insert_unique(&self, offer: &Offer) -> Result<bool>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Offer>>;

    async fn find_by_listing_and_buyer(&self, listing_id: &str, buyer_email: &str) -> Result<Option<Offer>>;

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Offer>>;

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Offer>>;

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<Offer>>;

    /// Overwrite one offer's status. Returns false when nothing matched.
    async fn set_status(&self, id: &ObjectId, status: OfferStatus) -> Result<bool>;

    /// Reject every offer on `listing_id` except `keep`. Returns the matched count.
    async fn reject_siblings(&self, listing_id: &str, keep: &ObjectId) -> Result<u64>;

    /// Move an `Accepted` offer to `Bought`. Returns false when no accepted
    /// offer with that id exists.
    async fn mark_bought(&self, id: &ObjectId, transaction_id: &str) -> Result<bool>;
}

pub struct MongoOfferRepository {
    collection: Collection<Offer>,
}

impl MongoOfferRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(OFFERS_COLLECTION),
        }
    }

    async fn find_many(&self, filter: bson::Document) -> Result<Vec<Offer>> {
        let cursor = self.collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl OfferRepository for MongoOfferRepository {
    async fn insert_unique(&self, offer: &Offer) -> Result<bool> {
        if self.find_by_listing_and_buyer(&offer.property_id, &offer.buyer_email).await?.is_some() {
            return Ok(false);
        }
        // The unique (propertyId, buyerEmail) index closes the window between
        // the lookup above and this insert.
        match self.collection.insert_one(offer).await {
            Ok(_) => Ok(true),
            Err(e) if PlatformError::is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Offer>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_listing_and_buyer(&self, listing_id: &str, buyer_email: &str) -> Result<Option<Offer>> {
        Ok(self.collection
            .find_one(doc! { "propertyId": listing_id, "buyerEmail": normalize_email(buyer_email) })
            .await?)
    }

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Offer>> {
        self.find_many(doc! { "propertyId": listing_id }).await
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Offer>> {
        self.find_many(doc! { "agentEmail": normalize_email(agent_email) }).await
    }

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<Offer>> {
        self.find_many(doc! { "buyerEmail": normalize_email(buyer_email) }).await
    }

    async fn set_status(&self, id: &ObjectId, status: OfferStatus) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str(), "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn reject_siblings(&self, listing_id: &str, keep: &ObjectId) -> Result<u64> {
        let result = self.collection
            .update_many(
                doc! { "propertyId": listing_id, "_id": { "$ne": keep } },
                doc! { "$set": { "status": OfferStatus::Rejected.as_str(), "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn mark_bought(&self, id: &ObjectId, transaction_id: &str) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id, "status": OfferStatus::Accepted.as_str() },
                doc! { "$set": {
                    "status": OfferStatus::Bought.as_str(),
                    "transactionId": transaction_id,
                    "updatedAt": bson::DateTime::now(),
                } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryOfferRepository {
    offers: MemoryCollection<Offer>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut offers: Vec<Offer>) -> Vec<Offer> {
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        offers
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn insert_unique(&self, offer: &Offer) -> Result<bool> {
        let (listing_id, buyer) = (offer.property_id.clone(), offer.buyer_email.clone());
        Ok(self.offers.insert_unless(offer.clone(), |o| o.is_for(&listing_id, &buyer)))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Offer>> {
        Ok(self.offers.find_by_id(id))
    }

    async fn find_by_listing_and_buyer(&self, listing_id: &str, buyer_email: &str) -> Result<Option<Offer>> {
        Ok(self.offers.find_one(|o| o.is_for(listing_id, buyer_email)))
    }

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Offer>> {
        Ok(Self::newest_first(self.offers.find_all(|o| o.property_id == listing_id)))
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Offer>> {
        let email = normalize_email(agent_email);
        Ok(Self::newest_first(self.offers.find_all(|o| o.agent_email == email)))
    }

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<Offer>> {
        let email = normalize_email(buyer_email);
        Ok(Self::newest_first(self.offers.find_all(|o| o.buyer_email == email)))
    }

    async fn set_status(&self, id: &ObjectId, status: OfferStatus) -> Result<bool> {
        let matched = self.offers.update_where(|o| o.id == *id, |o| {
            o.status = status;
            o.updated_at = Utc::now();
        });
        Ok(matched > 0)
    }

    async fn reject_siblings(&self, listing_id: &str, keep: &ObjectId) -> Result<u64> {
        Ok(self.offers.update_where(
            |o| o.property_id == listing_id && o.id != *keep,
            |o| {
                o.status = OfferStatus::Rejected;
                o.updated_at = Utc::now();
            },
        ))
    }

    async fn mark_bought(&self, id: &ObjectId, transaction_id: &str) -> Result<bool> {
        let matched = self.offers.update_where(
            |o| o.id == *id && o.status == OfferStatus::Accepted,
            |o| {
                o.status = OfferStatus::Bought;
                o.transaction_id = Some(transaction_id.to_string());
                o.updated_at = Utc::now();
            },
        );
        Ok(matched > 0)
    }
}
