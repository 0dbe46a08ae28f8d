//! Payment Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::{PlatformError, Result};
use crate::shared::memory::MemoryCollection;
use crate::user::entity::normalize_email;
use super::entity::Payment;

pub const PAYMENTS_COLLECTION: &str = "payments";

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert unless the offer already has a payment. Returns false when it does.
    async fn insert_unique(&self, payment: &Payment) -> Result<bool>;

    /// Sales history of one agent, newest first.
    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Payment>>;
}

pub struct MongoPaymentRepository {
    collection: Collection<Payment>,
}

impl MongoPaymentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(PAYMENTS_COLLECTION),
        }
    }
}

#[async_trait]
impl PaymentRepository for MongoPaymentRepository {
    async fn insert_unique(&self, payment: &Payment) -> Result<bool> {
        // Unique index on boughtId; two payments racing for one offer end here.
        match self.collection.insert_one(payment).await {
            Ok(_) => Ok(true),
            Err(e) if PlatformError::is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Payment>> {
        let cursor = self.collection
            .find(doc! { "agentEmail": normalize_email(agent_email) })
            .sort(doc! { "date": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: MemoryCollection<Payment>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert_unique(&self, payment: &Payment) -> Result<bool> {
        let offer_id = payment.offer_id.clone();
        Ok(self.payments.insert_unless(payment.clone(), |p| p.offer_id == offer_id))
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Payment>> {
        let email = normalize_email(agent_email);
        let mut payments = self.payments.find_all(|p| p.agent_email == email);
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }
}
