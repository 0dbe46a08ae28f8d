//! Report Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::Result;
use crate::shared::memory::MemoryCollection;
use super::entity::{Report, ReportStatus};

pub const REPORTS_COLLECTION: &str = "reports";

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<()>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Report>>;

    async fn find_all(&self) -> Result<Vec<Report>>;

    async fn set_status(&self, id: &ObjectId, status: ReportStatus) -> Result<bool>;
}

pub struct MongoReportRepository {
    collection: Collection<Report>,
}

impl MongoReportRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(REPORTS_COLLECTION),
        }
    }
}

#[async_trait]
impl ReportRepository for MongoReportRepository {
    async fn insert(&self, report: &Report) -> Result<()> {
        self.collection.insert_one(report).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Report>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<Report>> {
        let cursor = self.collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_status(&self, id: &ObjectId, status: ReportStatus) -> Result<bool> {
        let result = self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": status.as_str() } })
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReportRepository {
    reports: MemoryCollection<Report>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn insert(&self, report: &Report) -> Result<()> {
        self.reports.insert(report.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Report>> {
        Ok(self.reports.find_by_id(id))
    }

    async fn find_all(&self) -> Result<Vec<Report>> {
        let mut reports = self.reports.find_all(|_| true);
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn set_status(&self, id: &ObjectId, status: ReportStatus) -> Result<bool> {
        Ok(self.reports.update_where(|r| r.id == *id, |r| r.status = status) > 0)
    }
}
