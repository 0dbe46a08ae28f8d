//! File Report Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::listing::repository::ListingRepository;
use crate::report::entity::Report;
use crate::report::repository::ReportRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::parse_object_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReportCommand {
    pub property_id: String,
    pub description: String,
    pub reporter_name: Option<String>,
}

pub struct FileReportUseCase {
    listings: Arc<dyn ListingRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl FileReportUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>, reports: Arc<dyn ReportRepository>) -> Self {
        Self { listings, reports }
    }

    pub async fn execute(&self, command: FileReportCommand, reporter_email: &str) -> Result<Report> {
        let listing_id = parse_object_id(&command.property_id)?;
        let listing = self.listings.find_by_id(&listing_id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.property_id.clone()))?;

        if command.description.trim().is_empty() {
            return Err(PlatformError::validation("description is required"));
        }

        let mut report = Report::new(
            listing.id.to_hex(),
            listing.title.clone(),
            listing.agent_email.clone(),
            reporter_email,
            command.description.trim(),
        );
        report.agent_name = listing.agent_name.clone();
        report.reporter_name = command.reporter_name;

        self.reports.insert(&report).await?;

        info!(report_id = %report.id, listing_id = %report.property_id, "Listing reported");
        metrics::counter!("platform.reports.filed_total").increment(1);
        Ok(report)
    }
}
