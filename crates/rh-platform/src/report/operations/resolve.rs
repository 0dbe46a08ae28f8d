//! Resolve Report Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::listing::repository::ListingRepository;
use crate::report::entity::ReportStatus;
use crate::report::repository::ReportRepository;
use crate::review::repository::ReviewRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::parse_object_id;
use crate::shared::outcome::{StepReport, StepTracker};

pub const REPORT_RESOLVED_MESSAGE: &str = "Property Removed Successfully";

const STEPS: &[&str] = &["delete listing", "delete listing reviews", "mark report removed"];

#[derive(Debug, Clone)]
pub struct ResolveReportCommand {
    pub report_id: ObjectId,
}

/// Removes a reported listing together with its reviews and closes the
/// report.
///
/// Three writes in order, none rolled back. A listing that is already gone
/// still counts as deleted (zero documents) so a retry can finish the
/// cascade. Any failure after the first write is a partial failure.
pub struct ResolveReportUseCase {
    listings: Arc<dyn ListingRepository>,
    reviews: Arc<dyn ReviewRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl ResolveReportUseCase {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        reviews: Arc<dyn ReviewRepository>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self { listings, reviews, reports }
    }

    pub async fn execute(&self, command: ResolveReportCommand) -> Result<Vec<StepReport>> {
        let report = self.reports.find_by_id(&command.report_id).await?
            .ok_or_else(|| PlatformError::not_found("Report", command.report_id.to_hex()))?;
        let listing_id = parse_object_id(&report.property_id)?;

        let mut tracker = StepTracker::new("resolve report", STEPS);

        let deleted = tracker.record(self.listings.delete(&listing_id).await)?;
        let reviews = tracker.record(self.reviews.delete_by_listing(&report.property_id).await)?;

        match self.reports.set_status(&report.id, ReportStatus::Removed).await {
            Ok(true) => {
                tracker.record(Ok(1))?;
            }
            Ok(false) => return Err(tracker.fail("report no longer exists")),
            Err(e) => {
                tracker.record(Err(e))?;
            }
        }

        info!(
            report_id = %report.id,
            listing_id = %report.property_id,
            listings_deleted = deleted,
            reviews_deleted = reviews,
            "Report resolved"
        );
        metrics::counter!("platform.reports.resolved_total").increment(1);

        Ok(tracker.finish())
    }
}
