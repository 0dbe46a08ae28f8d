//! Report Aggregate
//!
//! User complaints against listings and their admin resolution.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{Report, ReportStatus};
pub use repository::{ReportRepository, MongoReportRepository, InMemoryReportRepository};
pub use api::{reports_router, ReportsState};
