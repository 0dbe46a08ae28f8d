//! Reports API

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::listing::repository::ListingRepository;
use crate::report::entity::{Report, ReportStatus};
use crate::report::operations::{
    FileReportCommand, FileReportUseCase, ResolveReportCommand, ResolveReportUseCase,
    REPORT_RESOLVED_MESSAGE,
};
use crate::report::repository::ReportRepository;
use crate::review::repository::ReviewRepository;
use crate::shared::api_common::StepsResponse;
use crate::shared::authorization_service::checks;
use crate::shared::error::PlatformError;
use crate::shared::ids::parse_object_id;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub property_id: String,
    pub property_title: String,
    pub agent_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub reporter_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: String,
}

impl From<Report> for ReportResponse {
    fn from(r: Report) -> Self {
        Self {
            id: r.id.to_hex(),
            property_id: r.property_id,
            property_title: r.property_title,
            agent_email: r.agent_email,
            agent_name: r.agent_name,
            reporter_email: r.reporter_email,
            reporter_name: r.reporter_name,
            description: r.description,
            status: r.status,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileReportRequest {
    pub property_id: String,
    pub description: String,
    pub reporter_name: Option<String>,
}

/// Report to resolve
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveReportRequest {
    pub id: String,
}

#[derive(Clone)]
pub struct ReportsState {
    pub report_repo: Arc<dyn ReportRepository>,
    pub file_use_case: Arc<FileReportUseCase>,
    pub resolve_use_case: Arc<ResolveReportUseCase>,
}

impl ReportsState {
    pub fn new(
        listing_repo: Arc<dyn ListingRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        report_repo: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            file_use_case: Arc::new(FileReportUseCase::new(listing_repo.clone(), report_repo.clone())),
            resolve_use_case: Arc::new(ResolveReportUseCase::new(listing_repo, review_repo, report_repo.clone())),
            report_repo,
        }
    }
}

/// Report a listing
#[utoipa::path(
    post,
    path = "/add-report",
    tag = "reports",
    request_body = FileReportRequest,
    responses(
        (status = 200, description = "Report filed", body = ReportResponse),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn file_report(
    State(state): State<ReportsState>,
    auth: Authenticated,
    Json(req): Json<FileReportRequest>,
) -> Result<Json<ReportResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let command = FileReportCommand {
        property_id: req.property_id,
        description: req.description,
        reporter_name: req.reporter_name,
    };
    let report = state.file_use_case.execute(command, &auth.email).await?;
    Ok(Json(report.into()))
}

/// Every report (Admin)
#[utoipa::path(
    get,
    path = "/all-reports",
    tag = "reports",
    responses(
        (status = 200, description = "Reports, newest first", body = Vec<ReportResponse>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reports(
    State(state): State<ReportsState>,
    auth: Authenticated,
) -> Result<Json<Vec<ReportResponse>>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let reports = state.report_repo.find_all().await?;
    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

/// Remove the reported listing and its reviews (Admin)
#[utoipa::path(
    patch,
    path = "/reported-property",
    tag = "reports",
    request_body = ResolveReportRequest,
    responses(
        (status = 200, description = "Listing removed", body = StepsResponse),
        (status = 207, description = "Cascade stopped part way"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn resolve_report(
    State(state): State<ReportsState>,
    auth: Authenticated,
    Json(req): Json<ResolveReportRequest>,
) -> Result<Json<StepsResponse>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let command = ResolveReportCommand { report_id: parse_object_id(&req.id)? };
    let steps = state.resolve_use_case.execute(command).await?;
    Ok(Json(StepsResponse {
        message: REPORT_RESOLVED_MESSAGE.to_string(),
        steps,
    }))
}

pub fn reports_router(state: ReportsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(file_report))
        .routes(routes!(list_reports))
        .routes(routes!(resolve_report))
        .with_state(state)
}
