use std::sync::Arc;

use crate::dto::report_dto::ReportQuery;
use crate::dto::ApiResponse;
use crate::models::report::ReportSummary;
use crate::services::report_service::DEFAULT_REPORT_DAYS;
use crate::services::ReportService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct ReportController {
    reports: Arc<ReportService>,
}

impl ReportController {
    pub fn new(state: &AppState) -> Self {
        Self {
            reports: state.report_service.clone(),
        }
    }

    pub async fn daily(&self, query: ReportQuery) -> AppResult<ApiResponse<ReportSummary>> {
        let days = query.days.unwrap_or(DEFAULT_REPORT_DAYS);
        let summary = self.reports.generate_daily_report(days).await?;
        Ok(ApiResponse::success(summary))
    }
}
