use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::report_controller::ReportController;
use crate::dto::report_dto::ReportQuery;
use crate::dto::ApiResponse;
use crate::models::report::ReportSummary;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new().route("/daily", get(daily))
}

async fn daily(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<ReportSummary>>, AppError> {
    let controller = ReportController::new(&state);
    Ok(Json(controller.daily(query).await?))
}
