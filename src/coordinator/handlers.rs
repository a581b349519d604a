use super::protocol::*;
use super::service::CoordinatorService;

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_ping() -> Json<bool> {
    tracing::info!("Ping received");
    Json(true)
}

pub async fn handle_run_job(
    Extension(service): Extension<Arc<CoordinatorService>>,
    Json(req): Json<RunJobRequest>,
) -> (StatusCode, Json<RunJobResponse>) {
    match service.run_job(req.documents).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(RunJobResponse {
                output_location: summary.output_location,
                completed: summary.completed,
                elapsed_ms: summary.elapsed_ms,
            }),
        ),
        Err(e) => {
            tracing::error!("Job failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunJobResponse {
                    output_location: String::new(),
                    completed: 0,
                    elapsed_ms: 0,
                }),
            )
        }
    }
}

pub async fn handle_report_result(
    Extension(service): Extension<Arc<CoordinatorService>>,
    Json(req): Json<ReportResultRequest>,
) -> StatusCode {
    if service.report_result(&req.job_id, req.location) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}
