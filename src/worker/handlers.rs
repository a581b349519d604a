use super::protocol::*;
use super::service::WorkerService;

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_ping() -> Json<bool> {
    tracing::info!("Ping received");
    Json(true)
}

pub async fn handle_submit_task(
    Extension(service): Extension<Arc<WorkerService>>,
    Json(req): Json<SubmitTaskRequest>,
) -> Json<SubmitTaskResponse> {
    let accepted = service.submit(req.job_id, req.document);
    Json(SubmitTaskResponse { accepted })
}

pub async fn handle_aggregate(
    Extension(service): Extension<Arc<WorkerService>>,
    Json(req): Json<AggregateRequest>,
) -> (StatusCode, Json<AggregateResponse>) {
    match service.aggregate(&req.locations).await {
        Ok(output_location) => (StatusCode::OK, Json(AggregateResponse { output_location })),
        Err(e) => {
            tracing::error!("Aggregation failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AggregateResponse {
                    output_location: String::new(),
                }),
            )
        }
    }
}
