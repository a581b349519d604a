//! Worker Protocol Definitions
//!
//! DTOs for the HTTP operations exposed by worker nodes, plus the endpoint
//! constants the coordinator uses to reach them.

use crate::coordinator::job::JobId;
use serde::{Deserialize, Serialize};

pub const ENDPOINT_PING: &str = "/ping";
pub const ENDPOINT_SUBMIT_TASK: &str = "/task/submit";
pub const ENDPOINT_AGGREGATE: &str = "/task/aggregate";

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskRequest {
    /// Job the task belongs to; echoed back in the result report.
    pub job_id: JobId,
    /// Path of the document to score.
    pub document: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskResponse {
    /// False when the admission policy rejected the task or the node has no
    /// free execution slot. The coordinator retries elsewhere.
    pub accepted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateRequest {
    /// Intermediate result locations collected for one job.
    pub locations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// Location of the ranked output file.
    pub output_location: String,
}
