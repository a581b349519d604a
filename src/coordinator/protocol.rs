//! Coordinator Protocol Definitions
//!
//! DTOs for the HTTP operations exposed by the coordinator: the job entry
//! point used by clients and the result callback used by worker nodes.

use super::job::JobId;
use serde::{Deserialize, Serialize};

pub const ENDPOINT_PING: &str = "/ping";
pub const ENDPOINT_RUN_JOB: &str = "/job/run";
pub const ENDPOINT_REPORT_RESULT: &str = "/job/report";

#[derive(Debug, Serialize, Deserialize)]
pub struct RunJobRequest {
    /// Paths of the documents to score, one task per entry.
    pub documents: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunJobResponse {
    /// Location of the ranked output file; empty when the job failed.
    pub output_location: String,
    /// Number of results collected before aggregation.
    pub completed: usize,
    /// Total wall-clock time of the job in milliseconds.
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResultRequest {
    /// Job the result belongs to.
    pub job_id: JobId,
    /// Location of the intermediate result the worker persisted.
    pub location: String,
}
