//! Coordinator Service Implementation
//!
//! Drives one job from dispatch through the completion barrier to the final
//! sort task, and takes in the result reports worker nodes deliver.

use super::job::{JobContext, JobId};
use crate::config::Settings;
use crate::worker::protocol::{
    AggregateRequest, AggregateResponse, SubmitTaskRequest, SubmitTaskResponse,
    ENDPOINT_AGGREGATE, ENDPOINT_SUBMIT_TASK,
};

use anyhow::{Context, Result};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;

/// Attempts to place one score task before the job is failed.
const DISPATCH_ATTEMPTS: usize = 10;
/// Per-attempt timeout for a submit call.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of a finished job.
#[derive(Debug)]
pub struct JobSummary {
    pub output_location: String,
    pub completed: usize,
    pub elapsed_ms: u64,
}

pub struct CoordinatorService {
    workers: Vec<SocketAddr>,
    sort_node_addr: SocketAddr,
    /// Active jobs keyed by id; entries live from dispatch until the job's
    /// output is written (or the job fails).
    jobs: DashMap<JobId, Arc<JobContext>>,
    http_client: reqwest::Client,
}

impl CoordinatorService {
    pub fn new(settings: &Settings) -> Arc<Self> {
        Arc::new(Self {
            workers: settings.workers.clone(),
            sort_node_addr: settings.sort_node_addr(),
            jobs: DashMap::new(),
            http_client: reqwest::Client::new(),
        })
    }

    /// The top-level job pipeline: dispatch every document, await the
    /// completion barrier, run the sort task, append the total time line.
    pub async fn run_job(&self, documents: Vec<String>) -> Result<JobSummary> {
        let job_id = JobId::new();
        let start = Instant::now();

        tracing::info!(
            "Job {} started: splitting into {} score tasks",
            job_id.0,
            documents.len()
        );

        let (context, done) = JobContext::new(documents.len());
        self.jobs.insert(job_id.clone(), context);

        let result = self.drive_job(&job_id, &documents, done, start).await;

        // The job's state is dropped whether it finished or failed; late
        // reports for it are answered as unknown.
        self.jobs.remove(&job_id);

        match &result {
            Ok(summary) => tracing::info!(
                "Job {} complete: {} in {} ms",
                job_id.0,
                summary.output_location,
                summary.elapsed_ms
            ),
            Err(e) => tracing::error!("Job {} failed: {:#}", job_id.0, e),
        }

        result
    }

    async fn drive_job(
        &self,
        job_id: &JobId,
        documents: &[String],
        done: oneshot::Receiver<Vec<String>>,
        start: Instant,
    ) -> Result<JobSummary> {
        for document in documents {
            self.dispatch(job_id, document).await?;
        }

        tracing::info!("Job {}: waiting for all score tasks to complete", job_id.0);
        let locations = done
            .await
            .context("Completion signal dropped before the job finished")?;
        tracing::info!(
            "Job {}: all {} score tasks complete, proceeding to the sort task",
            job_id.0,
            locations.len()
        );

        let output_location = self.run_sort_task(&locations).await?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        append_total_time(&output_location, elapsed_ms).await?;

        Ok(JobSummary {
            output_location,
            completed: locations.len(),
            elapsed_ms,
        })
    }

    /// Places one score task on the pool. Rejections and transport failures
    /// retry against a fresh random worker with capped exponential backoff;
    /// exhausting the attempt budget fails the job.
    async fn dispatch(&self, job_id: &JobId, document: &str) -> Result<SocketAddr> {
        let mut delay_ms = 150u64;

        for attempt in 1..=DISPATCH_ATTEMPTS {
            let target = self.random_worker();

            match self.try_submit(target, job_id, document).await {
                Ok(true) => {
                    tracing::info!("Score task for {} accepted by {}", document, target);
                    return Ok(target);
                }
                Ok(false) => {
                    tracing::debug!(
                        "Score task for {} rejected by {} (attempt {}/{})",
                        document,
                        target,
                        attempt,
                        DISPATCH_ATTEMPTS
                    );
                }
                Err(e) => {
                    // Transport failure counts as a rejection.
                    tracing::warn!(
                        "Submit to {} failed (attempt {}/{}): {:#}",
                        target,
                        attempt,
                        DISPATCH_ATTEMPTS,
                        e
                    );
                }
            }

            if attempt < DISPATCH_ATTEMPTS {
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }

        Err(anyhow::anyhow!(
            "No worker accepted the score task for {} after {} attempts",
            document,
            DISPATCH_ATTEMPTS
        ))
    }

    fn random_worker(&self) -> SocketAddr {
        use rand::Rng;
        let idx = rand::thread_rng().gen_range(0..self.workers.len());
        self.workers[idx]
    }

    async fn try_submit(&self, target: SocketAddr, job_id: &JobId, document: &str) -> Result<bool> {
        let url = format!("http://{}{}", target, ENDPOINT_SUBMIT_TASK);
        let payload = SubmitTaskRequest {
            job_id: job_id.clone(),
            document: document.to_string(),
        };

        let response = self
            .http_client
            .post(url)
            .json(&payload)
            .timeout(SUBMIT_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Submit refused: {}", response.status());
        }

        let body: SubmitTaskResponse = response.json().await?;
        Ok(body.accepted)
    }

    /// Takes in one result report from a worker. Returns false for a job
    /// this coordinator is not (or no longer) tracking.
    pub fn report_result(&self, job_id: &JobId, location: String) -> bool {
        let Some(context) = self.jobs.get(job_id) else {
            tracing::warn!("Result report for unknown job {}: {}", job_id.0, location);
            return false;
        };

        match context.record(location.clone()) {
            Some((completed, total)) => {
                tracing::info!("({}/{}) Score task complete: {}", completed, total, location);
            }
            None => {
                tracing::warn!(
                    "Dropped result report beyond job {}'s total: {}",
                    job_id.0,
                    location
                );
            }
        }

        true
    }

    /// Runs aggregation on the designated sort node.
    async fn run_sort_task(&self, locations: &[String]) -> Result<String> {
        let url = format!("http://{}{}", self.sort_node_addr, ENDPOINT_AGGREGATE);
        tracing::info!("Launching sort task on {}", self.sort_node_addr);

        let response = self
            .http_client
            .post(url)
            .json(&AggregateRequest {
                locations: locations.to_vec(),
            })
            .send()
            .await
            .context("Failed to reach the sort node")?;

        if !response.status().is_success() {
            anyhow::bail!("Sort task failed: {}", response.status());
        }

        let body: AggregateResponse = response.json().await?;
        Ok(body.output_location)
    }
}

/// Appends the job's total wall-clock time as the trailing line of the
/// output file.
async fn append_total_time(location: &str, elapsed_ms: u64) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .append(true)
        .open(location)
        .await
        .with_context(|| format!("Failed to open output file {}", location))?;

    file.write_all(format!("Total Time Taken: {} ms.\n", elapsed_ms).as_bytes())
        .await
        .with_context(|| format!("Failed to append timing line to {}", location))?;

    Ok(())
}
