//! Worker Service Implementation
//!
//! Holds the node's immutable runtime state (policy, vocabulary, paths) and
//! implements the three worker operations: admission-gated task submission,
//! background score execution with result callback, and aggregation.

use super::record::{format_record, now_ms, parse_record};
use crate::admission::policy::{decide, SchedulerPolicy};
use crate::config::Settings;
use crate::coordinator::job::JobId;
use crate::coordinator::protocol::{ReportResultRequest, ENDPOINT_REPORT_RESULT};
use crate::scoring::score::sentiment_score;
use crate::scoring::vocabulary::Vocabulary;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

pub struct WorkerService {
    node_index: usize,
    policy: SchedulerPolicy,
    load_probability: f32,
    load_delay: Duration,
    intermediate_path: PathBuf,
    output_path: PathBuf,
    coordinator_addr: SocketAddr,
    vocab: Arc<Vocabulary>,
    /// Execution slots; an exhausted semaphore rejects further submissions
    /// instead of growing the task backlog without bound.
    slots: Arc<Semaphore>,
    /// Elapsed milliseconds of completed score tasks, for the running
    /// average reported in the completion log.
    task_millis: Mutex<Vec<u64>>,
    http_client: reqwest::Client,
}

impl WorkerService {
    pub fn new(settings: &Settings, node_index: usize, vocab: Arc<Vocabulary>) -> Result<Arc<Self>> {
        let load_probability = settings.load_probability(node_index)?;

        Ok(Arc::new(Self {
            node_index,
            policy: settings.scheduler_policy,
            load_probability,
            load_delay: Duration::from_millis(settings.load_delay_ms),
            intermediate_path: settings.intermediate_path.clone(),
            output_path: settings.output_path.clone(),
            coordinator_addr: settings.coordinator_addr,
            vocab,
            slots: Arc::new(Semaphore::new(settings.max_concurrent_tasks)),
            task_millis: Mutex::new(Vec::new()),
            http_client: reqwest::Client::new(),
        }))
    }

    pub fn node_index(&self) -> usize {
        self.node_index
    }

    /// Decides admission for one score task and, if accepted, schedules it in
    /// the background. Returns the decision immediately; the task's outcome
    /// only ever surfaces through the result callback to the coordinator.
    pub fn submit(self: &Arc<Self>, job_id: JobId, document: String) -> bool {
        if !decide(self.policy, self.load_probability).is_accept() {
            tracing::info!("Score task for {} rejected by admission policy", document);
            return false;
        }

        // All execution slots busy counts as a rejection too; the
        // coordinator simply retries against another node.
        let permit = match self.slots.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!(
                    "Score task for {} rejected: node {} is saturated",
                    document,
                    self.node_index
                );
                return false;
            }
        };

        tracing::info!("Score task for {} accepted", document);

        let service = self.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = service.run_score_task(&job_id, &document).await {
                // Not retried: the result is lost from the job's perspective.
                tracing::error!("Score task for {} failed: {:#}", document, e);
            }
        });

        true
    }

    /// The background half of an accepted submission: optional injected
    /// delay, scoring, intermediate persistence, result callback.
    async fn run_score_task(&self, job_id: &JobId, document: &str) -> Result<()> {
        let start = Instant::now();

        if rand::random::<f32>() < self.load_probability {
            tracing::debug!("Injecting {:?} of artificial load", self.load_delay);
            tokio::time::sleep(self.load_delay).await;
        }

        let content = match tokio::fs::read_to_string(document).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to read document {}: {}; scoring 0.0", document, e);
                String::new()
            }
        };

        let score = sentiment_score(&content, &self.vocab);
        let location = self.write_intermediate(document, score).await?;

        {
            let mut timers = self.task_millis.lock().unwrap();
            timers.push(start.elapsed().as_millis() as u64);
            let avg = timers.iter().sum::<u64>() as f64 / timers.len() as f64;
            tracing::info!(
                "Score task({}) complete: ({}, {:.6}). Avg time taken: {:.2} ms",
                timers.len(),
                document,
                score,
                avg
            );
        }

        self.report_result(job_id, &location).await
    }

    /// Persists one intermediate record under a name unique across the
    /// concurrent tasks of a job (timestamp plus the document's file name).
    async fn write_intermediate(&self, document: &str, score: f32) -> Result<String> {
        tokio::fs::create_dir_all(&self.intermediate_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to create intermediate directory {}",
                    self.intermediate_path.display()
                )
            })?;

        let file_name = Path::new(document)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let path = self
            .intermediate_path
            .join(format!("{}_{}", now_ms(), file_name));

        tokio::fs::write(&path, format_record(document, score))
            .await
            .with_context(|| format!("Failed to write intermediate result {}", path.display()))?;

        Ok(path.to_string_lossy().into_owned())
    }

    /// Delivers the result callback to the coordinator.
    async fn report_result(&self, job_id: &JobId, location: &str) -> Result<()> {
        let url = format!("http://{}{}", self.coordinator_addr, ENDPOINT_REPORT_RESULT);
        let payload = ReportResultRequest {
            job_id: job_id.clone(),
            location: location.to_string(),
        };

        let response = self
            .http_client
            .post(url)
            .json(&payload)
            .send()
            .await
            .context("Failed to deliver result report to coordinator")?;

        if !response.status().is_success() {
            anyhow::bail!("Result report refused by coordinator: {}", response.status());
        }

        Ok(())
    }

    /// Reads every listed intermediate result, ranks the documents by score
    /// descending, and writes the ranked sequence to a fresh output file.
    /// Synchronous from the coordinator's point of view.
    ///
    /// Duplicate document identifiers keep their first position in the order
    /// but take the last score seen (should not occur under correct
    /// dispatch). The sort is stable, so equal scores preserve encounter
    /// order.
    pub async fn aggregate(&self, locations: &[String]) -> Result<String> {
        let start = Instant::now();

        let mut ranking: Vec<(String, f32)> = Vec::with_capacity(locations.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for location in locations {
            let content = tokio::fs::read_to_string(location)
                .await
                .with_context(|| format!("Failed to read intermediate result {}", location))?;
            let (document, score) = parse_record(&content)?;

            match positions.get(&document) {
                Some(&idx) => ranking[idx].1 = score,
                None => {
                    positions.insert(document.clone(), ranking.len());
                    ranking.push((document, score));
                }
            }
        }

        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        tokio::fs::create_dir_all(&self.output_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    self.output_path.display()
                )
            })?;
        // Timestamp alone can collide when two jobs finish aggregation in
        // the same millisecond.
        let output = self
            .output_path
            .join(format!("{}_{}_output.txt", now_ms(), uuid::Uuid::new_v4()));

        let mut body = String::new();
        for (document, score) in &ranking {
            body.push_str(&format_record(document, *score));
            body.push('\n');
        }

        tokio::fs::write(&output, body)
            .await
            .with_context(|| format!("Failed to write output file {}", output.display()))?;

        tracing::info!(
            "Sort task complete: {} records ranked in {} ms",
            ranking.len(),
            start.elapsed().as_millis()
        );

        Ok(output.to_string_lossy().into_owned())
    }
}
