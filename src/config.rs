//! Cluster Settings
//!
//! The static configuration surface shared by every role. Settings are read
//! once at process start from a JSON file and passed into the services as a
//! plain structure; nothing here changes at runtime.

use crate::admission::policy::SchedulerPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the coordinator HTTP service binds and is reachable on.
    pub coordinator_addr: SocketAddr,
    /// Ordered pool of worker node addresses. A worker's position in this
    /// list is its node index.
    pub workers: Vec<SocketAddr>,
    /// Index into `workers` designating the node that runs aggregation.
    pub sort_node_index: usize,
    /// Admission policy applied by every worker node.
    pub scheduler_policy: SchedulerPolicy,
    /// Per-worker rejection/load-injection probability, indexed by node index.
    pub load_probabilities: Vec<f32>,
    /// Artificial delay injected into score tasks to simulate load.
    pub load_delay_ms: u64,
    /// Maximum score tasks a worker executes concurrently; submissions beyond
    /// this are rejected.
    pub max_concurrent_tasks: usize,
    /// Directory the client reads input documents from.
    pub input_path: PathBuf,
    /// Directory workers write intermediate results into.
    pub intermediate_path: PathBuf,
    /// Directory the aggregation stage writes ranked output into.
    pub output_path: PathBuf,
    /// Newline-delimited positive sentiment tokens.
    pub vocab_positive: PathBuf,
    /// Newline-delimited negative sentiment tokens.
    pub vocab_negative: PathBuf,
}

impl Settings {
    /// Loads and parses the settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.workers.is_empty() {
            anyhow::bail!("Config must list at least one worker");
        }
        if self.sort_node_index >= self.workers.len() {
            anyhow::bail!(
                "sort_node_index {} is out of range for a pool of {} workers",
                self.sort_node_index,
                self.workers.len()
            );
        }
        if self.load_probabilities.len() != self.workers.len() {
            anyhow::bail!(
                "Expected {} load probabilities (one per worker), got {}",
                self.workers.len(),
                self.load_probabilities.len()
            );
        }
        Ok(())
    }

    /// Address of the worker at `node_index`.
    pub fn worker_addr(&self, node_index: usize) -> Result<SocketAddr> {
        self.workers
            .get(node_index)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("No worker configured at index {}", node_index))
    }

    /// Load probability of the worker at `node_index`.
    pub fn load_probability(&self, node_index: usize) -> Result<f32> {
        self.load_probabilities
            .get(node_index)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("No load probability configured at index {}", node_index))
    }

    /// Address of the worker designated to run aggregation.
    pub fn sort_node_addr(&self) -> SocketAddr {
        // validate() guarantees the index is in range.
        self.workers[self.sort_node_index]
    }
}
