use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Unique identifier for one job. Carried in every submit request and result
/// report so concurrent jobs stay isolated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl JobId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion state for one job.
///
/// `record` is the only mutation path and runs entirely under the internal
/// lock: increment, result append, and the completion signal are one atomic
/// unit, so a report racing the waiting dispatcher can never strand it. The
/// report that reaches `total` fires the `oneshot` sender; the dispatcher
/// just awaits the receiver.
pub struct JobContext {
    total: usize,
    inner: Mutex<JobProgress>,
}

struct JobProgress {
    completed: usize,
    results: Vec<String>,
    done: Option<oneshot::Sender<Vec<String>>>,
}

impl JobContext {
    /// Creates the context and the completion future for a job of `total`
    /// tasks. A job with no tasks completes immediately.
    pub fn new(total: usize) -> (Arc<Self>, oneshot::Receiver<Vec<String>>) {
        let (tx, rx) = oneshot::channel();
        let mut done = Some(tx);

        if total == 0 {
            if let Some(tx) = done.take() {
                let _ = tx.send(Vec::new());
            }
        }

        let context = Arc::new(Self {
            total,
            inner: Mutex::new(JobProgress {
                completed: 0,
                results: Vec::new(),
                done,
            }),
        });

        (context, rx)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.inner.lock().unwrap().completed
    }

    /// Records one reported result. Returns the updated `(completed, total)`
    /// pair, or `None` for a report arriving after the job already reached
    /// its total (dropped; `completed` never exceeds `total`).
    pub fn record(&self, location: String) -> Option<(usize, usize)> {
        let mut progress = self.inner.lock().unwrap();

        if progress.completed >= self.total {
            return None;
        }

        progress.completed += 1;
        progress.results.push(location);

        if progress.completed == self.total {
            if let Some(tx) = progress.done.take() {
                // The receiver may already be gone if the dispatcher bailed
                // out; nothing to do then.
                let _ = tx.send(progress.results.clone());
            }
        }

        Some((progress.completed, self.total))
    }
}
